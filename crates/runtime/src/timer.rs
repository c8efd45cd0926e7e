use foundation::time::Time;

/// Repeating timer polled from a cooperative loop.
///
/// The timer never fires by itself: the owner calls [`IntervalTimer::poll`]
/// with the current time and receives the number of periods that elapsed since
/// the last poll. Dropping the timer cancels it.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    period_s: f64,
    next_due: Time,
}

impl IntervalTimer {
    /// First fire is one full period after `now`.
    pub fn start(period_s: f64, now: Time) -> Self {
        Self {
            period_s,
            next_due: now.after(period_s),
        }
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn next_due(&self) -> Time {
        self.next_due
    }

    /// Number of periods that elapsed up to `now`. Late polls catch up,
    /// saturating at `u32::MAX`.
    pub fn poll(&mut self, now: Time) -> u32 {
        if !self.period_s.is_finite() || self.period_s <= 0.0 {
            return 0;
        }
        let late_s = now.0 + 1e-9 - self.next_due.0;
        if late_s.is_nan() || late_s < 0.0 {
            return 0;
        }
        let periods = (late_s / self.period_s).floor() + 1.0;
        let fired = if periods >= u32::MAX as f64 {
            u32::MAX
        } else {
            periods as u32
        };
        self.next_due = Time(self.next_due.0 + periods * self.period_s);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::IntervalTimer;
    use foundation::time::Time;

    #[test]
    fn fires_once_per_period() {
        let mut t = IntervalTimer::start(1.0, Time(10.0));
        assert_eq!(t.poll(Time(10.5)), 0);
        assert_eq!(t.poll(Time(11.0)), 1);
        assert_eq!(t.poll(Time(11.2)), 0);
        assert_eq!(t.poll(Time(12.0)), 1);
    }

    #[test]
    fn late_poll_catches_up() {
        let mut t = IntervalTimer::start(1.0, Time(0.0));
        assert_eq!(t.poll(Time(3.5)), 3);
        assert_eq!(t.next_due(), Time(4.0));
    }

    #[test]
    fn tiny_period_far_from_origin_returns() {
        let mut t = IntervalTimer::start(1e-12, Time(1e6));
        assert_eq!(t.poll(Time(1e6 + 1.0)), u32::MAX);
        assert!(t.next_due().0 > 1e6 + 1.0 - 1e-6);

        let mut t = IntervalTimer::start(1e-3, Time(0.0));
        assert_eq!(t.poll(Time(10_000.0)), 10_000_000);
    }

    #[test]
    fn zero_period_never_fires() {
        let mut t = IntervalTimer::start(0.0, Time(0.0));
        assert_eq!(t.poll(Time(100.0)), 0);
    }
}
