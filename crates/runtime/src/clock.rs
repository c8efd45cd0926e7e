use foundation::time::Time;

/// Deterministic frame metadata.
///
/// Frames are the only timebase the renderer and the animations see. The host
/// decides when a frame happens; consumers only ever look at `time`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Host time at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
            dt_s: self.dt_s,
            time: self.time.after(self.dt_s),
        }
    }
}

/// Source of redraw signals for a cooperative render loop.
///
/// A browser host would back this with `requestAnimationFrame`, a native host
/// with its vsync'd event loop. `None` means the host stopped producing frames.
pub trait FrameClock {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Frame clock advanced by hand.
///
/// Frames are produced at a fixed `dt_s`. `queue(n)` makes the next `n` calls
/// to [`FrameClock::next_frame`] succeed; `tick()` always produces a frame.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Option<Frame>,
    dt_s: f64,
    queued: u64,
}

impl ManualClock {
    pub fn new(dt_s: f64) -> Self {
        Self {
            current: None,
            dt_s,
            queued: 0,
        }
    }

    /// 60 Hz.
    pub fn display_rate() -> Self {
        Self::new(1.0 / 60.0)
    }

    pub fn queue(&mut self, frames: u64) {
        self.queued = self.queued.saturating_add(frames);
    }

    pub fn tick(&mut self) -> Frame {
        let frame = match self.current {
            Some(f) => f.next(),
            None => Frame::new(0, self.dt_s),
        };
        self.current = Some(frame);
        frame
    }

    /// Advance until at least `seconds` of clock time have passed; returns the last frame.
    pub fn advance(&mut self, seconds: f64) -> Frame {
        let start = self.now();
        let mut frame = self.tick();
        while frame.time.since(start) + 1e-9 < seconds {
            frame = self.tick();
        }
        frame
    }

    pub fn now(&self) -> Time {
        self.current.map(|f| f.time).unwrap_or(Time::ZERO)
    }
}

impl FrameClock for ManualClock {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.queued == 0 {
            return None;
        }
        self.queued -= 1;
        Some(self.tick())
    }
}
