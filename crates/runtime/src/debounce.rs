use foundation::time::Time;

/// Coalesces bursts of values into a single delivery.
///
/// Every `push` restarts the quiescence window. `poll` hands out the most
/// recent value once no push has happened for `quiescence_s`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiescence_s: f64,
    pending: Option<(T, Time)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiescence_s: f64) -> Self {
        Self {
            quiescence_s,
            pending: None,
        }
    }

    pub fn quiescence_s(&self) -> f64 {
        self.quiescence_s
    }

    pub fn push(&mut self, value: T, now: Time) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn poll(&mut self, now: Time) -> Option<T> {
        let (_, last) = self.pending.as_ref()?;
        if now.since(*last) < self.quiescence_s {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
