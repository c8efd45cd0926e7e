use std::time::SystemTime;

/// A user-facing log line with the wall-clock time it was recorded.
///
/// `kind` is a short static category (`"playback"`, `"renderer"`) so hosts can
/// group or filter without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub kind: &'static str,
    pub message: String,
    pub timestamp: SystemTime,
}

/// Per-instance activity log.
///
/// Every record is mirrored to `tracing` under the `activity` target; the
/// events themselves stay here until the host reads or drains them.
#[derive(Debug, Default)]
pub struct ActivityLog {
    events: Vec<LogEvent>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "activity", kind, "{message}");
        self.events.push(LogEvent {
            kind,
            message,
            timestamp: SystemTime::now(),
        });
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.events.last().map(|e| e.message.as_str())
    }

    pub fn drain(&mut self) -> Vec<LogEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityLog;

    #[test]
    fn records_events_in_order() {
        let mut log = ActivityLog::new();
        log.record("playback", "Playback started");
        log.record("playback", "Playback paused");
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].message, "Playback started");
        assert_eq!(log.last_message(), Some("Playback paused"));
    }

    #[test]
    fn drain_clears_events() {
        let mut log = ActivityLog::new();
        log.record("renderer", "Initialized 3D viewer");
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, "renderer");
        assert!(log.is_empty());
    }
}
