use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use super::event::{now_millis, SessionEvent, TelemetryEvent};
use super::sink::{self, TelemetrySink};

/// A running QuickWindows session. Ending it emits a single session event.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: Instant,
}

impl Session {
    pub fn start() -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Instant::now(),
        };
        debug!(session_id = %session.id, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn end(self) -> SessionEvent {
        let event = self.finish();
        sink::emit(&TelemetryEvent::Session(event.clone()));
        event
    }

    pub fn end_with(self, sink: &dyn TelemetrySink) -> SessionEvent {
        let event = self.finish();
        sink.emit(&TelemetryEvent::Session(event.clone()));
        event
    }

    fn finish(self) -> SessionEvent {
        let duration_secs = rounded_secs(self.started_at.elapsed());
        debug!(session_id = %self.id, duration_secs, "session ended");
        SessionEvent {
            session_id: self.id,
            duration_secs,
            timestamp: now_millis(),
        }
    }
}

/// Whole seconds, counting any leftover milliseconds as one more second.
pub fn rounded_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_millis() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_seconds_round_up() {
        assert_eq!(rounded_secs(Duration::from_millis(0)), 0);
        assert_eq!(rounded_secs(Duration::from_millis(1)), 1);
        assert_eq!(rounded_secs(Duration::from_millis(2000)), 2);
        assert_eq!(rounded_secs(Duration::from_millis(2001)), 3);
    }

    #[test]
    fn end_with_emits_one_session_event() {
        let recorder = crate::telemetry::sink::RecordingSink::new();
        let session = Session::start();
        let id = session.id();

        let event = session.end_with(&recorder);

        assert_eq!(event.session_id, id);
        assert_eq!(recorder.events(), vec![TelemetryEvent::Session(event)]);
    }

    #[test]
    fn sub_millisecond_remainder_is_ignored() {
        assert_eq!(rounded_secs(Duration::from_micros(3_000_500)), 3);
    }
}
