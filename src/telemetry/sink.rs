use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

pub const MAX_EVENTS: usize = 10_000;

/// Receiver of telemetry events.
///
/// Implementations must not block and must not fail the caller: anything that
/// goes wrong inside `emit` is handled (or dropped) by the sink itself.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: &TelemetryEvent);
}

static GLOBAL_SINK: RwLock<Option<Arc<dyn TelemetrySink>>> = RwLock::new(None);

// No code panics while holding the slot, but a poisoned lock still holds a
// valid `Option`, so every accessor recovers it instead of giving up.
fn read_slot() -> RwLockReadGuard<'static, Option<Arc<dyn TelemetrySink>>> {
    GLOBAL_SINK.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot() -> RwLockWriteGuard<'static, Option<Arc<dyn TelemetrySink>>> {
    GLOBAL_SINK.write().unwrap_or_else(PoisonError::into_inner)
}

/// Installs the process-wide sink, returning the one it replaced.
pub fn install_sink(sink: Arc<dyn TelemetrySink>) -> Option<Arc<dyn TelemetrySink>> {
    write_slot().replace(sink)
}

pub fn uninstall_sink() -> Option<Arc<dyn TelemetrySink>> {
    write_slot().take()
}

pub fn sink_installed() -> bool {
    read_slot().is_some()
}

/// Hands `event` to the process-wide sink. Without one the event is dropped.
pub fn emit(event: &TelemetryEvent) {
    // Clone the handle so the lock is not held while the sink runs.
    let sink = read_slot().clone();

    if let Some(sink) = sink {
        sink.emit(event);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn emit(&self, _event: &TelemetryEvent) {}
}

/// Bounded in-memory sink. Oldest events are evicted once `capacity` is reached.
#[derive(Debug)]
pub struct RecordingSink {
    buffer: Mutex<VecDeque<TelemetryEvent>>,
    capacity: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(MAX_EVENTS))),
            capacity,
        }
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.events())
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for RecordingSink {
    fn emit(&self, event: &TelemetryEvent) {
        let Ok(mut buffer) = self.buffer.lock() else {
            return;
        };
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event.clone());
    }
}

/// Forwards events over a bounded channel without waiting for the receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TelemetryEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<TelemetryEvent>) -> Self {
        Self { tx }
    }

    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TelemetryEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Pumps events from `rx` into `sink` until every sender is dropped.
    /// Returns the number of events forwarded.
    pub async fn drain(mut rx: mpsc::Receiver<TelemetryEvent>, sink: Arc<dyn TelemetrySink>) -> u64 {
        let mut forwarded = 0;
        while let Some(event) = rx.recv().await {
            sink.emit(&event);
            forwarded += 1;
        }
        debug!(forwarded, "telemetry channel closed");
        forwarded
    }
}

impl TelemetrySink for ChannelSink {
    fn emit(&self, event: &TelemetryEvent) {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                debug!(event = dropped.name(), "telemetry channel full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                debug!(event = dropped.name(), "telemetry channel closed, event dropped");
            }
        }
    }
}

/// Writes each event as a JSON record on the `telemetry` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&self, event: &TelemetryEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!(target: "telemetry", event = event.name(), "{}", json),
            Err(e) => debug!(target: "telemetry", "failed to serialize {}: {}", event.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::event::FlagStateEvent;

    #[test]
    fn recording_sink_evicts_oldest_at_capacity() {
        let sink = RecordingSink::with_capacity(2);
        for enabled in [true, false, true] {
            sink.emit(&FlagStateEvent::quick_windows(enabled).into());
        }

        let events = sink.events();
        assert_eq!(events.len(), 2);
        match (&events[0], &events[1]) {
            (TelemetryEvent::FlagState(a), TelemetryEvent::FlagState(b)) => {
                assert!(!a.enabled());
                assert!(b.enabled());
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn recording_sink_clear_empties_buffer() {
        let sink = RecordingSink::new();
        sink.emit(&FlagStateEvent::quick_windows(true).into());
        assert_eq!(sink.len(), 1);

        sink.clear();

        assert!(sink.is_empty());
        assert_eq!(sink.snapshot().flag_stats.total, 0);
    }

    // Only test in this crate's unit tests that touches the process-wide slot.
    #[test]
    fn poisoned_slot_still_installs_and_emits() {
        let poisoner = std::thread::spawn(|| {
            let _guard = GLOBAL_SINK.write().unwrap();
            panic!("poison the sink slot");
        });
        assert!(poisoner.join().is_err());
        assert!(GLOBAL_SINK.is_poisoned());

        let first = Arc::new(RecordingSink::new());
        assert!(install_sink(first.clone()).is_none());
        assert!(sink_installed());

        emit(&FlagStateEvent::quick_windows(true).into());
        assert_eq!(first.len(), 1);

        let second = Arc::new(RecordingSink::new());
        assert!(install_sink(second).is_some());
        assert!(uninstall_sink().is_some());
        assert!(!sink_installed());
    }

    #[test]
    fn null_sink_accepts_anything() {
        NullSink.emit(&FlagStateEvent::quick_windows(true).into());
    }
}
