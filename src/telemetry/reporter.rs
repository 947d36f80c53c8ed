use std::sync::Arc;

use tracing::trace;

use super::event::{FlagStateEvent, TelemetryEvent, QUICK_WINDOWS_FLAG};
use super::sink::{self, TelemetrySink};

/// Log if QuickWindows is enabled or disabled.
pub fn report_enabled_state(enabled: bool) {
    report_flag_state(QUICK_WINDOWS_FLAG, enabled);
}

/// Emits one flag-state event for `flag_name` to the process-wide sink.
pub fn report_flag_state(flag_name: &str, enabled: bool) {
    trace!(flag = flag_name, enabled, "reporting flag state");
    sink::emit(&TelemetryEvent::FlagState(FlagStateEvent::new(flag_name, enabled)));
}

/// Flag reporter bound to an explicit sink instead of the process-wide one.
#[derive(Clone)]
pub struct FlagStateReporter {
    flag_name: String,
    sink: Arc<dyn TelemetrySink>,
}

impl FlagStateReporter {
    pub fn new(flag_name: impl Into<String>, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            flag_name: flag_name.into(),
            sink,
        }
    }

    pub fn quick_windows(sink: Arc<dyn TelemetrySink>) -> Self {
        Self::new(QUICK_WINDOWS_FLAG, sink)
    }

    pub fn flag_name(&self) -> &str {
        &self.flag_name
    }

    pub fn report_enabled_state(&self, enabled: bool) {
        trace!(flag = %self.flag_name, enabled, "reporting flag state");
        self.sink
            .emit(&TelemetryEvent::FlagState(FlagStateEvent::new(self.flag_name.as_str(), enabled)));
    }
}

impl std::fmt::Debug for FlagStateReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagStateReporter")
            .field("flag_name", &self.flag_name)
            .finish_non_exhaustive()
    }
}
