//! QuickWindows telemetry
//!
//! # NON-INTERFERENCE
//! Reporting is fire-and-forget. No call in this module returns an error or
//! blocks; with no sink installed every report is silently dropped.
//!
//! # PRIVACY
//! Events carry flag names, booleans, ids, durations and the configured
//! activation shortcut only. Never window titles or process names.

pub mod event;
pub mod metrics;
pub mod reporter;
pub mod session;
pub mod sink;

pub use event::{FlagStateEvent, SessionEvent, SettingsEvent, TelemetryEvent, QUICK_WINDOWS_FLAG};
pub use reporter::{report_enabled_state, report_flag_state, FlagStateReporter};
pub use session::Session;
pub use sink::{emit, install_sink, uninstall_sink, ChannelSink, LogSink, NullSink, RecordingSink, TelemetrySink};
