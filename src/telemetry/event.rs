use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Allowed: flag names, booleans, ids, timestamps, durations, the configured shortcut
// Forbidden: window titles, process names, anything typed or captured from the user

pub const QUICK_WINDOWS_FLAG: &str = "QuickWindows";

// Must match the `serde(rename)` tags on `TelemetryEvent`.
pub const FLAG_STATE_EVENT_NAME: &str = "QuickWindows_EnableQuickWindows";
pub const SESSION_EVENT_NAME: &str = "QuickWindows_Session";
pub const SETTINGS_EVENT_NAME: &str = "QuickWindows_Settings";

/// Milliseconds since the Unix epoch. A clock set before 1970 reads as 0.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_name")]
pub enum TelemetryEvent {
    #[serde(rename = "QuickWindows_EnableQuickWindows")]
    FlagState(FlagStateEvent),

    #[serde(rename = "QuickWindows_Session")]
    Session(SessionEvent),

    #[serde(rename = "QuickWindows_Settings")]
    Settings(SettingsEvent),
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::FlagState(_) => FLAG_STATE_EVENT_NAME,
            TelemetryEvent::Session(_) => SESSION_EVENT_NAME,
            TelemetryEvent::Settings(_) => SETTINGS_EVENT_NAME,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            TelemetryEvent::FlagState(e) => e.timestamp,
            TelemetryEvent::Session(e) => e.timestamp,
            TelemetryEvent::Settings(e) => e.timestamp,
        }
    }
}

/// State of a named feature toggle at the moment it was reported.
///
/// Fields are private so an event cannot be altered after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagStateEvent {
    flag_name: String,
    enabled: bool,
    timestamp: u64,
}

impl FlagStateEvent {
    pub fn new(flag_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            flag_name: flag_name.into(),
            enabled,
            timestamp: now_millis(),
        }
    }

    pub fn quick_windows(enabled: bool) -> Self {
        Self::new(QUICK_WINDOWS_FLAG, enabled)
    }

    pub fn flag_name(&self) -> &str {
        &self.flag_name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session_id: Uuid,
    pub duration_secs: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsEvent {
    pub activation_shortcut: String,
    pub timestamp: u64,
}

impl From<FlagStateEvent> for TelemetryEvent {
    fn from(event: FlagStateEvent) -> Self {
        TelemetryEvent::FlagState(event)
    }
}

impl From<SessionEvent> for TelemetryEvent {
    fn from(event: SessionEvent) -> Self {
        TelemetryEvent::Session(event)
    }
}

impl From<SettingsEvent> for TelemetryEvent {
    fn from(event: SettingsEvent) -> Self {
        TelemetryEvent::Settings(event)
    }
}
