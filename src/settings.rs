use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::telemetry::event::{now_millis, SettingsEvent, TelemetryEvent, QUICK_WINDOWS_FLAG};
use crate::telemetry::sink;

pub const SETTINGS_FILE: &str = "settings.json";
pub const SETTINGS_VERSION: &str = "2";
pub const MAX_READ_RETRIES: u32 = 5;
pub const RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickWindowsSettings {
    pub name: String,
    pub version: String,
    pub properties: QuickWindowsProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickWindowsProperties {
    #[serde(rename = "ActivationShortcut", default = "missing_activation_shortcut")]
    pub activation_shortcut: HotkeySettings,
}

fn missing_activation_shortcut() -> HotkeySettings {
    warn!("QuickWindows settings have no ActivationShortcut, using the default");
    HotkeySettings::default()
}

impl Default for QuickWindowsProperties {
    fn default() -> Self {
        Self {
            activation_shortcut: HotkeySettings::default(),
        }
    }
}

/// A modifier combination plus an optional virtual key code. Defaults to Alt alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeySettings {
    pub win: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub code: u32,
    pub key: String,
}

impl HotkeySettings {
    pub fn new(win: bool, ctrl: bool, alt: bool, shift: bool, code: u32) -> Self {
        Self {
            win,
            ctrl,
            alt,
            shift,
            code,
            key: String::new(),
        }
    }
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self::new(false, false, true, false, 0)
    }
}

impl fmt::Display for HotkeySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = [(self.win, "Win"), (self.ctrl, "Ctrl"), (self.alt, "Alt"), (self.shift, "Shift")]
            .into_iter()
            .filter(|(held, _)| *held)
            .map(|(_, name)| name.to_string())
            .collect();

        if !self.key.is_empty() {
            parts.push(self.key.clone());
        } else if self.code != 0 {
            // Virtual-key codes equal ASCII only for A-Z and 0-9.
            match char::from_u32(self.code).filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
                Some(c) => parts.push(c.to_string()),
                None => parts.push(format!("0x{:02X}", self.code)),
            }
        }

        write!(f, "{}", parts.join(" + "))
    }
}

impl Default for QuickWindowsSettings {
    fn default() -> Self {
        Self {
            name: QUICK_WINDOWS_FLAG.to_string(),
            version: SETTINGS_VERSION.to_string(),
            properties: QuickWindowsProperties::default(),
        }
    }
}

impl QuickWindowsSettings {
    pub fn telemetry_event(&self) -> SettingsEvent {
        SettingsEvent {
            activation_shortcut: self.properties.activation_shortcut.to_string(),
            timestamp: now_millis(),
        }
    }
}

/// Settings file for the QuickWindows module, rooted at a settings directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Reads the settings, writing the defaults first if the file is missing.
    /// Blocks like [`SettingsStore::load`].
    pub fn load_or_create(&self) -> Result<QuickWindowsSettings> {
        if !self.exists() {
            info!("QuickWindows settings.json was missing, creating a new one");
            self.save(&QuickWindowsSettings::default())?;
        }
        self.load()
    }

    /// Reads the settings file. I/O errors are retried up to `MAX_READ_RETRIES` times.
    ///
    /// Retries sleep the calling thread. From async code, call this before the
    /// runtime starts work or through `tokio::task::spawn_blocking`.
    pub fn load(&self) -> Result<QuickWindowsSettings> {
        let path = self.path();
        let mut attempt = 0;
        loop {
            match read(&path) {
                Ok(settings) => return Ok(settings),
                Err(crate::Error::Io(e)) if attempt < MAX_READ_RETRIES && is_transient(&e) => {
                    attempt += 1;
                    warn!("Failed to read settings (attempt {}): {}", attempt, e);
                    thread::sleep(RETRY_DELAY);
                }
                Err(e) => {
                    error!("Failed to read settings from {}: {}", path.display(), e);
                    return Err(e);
                }
            }
        }
    }

    pub fn save(&self, settings: &QuickWindowsSettings) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(self.path(), json)?;
        Ok(())
    }
}

fn read(path: &Path) -> Result<QuickWindowsSettings> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

// A missing file will not appear by waiting for it.
fn is_transient(e: &io::Error) -> bool {
    e.kind() != io::ErrorKind::NotFound
}

/// Emits the current settings to the process-wide sink.
pub fn send_settings_telemetry(settings: &QuickWindowsSettings) {
    info!("Sending settings telemetry");
    sink::emit(&TelemetryEvent::Settings(settings.telemetry_event()));
}
