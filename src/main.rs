use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use quickwindows_telemetry::settings::{send_settings_telemetry, SettingsStore};
use quickwindows_telemetry::telemetry::{self, ChannelSink, LogSink, Session};

const SETTINGS_DIR_ENV: &str = "QUICKWINDOWS_SETTINGS_DIR";
const CHANNEL_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let enabled = match std::env::args().nth(1).as_deref() {
        Some("on") | None => true,
        Some("off") => false,
        Some(other) => bail!("expected `on` or `off`, got `{}`", other),
    };

    let settings_dir = std::env::var_os(SETTINGS_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings"));
    let store = SettingsStore::new(&settings_dir);
    let settings = store
        .load_or_create()
        .with_context(|| format!("loading settings from {}", settings_dir.display()))?;

    // Reports go through the channel; the drain task owns the log output.
    let (sink, rx) = ChannelSink::channel(CHANNEL_CAPACITY);
    let drain = tokio::spawn(ChannelSink::drain(rx, Arc::new(LogSink)));
    telemetry::install_sink(Arc::new(sink));

    tracing::info!("QuickWindows telemetry starting (enabled = {})", enabled);
    let session = Session::start();
    telemetry::report_enabled_state(enabled);
    send_settings_telemetry(&settings);
    session.end();

    // Dropping the last sender lets the drain task finish.
    drop(telemetry::uninstall_sink());
    let forwarded = drain.await.context("telemetry drain task failed")?;
    tracing::info!("Forwarded {} telemetry events", forwarded);

    Ok(())
}
