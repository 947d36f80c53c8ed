use std::collections::HashMap;

use super::event::TelemetryEvent;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub flag_stats: FlagStats,
    pub session_stats: SessionStats,
    pub settings_reports: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FlagStats {
    pub total: u64,
    pub enabled: u64,
    pub disabled: u64,
    /// Most recent reported state per flag name.
    pub last_state: HashMap<String, bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub count: u64,
    pub total_secs: u64,
    pub max_secs: u64,
    pub avg_secs: f64,
}

pub fn compute_snapshot(events: &[TelemetryEvent]) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::FlagState(flag) => {
                snap.flag_stats.total += 1;
                if flag.enabled() {
                    snap.flag_stats.enabled += 1;
                } else {
                    snap.flag_stats.disabled += 1;
                }
                snap.flag_stats
                    .last_state
                    .insert(flag.flag_name().to_string(), flag.enabled());
            }
            TelemetryEvent::Session(session) => {
                snap.session_stats.count += 1;
                snap.session_stats.total_secs += session.duration_secs;
                snap.session_stats.max_secs = snap.session_stats.max_secs.max(session.duration_secs);
            }
            TelemetryEvent::Settings(_) => snap.settings_reports += 1,
        }
    }

    if snap.session_stats.count > 0 {
        snap.session_stats.avg_secs =
            snap.session_stats.total_secs as f64 / snap.session_stats.count as f64;
    }

    snap
}
