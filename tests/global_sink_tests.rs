// The process-wide sink is shared state, so every step lives in one test.

use std::sync::Arc;

use quickwindows_telemetry::report_enabled_state;
use quickwindows_telemetry::settings::{send_settings_telemetry, QuickWindowsSettings};
use quickwindows_telemetry::telemetry::sink::sink_installed;
use quickwindows_telemetry::telemetry::{
    install_sink, report_flag_state, uninstall_sink, RecordingSink, Session, TelemetryEvent,
};

#[test]
fn test_process_wide_sink_lifecycle() {
    // 1. No sink: every report is a silent no-op
    assert!(!sink_installed());
    report_enabled_state(true);
    report_enabled_state(false);
    report_flag_state("Other", true);
    Session::start().end();
    send_settings_telemetry(&QuickWindowsSettings::default());

    // 2. Install a recorder; nothing from step 1 was buffered anywhere
    let recorder = Arc::new(RecordingSink::new());
    assert!(install_sink(recorder.clone()).is_none());
    assert!(sink_installed());
    assert!(recorder.is_empty());

    // 3. true, false, true arrive in call order
    report_enabled_state(true);
    report_enabled_state(false);
    report_enabled_state(true);

    let states: Vec<bool> = recorder
        .events()
        .iter()
        .map(|event| match event {
            TelemetryEvent::FlagState(flag) => {
                assert_eq!(flag.flag_name(), "QuickWindows");
                flag.enabled()
            }
            other => panic!("Expected a flag event, got {:?}", other),
        })
        .collect();
    assert_eq!(states, vec![true, false, true]);

    // 4. Session and settings events go to the same sink
    let ended = Session::start().end();
    send_settings_telemetry(&QuickWindowsSettings::default());

    let snap = recorder.snapshot();
    assert_eq!(snap.flag_stats.total, 3);
    assert_eq!(snap.session_stats.count, 1);
    assert_eq!(snap.settings_reports, 1);
    assert!(matches!(
        recorder.events().get(3),
        Some(TelemetryEvent::Session(s)) if s.session_id == ended.session_id
    ));

    // 5. Replacing hands back the previous sink
    let second = Arc::new(RecordingSink::new());
    assert!(install_sink(second.clone()).is_some());
    report_enabled_state(false);
    assert_eq!(recorder.len(), 5);
    assert_eq!(second.len(), 1);

    // 6. Uninstall returns to no-op
    assert!(uninstall_sink().is_some());
    report_enabled_state(true);
    assert_eq!(second.len(), 1);
    assert!(uninstall_sink().is_none());
}
