use std::io::Write;

use tempfile::NamedTempFile;

use parkwatch::sink::StatusSink;
use parkwatch::{
    BackendRegistry, BoundingBox, Detection, DetectorBackend, HoldPolicy, LedNotifier, LogSink,
    Monitor, SpotState, StubBackend, ZoneStore,
};

const ZONES: &str = r#"[
    {"id": 1, "points": [[0, 0], [10, 0], [10, 10], [0, 10]]},
    {"id": 2, "points": [[100, 0], [110, 0], [110, 10], [100, 10]]}
]"#;

fn write_zone_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp zone file");
    file.write_all(ZONES.as_bytes()).expect("write zones");
    file
}

fn car(cx: i32, cy: i32) -> Detection {
    Detection {
        label: "car".to_string(),
        confidence: 0.9,
        bbox: BoundingBox {
            x: cx - 2,
            y: cy - 2,
            width: 4,
            height: 4,
        },
    }
}

#[test]
fn detections_debounce_into_stable_statuses() {
    let zones = write_zone_file();
    let store = ZoneStore::load(zones.path()).expect("load zones");
    let mut monitor = Monitor::new(store);

    // Ten frames with a car parked in spot 1, then the detector loses
    // it for ten frames.
    let mut script: Vec<Vec<Detection>> = vec![vec![car(5, 5)]; 10];
    script.extend(std::iter::repeat_with(Vec::new).take(10));
    let mut backend = StubBackend::with_script(script);

    let mut statuses = Vec::new();
    for _ in 0..20 {
        let detections = backend.detect(&[], 0, 0).unwrap();
        statuses.push(monitor.process_frame(&detections));
    }

    // After the occupied run: spot 1 stable-occupied, spot 2 free.
    assert_eq!(statuses[9][0].status, SpotState::Occupied);
    assert_eq!(statuses[9][1].status, SpotState::Free);
    // Four dropout frames later the vote still holds.
    assert_eq!(statuses[13][0].status, SpotState::Occupied);
    // The fifth dropout ties the window and the spot goes free.
    assert_eq!(statuses[14][0].status, SpotState::Free);
    assert_eq!(statuses[19][0].status, SpotState::Free);
}

#[test]
fn registry_routes_detections_to_the_monitor() {
    let zones = write_zone_file();
    let store = ZoneStore::load(zones.path()).expect("load zones");
    let mut monitor = Monitor::new(store).with_window(1);

    let mut registry = BackendRegistry::new();
    registry.register(StubBackend::with_script(vec![vec![car(105, 5)]]));

    let detections = registry.detect(Some("stub"), &[], 0, 0).unwrap();
    let updates = monitor.process_frame(&detections);
    assert_eq!(updates[0].status, SpotState::Free);
    assert_eq!(updates[1].status, SpotState::Occupied);
}

#[test]
fn hold_policy_gates_sinks_and_led_commands() {
    let zones = write_zone_file();
    let store = ZoneStore::load(zones.path()).expect("load zones");
    let mut monitor = Monitor::new(store).with_window(1);

    let updates = monitor.process_frame(&[car(5, 5)]);
    let policy = HoldPolicy::with_held([2]);
    let mut led = LedNotifier::new(Vec::new());
    let mut log_sink = LogSink::new();

    let mut forwarded = Vec::new();
    for update in &updates {
        let decision = policy.decide(*update);
        if let Some(update) = decision.forward {
            forwarded.push(update);
        }
        led.notify(update.zone_id, decision.led).unwrap();
    }
    log_sink.publish(&forwarded).unwrap();

    // Spot 2 is held: its occupancy is not forwarded and its LED is
    // yellow; spot 1 publishes normally.
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].zone_id, 1);
    assert_eq!(forwarded[0].status, SpotState::Occupied);
    assert_eq!(led.into_inner(), b"1R2Y");
}
