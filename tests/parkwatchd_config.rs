use std::sync::Mutex;

use tempfile::NamedTempFile;

use parkwatch::config::MonitorConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PARKWATCH_CONFIG",
        "PARKWATCH_ZONES",
        "PARKWATCH_CAMERA_SOURCE",
        "PARKWATCH_BACKEND",
        "PARKWATCH_CLASSES",
        "PARKWATCH_MQTT_BROKER",
        "PARKWATCH_LED_DEVICE",
        "PARKWATCH_HELD_SPOTS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "zones_path": "lot_a.json",
        "camera": {
            "source": "stub://front_lot",
            "target_fps": 5,
            "width": 320,
            "height": 240
        },
        "detector": {
            "backend": "stub",
            "classes": ["car", "bus"],
            "confidence_threshold": 0.6
        },
        "smoothing": {
            "window": 4
        },
        "mqtt": {
            "enabled": true,
            "broker_addr": "127.0.0.1:1884",
            "topic_prefix": "lot_a"
        },
        "led": {
            "enabled": true,
            "device": "/dev/ttyUSB1"
        },
        "held_spots": [2, 3]
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("PARKWATCH_CONFIG", file.path());
    std::env::set_var("PARKWATCH_ZONES", "lot_b.json");
    std::env::set_var("PARKWATCH_CLASSES", "car,truck,bus");
    std::env::set_var("PARKWATCH_HELD_SPOTS", "7");

    let cfg = MonitorConfig::load().expect("load config");

    assert_eq!(cfg.zones_path, "lot_b.json");
    assert_eq!(cfg.camera.source, "stub://front_lot");
    assert_eq!(cfg.camera.target_fps, 5);
    assert_eq!(cfg.camera.width, 320);
    assert_eq!(cfg.camera.height, 240);
    assert_eq!(cfg.detector.backend, "stub");
    assert_eq!(cfg.detector.classes, vec!["car", "truck", "bus"]);
    assert_eq!(cfg.detector.confidence_threshold, 0.6);
    assert_eq!(cfg.smoothing.window, 4);
    assert!(cfg.mqtt.enabled);
    assert_eq!(cfg.mqtt.broker_addr, "127.0.0.1:1884");
    assert_eq!(cfg.mqtt.topic_prefix, "lot_a");
    assert!(cfg.led.enabled);
    assert_eq!(cfg.led.device, "/dev/ttyUSB1");
    assert_eq!(cfg.held_spots, vec![7]);

    clear_env();
}

#[test]
fn loads_defaults_without_a_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = MonitorConfig::load().expect("load config");

    assert_eq!(cfg.zones_path, "parking_spots.json");
    assert_eq!(cfg.camera.source, "stub://lot");
    assert_eq!(cfg.detector.backend, "stub");
    assert_eq!(cfg.detector.classes, vec!["car", "truck"]);
    assert_eq!(cfg.smoothing.window, 10);
    assert!(!cfg.mqtt.enabled);
    assert!(!cfg.led.enabled);
    assert!(cfg.held_spots.is_empty());

    clear_env();
}

#[test]
fn mqtt_broker_env_enables_the_sink() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PARKWATCH_MQTT_BROKER", "127.0.0.1:1885");
    let cfg = MonitorConfig::load().expect("load config");
    assert!(cfg.mqtt.enabled);
    assert_eq!(cfg.mqtt.broker_addr, "127.0.0.1:1885");

    clear_env();
}

#[test]
fn malformed_held_spots_env_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PARKWATCH_HELD_SPOTS", "2,abc");
    assert!(MonitorConfig::load().is_err());

    clear_env();
}
