use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::occupancy::HISTORY_LENGTH;

const DEFAULT_ZONES_PATH: &str = "parking_spots.json";
const DEFAULT_CAMERA_SOURCE: &str = "stub://lot";
const DEFAULT_CAMERA_FPS: u32 = 10;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_MQTT_BROKER: &str = "127.0.0.1:1883";
const DEFAULT_MQTT_PREFIX: &str = "parkwatch";
const DEFAULT_MQTT_CLIENT_ID: &str = "parkwatchd";
const DEFAULT_LED_DEVICE: &str = "/dev/ttyACM0";

#[derive(Debug, Deserialize, Default)]
struct MonitorConfigFile {
    zones_path: Option<String>,
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    smoothing: Option<SmoothingConfigFile>,
    mqtt: Option<MqttConfigFile>,
    led: Option<LedConfigFile>,
    held_spots: Option<Vec<u32>>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    source: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<String>,
    labels_path: Option<String>,
    classes: Option<Vec<String>>,
    confidence_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct SmoothingConfigFile {
    window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct MqttConfigFile {
    enabled: Option<bool>,
    broker_addr: Option<String>,
    topic_prefix: Option<String>,
    client_id: Option<String>,
    allow_remote: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct LedConfigFile {
    enabled: Option<bool>,
    device: Option<String>,
}

/// Resolved daemon configuration: file values, then environment
/// overrides, then validation.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub zones_path: String,
    pub camera: CameraSettings,
    pub detector: DetectorSettings,
    pub smoothing: SmoothingSettings,
    pub mqtt: MqttSettings,
    pub led: LedSettings,
    /// Spots currently held by the reservation system.
    pub held_spots: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub source: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub backend: String,
    pub model_path: Option<String>,
    pub labels_path: Option<String>,
    pub classes: Vec<String>,
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone)]
pub struct SmoothingSettings {
    pub window: usize,
}

#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub enabled: bool,
    pub broker_addr: String,
    pub topic_prefix: String,
    pub client_id: String,
    pub allow_remote: bool,
}

#[derive(Debug, Clone)]
pub struct LedSettings {
    pub enabled: bool,
    pub device: String,
}

impl MonitorConfig {
    /// Load configuration: optional JSON file selected by
    /// `PARKWATCH_CONFIG`, environment overrides, validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PARKWATCH_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Self {
        let camera = file.camera.unwrap_or_default();
        let detector = file.detector.unwrap_or_default();
        let mqtt = file.mqtt.unwrap_or_default();
        let led = file.led.unwrap_or_default();
        Self {
            zones_path: file
                .zones_path
                .unwrap_or_else(|| DEFAULT_ZONES_PATH.to_string()),
            camera: CameraSettings {
                source: camera
                    .source
                    .unwrap_or_else(|| DEFAULT_CAMERA_SOURCE.to_string()),
                target_fps: camera.target_fps.unwrap_or(DEFAULT_CAMERA_FPS),
                width: camera.width.unwrap_or(DEFAULT_CAMERA_WIDTH),
                height: camera.height.unwrap_or(DEFAULT_CAMERA_HEIGHT),
            },
            detector: DetectorSettings {
                backend: detector
                    .backend
                    .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
                model_path: detector.model_path,
                labels_path: detector.labels_path,
                classes: detector.classes.unwrap_or_else(|| {
                    crate::DEFAULT_VEHICLE_CLASSES
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
                confidence_threshold: detector
                    .confidence_threshold
                    .unwrap_or(crate::DEFAULT_CONFIDENCE_THRESHOLD),
            },
            smoothing: SmoothingSettings {
                window: file
                    .smoothing
                    .and_then(|s| s.window)
                    .unwrap_or(HISTORY_LENGTH),
            },
            mqtt: MqttSettings {
                enabled: mqtt.enabled.unwrap_or(false),
                broker_addr: mqtt
                    .broker_addr
                    .unwrap_or_else(|| DEFAULT_MQTT_BROKER.to_string()),
                topic_prefix: mqtt
                    .topic_prefix
                    .unwrap_or_else(|| DEFAULT_MQTT_PREFIX.to_string()),
                client_id: mqtt
                    .client_id
                    .unwrap_or_else(|| DEFAULT_MQTT_CLIENT_ID.to_string()),
                allow_remote: mqtt.allow_remote.unwrap_or(false),
            },
            led: LedSettings {
                enabled: led.enabled.unwrap_or(false),
                device: led.device.unwrap_or_else(|| DEFAULT_LED_DEVICE.to_string()),
            },
            held_spots: file.held_spots.unwrap_or_default(),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("PARKWATCH_ZONES") {
            if !path.trim().is_empty() {
                self.zones_path = path;
            }
        }
        if let Ok(source) = std::env::var("PARKWATCH_CAMERA_SOURCE") {
            if !source.trim().is_empty() {
                self.camera.source = source;
            }
        }
        if let Ok(backend) = std::env::var("PARKWATCH_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(classes) = std::env::var("PARKWATCH_CLASSES") {
            let parsed = split_csv(&classes);
            if !parsed.is_empty() {
                self.detector.classes = parsed;
            }
        }
        if let Ok(broker) = std::env::var("PARKWATCH_MQTT_BROKER") {
            if !broker.trim().is_empty() {
                self.mqtt.broker_addr = broker;
                self.mqtt.enabled = true;
            }
        }
        if let Ok(device) = std::env::var("PARKWATCH_LED_DEVICE") {
            if !device.trim().is_empty() {
                self.led.device = device;
                self.led.enabled = true;
            }
        }
        if let Ok(held) = std::env::var("PARKWATCH_HELD_SPOTS") {
            let mut spots = Vec::new();
            for entry in split_csv(&held) {
                let id: u32 = entry.parse().map_err(|_| {
                    anyhow!("PARKWATCH_HELD_SPOTS must be comma-separated spot ids")
                })?;
                spots.push(id);
            }
            if !spots.is_empty() {
                self.held_spots = spots;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.zones_path.trim().is_empty() {
            return Err(anyhow!("zones_path must not be empty"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera.target_fps must be greater than zero"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be greater than zero"));
        }
        if self.detector.classes.is_empty() {
            return Err(anyhow!("detector.classes must name at least one class"));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(anyhow!(
                "detector.confidence_threshold must be within 0..=1"
            ));
        }
        if self.smoothing.window == 0 {
            return Err(anyhow!("smoothing.window must be greater than zero"));
        }
        if self.led.enabled && self.led.device.trim().is_empty() {
            return Err(anyhow!("led.device must be set when the LED sink is enabled"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<MonitorConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_string())
        .collect()
}
