//! parkwatchd - parking occupancy monitor daemon.
//!
//! This daemon:
//! 1. Captures frames from the configured camera source
//! 2. Runs the configured detector backend over each frame
//! 3. Maps detection centroids onto parking-spot zones and debounces
//!    each spot's occupancy over a sliding window
//! 4. Applies the reservation-hold policy
//! 5. Publishes stable statuses to the configured sinks (log, MQTT,
//!    LED controller)

use std::fs::OpenOptions;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

use parkwatch::sink::StatusSink;
use parkwatch::{
    monitor_from_config, BackendRegistry, CameraConfig, CameraSource, HoldPolicy, LedNotifier,
    LogSink, MonitorConfig, StubBackend,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = MonitorConfig::load()?;
    let mut monitor = monitor_from_config(&cfg)?;
    log::info!(
        "parkwatchd {} monitoring {} zones from {}",
        env!("CARGO_PKG_VERSION"),
        monitor.zones().len(),
        cfg.zones_path
    );

    let mut registry = BackendRegistry::new();
    registry.register(StubBackend::new());
    #[cfg(feature = "backend-tract")]
    if cfg.detector.backend == "tract" {
        let model_path = cfg
            .detector
            .model_path
            .as_deref()
            .ok_or_else(|| anyhow!("detector.model_path must be set for the tract backend"))?;
        let labels_path = cfg
            .detector
            .labels_path
            .as_deref()
            .ok_or_else(|| anyhow!("detector.labels_path must be set for the tract backend"))?;
        registry.register(parkwatch::detect::TractBackend::new(
            model_path,
            labels_path,
            cfg.camera.width,
            cfg.camera.height,
        )?);
    }
    let backend = registry.select(Some(cfg.detector.backend.as_str()))?;
    {
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("backend lock poisoned"))?;
        guard.warm_up()?;
        log::info!("detector backend: {}", guard.name());
    }

    let mut source = CameraSource::new(CameraConfig {
        source: cfg.camera.source.clone(),
        target_fps: cfg.camera.target_fps,
        width: cfg.camera.width,
        height: cfg.camera.height,
    })?;
    source.connect()?;

    let mut sinks: Vec<Box<dyn StatusSink>> = vec![Box::new(LogSink::new())];
    #[cfg(feature = "sink-mqtt")]
    if cfg.mqtt.enabled {
        let mqtt = parkwatch::sink::MqttSink::connect(parkwatch::sink::MqttSinkConfig {
            broker_addr: cfg.mqtt.broker_addr.clone(),
            topic_prefix: cfg.mqtt.topic_prefix.clone(),
            client_id: cfg.mqtt.client_id.clone(),
            allow_remote: cfg.mqtt.allow_remote,
        })?;
        sinks.push(Box::new(mqtt));
        log::info!("mqtt sink publishing to {}", cfg.mqtt.broker_addr);
    }
    #[cfg(not(feature = "sink-mqtt"))]
    if cfg.mqtt.enabled {
        log::warn!("mqtt sink requested but this build lacks the sink-mqtt feature");
    }

    let mut led = if cfg.led.enabled {
        let port = OpenOptions::new()
            .write(true)
            .open(&cfg.led.device)
            .with_context(|| format!("failed to open LED device {}", cfg.led.device))?;
        log::info!("led sink writing to {}", cfg.led.device);
        Some(LedNotifier::new(port))
    } else {
        None
    };

    let policy = HoldPolicy::with_held(cfg.held_spots.iter().copied());
    if !cfg.held_spots.is_empty() {
        log::info!("held spots: {:?}", cfg.held_spots);
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("error setting Ctrl-C handler")?;
    }

    let frame_interval = Duration::from_millis(1000 / cfg.camera.target_fps as u64);
    let mut last_health_log = Instant::now();
    let mut frames = 0u64;

    log::info!("parkwatchd running");
    while running.load(Ordering::SeqCst) {
        let frame_started = Instant::now();
        let frame = source.next_frame()?;

        let detections = {
            let mut guard = backend
                .lock()
                .map_err(|_| anyhow!("backend lock poisoned"))?;
            match guard.detect(&frame.pixels, frame.width, frame.height) {
                Ok(detections) => detections,
                Err(e) => {
                    log::warn!("detector error on frame {}: {}", frame.seq, e);
                    std::thread::sleep(frame_interval);
                    continue;
                }
            }
        };

        let updates = monitor.process_frame(&detections);

        let mut forwarded = Vec::with_capacity(updates.len());
        for update in &updates {
            let decision = policy.decide(*update);
            if let Some(update) = decision.forward {
                forwarded.push(update);
            }
            if let Some(led) = led.as_mut() {
                if let Err(e) = led.notify(update.zone_id, decision.led) {
                    log::warn!("led sink error: {}", e);
                }
            }
        }
        for sink in sinks.iter_mut() {
            if let Err(e) = sink.publish(&forwarded) {
                log::warn!("{} sink error: {}", sink.name(), e);
            }
        }

        frames += 1;
        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "camera health={} frames={} source={}",
                source.is_healthy(),
                stats.frames_captured,
                stats.source
            );
            last_health_log = Instant::now();
        }

        if let Some(remaining) = frame_interval.checked_sub(frame_started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    log::info!("shutdown signal received after {} frames", frames);
    Ok(())
}
