//! parkwatch - camera-based parking occupancy monitor.
//!
//! A pretrained object detector watches a parking lot; this crate maps
//! its per-frame detections onto user-drawn parking-spot polygons and
//! derives a stable, debounced occupancy status per spot.
//!
//! # Architecture
//!
//! Data flow per frame:
//!
//! 1. A frame source (`ingest`) hands a frame to a detector backend
//!    (`detect`), which returns labeled detections.
//! 2. The [`Monitor`] filters detections by class allow-list and
//!    confidence, reduces each surviving bounding box to its centroid,
//!    and tests centroids against every zone's convex hull (`zones`,
//!    `geometry`). A zone is raw-Occupied for the frame when at least
//!    one centroid lands inside it.
//! 3. The per-spot debouncer (`occupancy`) votes over a sliding window
//!    of raw states and emits the stable status.
//! 4. Sinks (`sink`) consume `(zone_id, status)` tuples: transition
//!    log, LED controller byte stream, MQTT broker.
//!
//! The frame loop is single-threaded and synchronous; the monitor is an
//! explicit value owning all per-run state, passed through the loop
//! rather than living in globals. All blocking I/O (capture, inference,
//! publishing) stays with the collaborators around the core.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod detect;
pub mod geometry;
pub mod ingest;
pub mod occupancy;
pub mod sink;
pub mod zones;

pub use config::MonitorConfig;
pub use detect::{BackendRegistry, BoundingBox, Detection, DetectorBackend, StubBackend};
pub use geometry::Point;
pub use ingest::{CameraConfig, CameraSource, Frame};
pub use occupancy::{OccupancyTracker, SpotHistory, SpotState, HISTORY_LENGTH};
pub use sink::{HoldPolicy, LedColor, LedNotifier, LogSink, PublishDecision, StatusSink};
pub use zones::{Zone, ZoneStore, MIN_ZONE_VERTICES};

/// Default object classes that count as parked vehicles.
pub const DEFAULT_VEHICLE_CLASSES: &[&str] = &["car", "truck"];

/// Default minimum detection confidence.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.45;

/// Stable status of one spot for one frame, as handed to sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub zone_id: u32,
    pub status: SpotState,
}

/// Per-run monitoring context: the zone set, the per-spot debouncer,
/// and the detection filter.
///
/// One `Monitor` per camera. Zones are immutable for the lifetime of
/// the monitor; every zone gets its history at construction, so
/// [`Monitor::process_frame`] is total.
pub struct Monitor {
    store: ZoneStore,
    tracker: OccupancyTracker,
    classes: HashSet<String>,
    confidence_threshold: f32,
}

impl Monitor {
    /// Build a monitor over a zone set with the default vehicle
    /// allow-list, confidence threshold, and smoothing window.
    pub fn new(store: ZoneStore) -> Self {
        let mut tracker = OccupancyTracker::new(HISTORY_LENGTH);
        for zone in store.iter() {
            tracker.register(zone.id);
        }
        Self {
            store,
            tracker,
            classes: DEFAULT_VEHICLE_CLASSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Replace the class allow-list.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the minimum detection confidence.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Replace the smoothing window length, resetting all histories.
    pub fn with_window(mut self, window: usize) -> Self {
        let mut tracker = OccupancyTracker::new(window);
        for zone in self.store.iter() {
            tracker.register(zone.id);
        }
        self.tracker = tracker;
        self
    }

    pub fn zones(&self) -> &ZoneStore {
        &self.store
    }

    /// Run one frame's detections through containment and debouncing.
    ///
    /// Returns one update per zone, every frame, in zone-file order.
    /// An empty detection slice is a normal frame: every zone's raw
    /// state is Free. A zone is raw-Occupied when at least one
    /// surviving centroid lies on or inside its hull; the scan
    /// short-circuits on the first hit.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Vec<StatusUpdate> {
        let centroids: Vec<Point> = detections
            .iter()
            .filter(|d| {
                d.confidence >= self.confidence_threshold && self.classes.contains(&d.label)
            })
            .map(|d| d.bbox.centroid())
            .collect();
        log::debug!(
            "frame: {} detections, {} vehicle centroids",
            detections.len(),
            centroids.len()
        );

        let mut updates = Vec::with_capacity(self.store.len());
        for zone in self.store.iter() {
            let raw = if centroids.iter().any(|c| zone.contains(*c)) {
                SpotState::Occupied
            } else {
                SpotState::Free
            };
            let status = self.tracker.update(zone.id, raw);
            updates.push(StatusUpdate {
                zone_id: zone.id,
                status,
            });
        }
        updates
    }

    /// Current stable status of a spot without consuming a frame.
    pub fn status(&self, zone_id: u32) -> Option<SpotState> {
        self.tracker.status(zone_id)
    }
}

/// Build a monitor straight from validated configuration.
pub fn monitor_from_config(cfg: &MonitorConfig) -> Result<Monitor> {
    let store = ZoneStore::load(&cfg.zones_path)?;
    Ok(Monitor::new(store)
        .with_classes(cfg.detector.classes.iter().cloned())
        .with_confidence_threshold(cfg.detector.confidence_threshold)
        .with_window(cfg.smoothing.window))
}
