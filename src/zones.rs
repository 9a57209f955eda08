//! Parking-spot zone definitions.
//!
//! Zones come from a declarative JSON file produced by the spot-drawing
//! tooling: an array of `{"id": <int>, "points": [[x, y], ...]}`
//! entries. The file is parsed into typed [`Zone`] values and validated
//! eagerly; a malformed file must fail before the frame loop starts,
//! never as a misclassification at runtime.

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::geometry::{convex_hull, hull_contains, Point};

/// Minimum vertex count for a drawn zone.
pub const MIN_ZONE_VERTICES: usize = 3;

#[derive(Debug, Deserialize)]
struct ZoneRecord {
    id: u32,
    points: Vec<[i32; 2]>,
}

/// One monitored parking spot.
///
/// `points` are the vertices as drawn; `hull` is their convex hull,
/// computed once at load and used for every containment test. A
/// concave drawing therefore behaves as its convex hull — that is the
/// documented contract of the containment test, not an accident.
#[derive(Clone, Debug)]
pub struct Zone {
    pub id: u32,
    pub points: Vec<Point>,
    hull: Vec<Point>,
}

impl Zone {
    /// Build a zone from drawn vertices, validating that they form a
    /// usable polygon.
    pub fn new(id: u32, points: Vec<Point>) -> Result<Self> {
        if points.len() < MIN_ZONE_VERTICES {
            return Err(anyhow!(
                "zone {} has {} vertices, need at least {}",
                id,
                points.len(),
                MIN_ZONE_VERTICES
            ));
        }
        let hull = convex_hull(&points);
        if hull.len() < MIN_ZONE_VERTICES {
            return Err(anyhow!(
                "zone {} is degenerate: vertices are collinear or duplicated",
                id
            ));
        }
        Ok(Self { id, points, hull })
    }

    /// Boundary-inclusive test of a detection centroid against the
    /// zone's convex hull.
    pub fn contains(&self, p: Point) -> bool {
        hull_contains(&self.hull, p)
    }

    /// Hull vertices in counter-clockwise order.
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }
}

/// The static set of zones for one camera, loaded once at startup and
/// read-only afterwards. Reconfiguration means reloading the file.
#[derive(Clone, Debug, Default)]
pub struct ZoneStore {
    zones: Vec<Zone>,
}

impl ZoneStore {
    /// Load zones from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read zone file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid zone file {}", path.display()))
    }

    /// Load zones from any reader (tests, embedded fixtures).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        let records: Vec<ZoneRecord> =
            serde_json::from_str(raw).context("zone file must be a JSON array of {id, points}")?;
        if records.is_empty() {
            return Err(anyhow!("zone file defines no zones"));
        }

        let mut seen: HashSet<u32> = HashSet::new();
        let mut zones = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id) {
                return Err(anyhow!("duplicate zone id {}", record.id));
            }
            let points = record
                .points
                .iter()
                .map(|[x, y]| Point::new(*x, *y))
                .collect();
            zones.push(Zone::new(record.id, points)?);
        }
        Ok(Self { zones })
    }

    pub fn get(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Zones in file order. The frame loop reports statuses in this
    /// order, so it is stable across frames.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
