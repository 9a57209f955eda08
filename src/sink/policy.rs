use std::collections::HashSet;

use crate::occupancy::SpotState;
use crate::sink::LedColor;
use crate::StatusUpdate;

/// What the daemon should do with one spot's update this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishDecision {
    /// Update to forward to publishing sinks, if any. `None` for held
    /// spots: the reservation system owns their published status and
    /// the camera must not overwrite it.
    pub forward: Option<StatusUpdate>,
    /// LED command for the spot.
    pub led: LedColor,
}

/// Reservation-hold policy applied between the core and the sinks.
///
/// Held spot ids come from the booking boundary (config at startup, a
/// cloud watcher at runtime); the policy itself is plain state with no
/// I/O so it can be tested by itself.
#[derive(Clone, Debug, Default)]
pub struct HoldPolicy {
    held: HashSet<u32>,
}

impl HoldPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_held<I: IntoIterator<Item = u32>>(ids: I) -> Self {
        Self {
            held: ids.into_iter().collect(),
        }
    }

    pub fn hold(&mut self, zone_id: u32) {
        self.held.insert(zone_id);
    }

    pub fn release(&mut self, zone_id: u32) {
        self.held.remove(&zone_id);
    }

    pub fn is_held(&self, zone_id: u32) -> bool {
        self.held.contains(&zone_id)
    }

    /// Resolve one update into a publish/LED decision.
    pub fn decide(&self, update: StatusUpdate) -> PublishDecision {
        if self.is_held(update.zone_id) {
            PublishDecision {
                forward: None,
                led: LedColor::Yellow,
            }
        } else {
            PublishDecision {
                forward: Some(update),
                led: LedColor::for_status(update.status),
            }
        }
    }
}
