//! Per-spot occupancy debouncing.
//!
//! A single frame is noisy: a detection flickering in or out for one
//! frame must not flip a spot. Each spot keeps a sliding window of the
//! most recent raw states and reports the majority as its stable
//! status. A tied window resolves to [`SpotState::Free`].

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Default sliding-window capacity, in frames.
pub const HISTORY_LENGTH: usize = 10;

/// Instantaneous or debounced occupancy of one parking spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotState {
    Occupied,
    Free,
}

/// Sliding window of raw states for one spot.
///
/// Classic bounded FIFO: the newest raw state is appended each frame
/// and the oldest is evicted once the window is full. The stable status
/// is Occupied only while Occupied entries strictly outnumber Free
/// entries; during warm-up the vote runs over whatever entries exist.
#[derive(Clone, Debug)]
pub struct SpotHistory {
    window: VecDeque<SpotState>,
    capacity: usize,
    status: SpotState,
}

impl SpotHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            status: SpotState::Free,
        }
    }

    /// Record this frame's raw state and return the updated stable
    /// status.
    pub fn push(&mut self, raw: SpotState) -> SpotState {
        self.window.push_back(raw);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let occupied = self
            .window
            .iter()
            .filter(|s| **s == SpotState::Occupied)
            .count();
        let free = self.window.len() - occupied;
        self.status = if occupied > free {
            SpotState::Occupied
        } else {
            SpotState::Free
        };
        self.status
    }

    /// Current stable status without recording a new frame.
    pub fn status(&self) -> SpotState {
        self.status
    }

    /// Number of frames currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

/// Occupancy state for the whole lot, one [`SpotHistory`] per zone id.
///
/// Histories are created up front for every registered zone and live
/// for the whole run. The tracker is plain owned state threaded through
/// the frame loop; the loop is single-threaded, so one writer per spot
/// holds by construction.
#[derive(Debug)]
pub struct OccupancyTracker {
    spots: HashMap<u32, SpotHistory>,
    capacity: usize,
}

impl OccupancyTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            spots: HashMap::new(),
            capacity,
        }
    }

    /// Register a spot with an empty window and a Free status.
    /// Re-registering an id resets its history.
    pub fn register(&mut self, zone_id: u32) {
        self.spots.insert(zone_id, SpotHistory::new(self.capacity));
    }

    /// Record a raw state for a spot and return its stable status.
    ///
    /// Unknown ids are registered on the fly so the tracker stays total
    /// for any zone set handed to it.
    pub fn update(&mut self, zone_id: u32, raw: SpotState) -> SpotState {
        let capacity = self.capacity;
        self.spots
            .entry(zone_id)
            .or_insert_with(|| SpotHistory::new(capacity))
            .push(raw)
    }

    /// Stable status of a spot, if it is registered.
    pub fn status(&self, zone_id: u32) -> Option<SpotState> {
        self.spots.get(&zone_id).map(|h| h.status())
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_free_with_empty_window() {
        let history = SpotHistory::new(HISTORY_LENGTH);
        assert_eq!(history.status(), SpotState::Free);
        assert!(history.is_empty());
    }

    #[test]
    fn majority_occupied_wins() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        for _ in 0..6 {
            history.push(SpotState::Occupied);
        }
        for _ in 0..4 {
            history.push(SpotState::Free);
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.status(), SpotState::Occupied);
    }

    #[test]
    fn tie_resolves_to_free() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        for _ in 0..5 {
            history.push(SpotState::Occupied);
        }
        for _ in 0..5 {
            history.push(SpotState::Free);
        }
        assert_eq!(history.status(), SpotState::Free);
    }

    #[test]
    fn warmup_votes_over_partial_window() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        assert_eq!(history.push(SpotState::Occupied), SpotState::Occupied);
        // 1 occupied / 1 free is a tie: free.
        assert_eq!(history.push(SpotState::Free), SpotState::Free);
        assert_eq!(history.push(SpotState::Occupied), SpotState::Occupied);
    }

    #[test]
    fn oldest_entry_is_evicted_first() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        for _ in 0..10 {
            history.push(SpotState::Occupied);
        }
        // Six Free frames: window becomes 4 occupied / 6 free.
        for _ in 0..6 {
            history.push(SpotState::Free);
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.status(), SpotState::Free);
    }

    #[test]
    fn old_states_stop_counting_after_capacity_frames() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        for _ in 0..100 {
            history.push(SpotState::Occupied);
        }
        // Ten Free frames fully displace the occupied run.
        for _ in 0..10 {
            history.push(SpotState::Free);
        }
        assert_eq!(history.status(), SpotState::Free);
        assert_eq!(history.len(), 10);
    }

    #[test]
    fn homogeneous_full_window_is_idempotent() {
        let mut history = SpotHistory::new(HISTORY_LENGTH);
        for _ in 0..10 {
            history.push(SpotState::Occupied);
        }
        for _ in 0..20 {
            assert_eq!(history.push(SpotState::Occupied), SpotState::Occupied);
        }
    }

    #[test]
    fn tracker_keeps_spots_independent() {
        let mut tracker = OccupancyTracker::new(HISTORY_LENGTH);
        tracker.register(1);
        tracker.register(2);
        for _ in 0..3 {
            tracker.update(1, SpotState::Occupied);
            tracker.update(2, SpotState::Free);
        }
        assert_eq!(tracker.status(1), Some(SpotState::Occupied));
        assert_eq!(tracker.status(2), Some(SpotState::Free));
        assert_eq!(tracker.status(3), None);
    }

    #[test]
    fn tracker_registers_unknown_ids_on_update() {
        let mut tracker = OccupancyTracker::new(HISTORY_LENGTH);
        assert_eq!(tracker.update(7, SpotState::Occupied), SpotState::Occupied);
        assert_eq!(tracker.len(), 1);
    }
}
