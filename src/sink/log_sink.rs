use std::collections::HashMap;

use anyhow::Result;

use crate::occupancy::SpotState;
use crate::sink::StatusSink;
use crate::StatusUpdate;

/// Sink that logs status transitions.
///
/// Edge-triggered: the per-frame stream repeats each spot's status
/// every frame, so this sink remembers the last published status per
/// spot and only logs changes (plus the first status it sees).
#[derive(Debug, Default)]
pub struct LogSink {
    last: HashMap<u32, SpotState>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn publish(&mut self, updates: &[StatusUpdate]) -> Result<()> {
        for update in updates {
            let changed = self.last.get(&update.zone_id) != Some(&update.status);
            if changed {
                log::info!("spot {} -> {:?}", update.zone_id, update.status);
                self.last.insert(update.zone_id, update.status);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_last_status_per_spot() {
        let mut sink = LogSink::new();
        let occupied = StatusUpdate {
            zone_id: 1,
            status: SpotState::Occupied,
        };
        let free = StatusUpdate {
            zone_id: 1,
            status: SpotState::Free,
        };
        sink.publish(&[occupied]).unwrap();
        sink.publish(&[occupied]).unwrap();
        assert_eq!(sink.last.get(&1), Some(&SpotState::Occupied));
        sink.publish(&[free]).unwrap();
        assert_eq!(sink.last.get(&1), Some(&SpotState::Free));
    }
}
