//! Status sinks.
//!
//! The monitor core emits pure `(zone_id, status)` tuples; everything
//! side-effecting lives behind [`StatusSink`]. The daemon fans each
//! frame's updates out to its configured sinks and treats sink errors
//! as non-fatal: a broker outage must not stall the frame loop.
//!
//! Reservation holds are a sink-level policy, not a debouncer concern:
//! the camera never overwrites a held spot's published status, and a
//! held spot's LED shows yellow regardless of what the detector sees.

mod led;
mod log_sink;
#[cfg(feature = "sink-mqtt")]
mod mqtt;
mod policy;

pub use led::{LedColor, LedNotifier};
pub use log_sink::LogSink;
#[cfg(feature = "sink-mqtt")]
pub use mqtt::{MqttSink, MqttSinkConfig};
pub use policy::{HoldPolicy, PublishDecision};

use anyhow::Result;

use crate::StatusUpdate;

/// Consumer of per-frame stable statuses.
pub trait StatusSink: Send {
    /// Sink identifier for logging.
    fn name(&self) -> &'static str;

    /// Publish one frame's updates. Implementations decide their own
    /// delivery policy (every frame, transitions only, batched); the
    /// tuples themselves arrive unchanged from the core.
    fn publish(&mut self, updates: &[StatusUpdate]) -> Result<()>;
}
