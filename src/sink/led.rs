use std::io::Write;

use anyhow::{Context, Result};

use crate::occupancy::SpotState;
use crate::sink::StatusSink;
use crate::StatusUpdate;

/// LED color shown at a spot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedColor {
    /// Occupied.
    Red,
    /// Free.
    Green,
    /// Reserved/held, regardless of what the camera sees.
    Yellow,
}

impl LedColor {
    pub fn code(self) -> u8 {
        match self {
            LedColor::Red => b'R',
            LedColor::Green => b'G',
            LedColor::Yellow => b'Y',
        }
    }

    pub fn for_status(status: SpotState) -> Self {
        match status {
            SpotState::Occupied => LedColor::Red,
            SpotState::Free => LedColor::Green,
        }
    }
}

/// Writes per-spot LED commands to a byte stream.
///
/// Wire format is one `<id><color>` pair per command, decimal id
/// digits followed by `R`/`G`/`Y` - the framing the LED controller
/// firmware expects. The notifier is generic over `Write`; the daemon
/// hands it the opened serial device, tests hand it a buffer. Line
/// discipline (baud rate etc.) is configured outside the process.
pub struct LedNotifier<W: Write + Send> {
    port: W,
}

impl<W: Write + Send> LedNotifier<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    /// Send one LED command.
    pub fn notify(&mut self, spot_id: u32, color: LedColor) -> Result<()> {
        let mut frame = spot_id.to_string().into_bytes();
        frame.push(color.code());
        self.port
            .write_all(&frame)
            .with_context(|| format!("failed to send LED command for spot {}", spot_id))?;
        self.port.flush().context("failed to flush LED port")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write + Send> StatusSink for LedNotifier<W> {
    fn name(&self) -> &'static str {
        "led"
    }

    /// Hold-unaware mapping: occupied is red, free is green. Deployments
    /// with reservation holds route commands through
    /// [`crate::sink::HoldPolicy`] and call [`LedNotifier::notify`]
    /// directly instead.
    fn publish(&mut self, updates: &[StatusUpdate]) -> Result<()> {
        for update in updates {
            self.notify(update.zone_id, LedColor::for_status(update.status))?;
        }
        Ok(())
    }
}
