use anyhow::Result;

use crate::detect::result::Detection;

/// Detector backend seam.
///
/// A backend wraps one inference engine. The frame loop hands it raw
/// RGB24 pixels and gets labeled detections in pixel coordinates back;
/// everything about the engine (model files, scratch tensors, warm-up
/// cost) stays behind this trait. `detect` takes `&mut self` because
/// engines keep per-call state.
pub trait DetectorBackend: Send {
    /// Backend identifier, used for registry lookup and logging.
    fn name(&self) -> &'static str;

    /// Run detection on one frame.
    ///
    /// `pixels` is tightly packed RGB24 of `width * height` pixels and
    /// must be treated as read-only and ephemeral.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook, called once before the frame loop.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
