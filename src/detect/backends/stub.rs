use std::collections::VecDeque;

use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::Detection;

/// Stub backend for tests and `stub` deployments.
///
/// Replays a scripted sequence of detection lists, one list per frame.
/// Once the script runs dry the last list keeps repeating, which makes
/// "a car stays parked" trivial to express; an unscripted stub reports
/// empty frames.
pub struct StubBackend {
    script: VecDeque<Vec<Detection>>,
    last: Vec<Detection>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            last: Vec::new(),
        }
    }

    pub fn with_script<I: IntoIterator<Item = Vec<Detection>>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: Vec::new(),
        }
    }

    /// Append one frame's detections to the script.
    pub fn push_frame(&mut self, detections: Vec<Detection>) {
        self.script.push_back(detections);
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>> {
        if let Some(frame) = self.script.pop_front() {
            self.last = frame;
        }
        Ok(self.last.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::BoundingBox;

    fn det(label: &str) -> Detection {
        Detection {
            label: label.to_string(),
            confidence: 0.9,
            bbox: BoundingBox {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            },
        }
    }

    #[test]
    fn unscripted_stub_reports_empty_frames() {
        let mut stub = StubBackend::new();
        assert!(stub.detect(&[], 0, 0).unwrap().is_empty());
    }

    #[test]
    fn script_replays_in_order_then_repeats_last() {
        let mut stub = StubBackend::with_script(vec![vec![det("car")], vec![]]);
        assert_eq!(stub.detect(&[], 0, 0).unwrap().len(), 1);
        assert!(stub.detect(&[], 0, 0).unwrap().is_empty());
        // Script exhausted: the empty frame repeats.
        assert!(stub.detect(&[], 0, 0).unwrap().is_empty());

        let mut stub = StubBackend::with_script(vec![vec![det("truck")]]);
        for _ in 0..3 {
            assert_eq!(stub.detect(&[], 0, 0).unwrap()[0].label, "truck");
        }
    }
}
