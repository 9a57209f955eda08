#![cfg(feature = "backend-tract")]

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{BoundingBox, Detection};

/// Tract-based backend for SSD-style ONNX detection models.
///
/// The backend loads a local model file plus a labels file (one class
/// name per line, ids 1-based as in the COCO label map) and performs
/// inference on RGB frames. It does not perform any network I/O or
/// write to disk beyond model loading.
///
/// The model output is expected as rows of
/// `[batch, class_id, score, x1, y1, x2, y2]` with normalized corner
/// coordinates, the layout SSD detection heads export.
pub struct TractBackend {
    model: TypedSimplePlan<TypedModel>,
    labels: Vec<String>,
    width: u32,
    height: u32,
}

impl TractBackend {
    /// Load an ONNX detection model and its labels file.
    pub fn new<P: AsRef<Path>, L: AsRef<Path>>(
        model_path: P,
        labels_path: L,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        let labels = load_labels(labels_path.as_ref())?;

        Ok(Self {
            model,
            labels,
            width,
            height,
        })
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        if width != self.width || height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                width,
                height,
                self.width,
                self.height
            ));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;

        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        // SSD MobileNet normalization: mean 127.5, scale 1/127.5.
        let width = width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                (pixels[idx] as f32 - 127.5) / 127.5
            },
        );

        Ok(input.into_tensor())
    }

    fn decode(&self, outputs: TVec<TValue>) -> Result<Vec<Detection>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let rows = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;
        let flat: Vec<f32> = rows.iter().cloned().collect();
        if flat.len() % 7 != 0 {
            return Err(anyhow!(
                "detection output length {} is not a multiple of 7",
                flat.len()
            ));
        }

        let mut detections = Vec::new();
        for row in flat.chunks_exact(7) {
            let class_id = row[1] as usize;
            let score = row[2];
            // Ids are 1-based; 0 is background. Unknown ids are skipped
            // rather than failing the frame.
            if class_id == 0 || class_id > self.labels.len() {
                continue;
            }
            let x1 = row[3] * self.width as f32;
            let y1 = row[4] * self.height as f32;
            let x2 = row[5] * self.width as f32;
            let y2 = row[6] * self.height as f32;
            detections.push(Detection {
                label: self.labels[class_id - 1].clone(),
                confidence: score,
                bbox: BoundingBox {
                    x: x1 as i32,
                    y: y1 as i32,
                    width: (x2 - x1) as i32,
                    height: (y2 - y1) as i32,
                },
            });
        }
        Ok(detections)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.decode(outputs)
    }
}

fn load_labels(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read labels file {}", path.display()))?;
    let labels: Vec<String> = raw
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if labels.is_empty() {
        return Err(anyhow!("labels file {} is empty", path.display()));
    }
    Ok(labels)
}
