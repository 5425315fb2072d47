//! Object detection

pub mod labels;
pub mod yolo;

use image::DynamicImage;
use serde::Serialize;
use thiserror::Error;

/// One labeled, confidence-scored bounding box from the detector.
/// Coordinates are in original-image pixels. The compliance policy only
/// reads `label`; the box is kept for logging and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("failed to build inference session: {0}")]
    Session(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    OutputShape(String),
}

/// Detection backend. A failure is a typed error, never an empty detection
/// list, so callers cannot mistake a broken model for a clear image.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectorError>;
}
