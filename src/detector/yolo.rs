//! YOLO detection backend - ONNX Runtime integration
//!
//! Loads the PPE model once at startup and runs the standard YOLOv8
//! pipeline per request: letterbox to 640x640, one forward pass, decode
//! the `[1, 4+nc, N]` output, then per-class non-maximum suppression.

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::labels::MODEL_CLASS_NAMES;
use super::{Detection, Detector, DetectorError};

/// Model input edge length.
pub const INPUT_SIZE: u32 = 640;

/// Minimum score for a box to count as a detection.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// IoU above which two same-class boxes are considered duplicates.
pub const IOU_THRESHOLD: f32 = 0.45;

/// Letterbox padding fill, the ultralytics gray.
const PAD_FILL: f32 = 114.0 / 255.0;

pub struct YoloDetector {
    // session.run takes &mut self, so inference is serialized here
    session: Mutex<Session>,
}

impl YoloDetector {
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !std::path::Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()
            .map_err(|e| DetectorError::Session(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectorError::Session(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| DetectorError::Session(e.to_string()))?;

        tracing::info!("ONNX model loaded from {}", model_path);

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectorError> {
        let (orig_w, orig_h) = image.dimensions();
        let (input, letterbox) = preprocess(image);

        let input_tensor = Value::from_array(input)
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let mut session = self.session.lock();

        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| DetectorError::OutputShape("model defines no outputs".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| DetectorError::OutputShape("missing output tensor".to_string()))?;

        let extracted = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectorError::OutputShape(e.to_string()))?;
        let data = extracted.1;

        postprocess(data, &letterbox, orig_w, orig_h)
    }
}

/// Letterbox transform applied during preprocessing; needed to map boxes
/// back to original-image coordinates.
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

/// Resize with preserved aspect ratio onto a gray 640x640 canvas and pack
/// into an NCHW float tensor.
fn preprocess(image: &DynamicImage) -> (Array4<f32>, Letterbox) {
    let (w, h) = image.dimensions();
    let side = INPUT_SIZE as f32;
    let scale = (side / w as f32).min(side / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    let pad_x = ((INPUT_SIZE - new_w) / 2) as f32;
    let pad_y = ((INPUT_SIZE - new_h) / 2) as f32;

    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut input = Array4::<f32>::from_elem((1, 3, size, size), PAD_FILL);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let dx = x as usize + pad_x as usize;
        let dy = y as usize + pad_y as usize;
        input[[0, 0, dy, dx]] = pixel[0] as f32 / 255.0;
        input[[0, 1, dy, dx]] = pixel[1] as f32 / 255.0;
        input[[0, 2, dy, dx]] = pixel[2] as f32 / 255.0;
    }

    (input, Letterbox { scale, pad_x, pad_y })
}

/// Decode the raw YOLOv8 output into thresholded, NMS-filtered detections
/// in original-image coordinates.
///
/// Layout is attribute-major: `data[attr * anchors + anchor]`, attributes
/// being cx, cy, w, h followed by one score per class.
fn postprocess(
    data: &[f32],
    letterbox: &Letterbox,
    orig_w: u32,
    orig_h: u32,
) -> Result<Vec<Detection>, DetectorError> {
    let attrs = 4 + MODEL_CLASS_NAMES.len();
    if data.is_empty() || data.len() % attrs != 0 {
        return Err(DetectorError::OutputShape(format!(
            "output length {} is not a multiple of {} attributes",
            data.len(),
            attrs
        )));
    }
    let anchors = data.len() / attrs;

    let mut candidates = Vec::new();
    for a in 0..anchors {
        let mut best_class = 0usize;
        let mut best_score = 0f32;
        for c in 0..MODEL_CLASS_NAMES.len() {
            let score = data[(4 + c) * anchors + a];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }
        if best_score < CONFIDENCE_THRESHOLD {
            continue;
        }

        let cx = data[a];
        let cy = data[anchors + a];
        let w = data[2 * anchors + a];
        let h = data[3 * anchors + a];

        let x1 = (((cx - w / 2.0) - letterbox.pad_x) / letterbox.scale).clamp(0.0, orig_w as f32);
        let y1 = (((cy - h / 2.0) - letterbox.pad_y) / letterbox.scale).clamp(0.0, orig_h as f32);
        let x2 = (((cx + w / 2.0) - letterbox.pad_x) / letterbox.scale).clamp(0.0, orig_w as f32);
        let y2 = (((cy + h / 2.0) - letterbox.pad_y) / letterbox.scale).clamp(0.0, orig_h as f32);

        candidates.push(Detection {
            x1,
            y1,
            x2,
            y2,
            score: best_score,
            class_id: best_class,
            label: MODEL_CLASS_NAMES[best_class].to_string(),
        });
    }

    Ok(nms(candidates, IOU_THRESHOLD))
}

/// Greedy per-class non-maximum suppression.
fn nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    'candidates: for det in detections {
        for k in &kept {
            if k.class_id == det.class_id && iou(k, &det) > iou_threshold {
                continue 'candidates;
            }
        }
        kept.push(det);
    }
    kept
}

fn iou(a: &Detection, b: &Detection) -> f32 {
    let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = ix * iy;
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}
