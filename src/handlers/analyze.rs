//! PPE analysis handler

use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::DynamicImage;

use crate::compliance::{self, DetectionFlags};
use crate::detector::{labels, Detector};
use crate::models::{AnalyzeRequest, ComplianceResult};
use crate::{AppError, AppResult, AppState};

/// Run a compliance check on a base64-encoded image.
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> AppResult<Json<ComplianceResult>> {
    let detector = state
        .detector
        .clone()
        .ok_or(AppError::DetectorNotInitialized)?;

    let encoded = req
        .image
        .filter(|s| !s.is_empty())
        .ok_or(AppError::ImageNotProvided)?;

    // strip an optional data-URI header ("data:image/png;base64,....")
    let payload = match encoded.split_once(',') {
        Some((_, rest)) => rest.to_string(),
        None => encoded,
    };

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| AppError::ImageProcessing(e.to_string()))?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| AppError::ImageProcessing(e.to_string()))?;

    // inference is CPU-bound, keep it off the async workers
    let result = tokio::task::spawn_blocking(move || run_analysis(&*detector, &image))
        .await
        .map_err(|e| AppError::ImageProcessing(e.to_string()))?;

    tracing::info!(approved = result.approved, "analysis complete: {}", result.message);

    Ok(Json(result))
}

/// Detect, normalize labels, and apply the compliance policy. A detector
/// failure degrades to a conservative not-approved result instead of
/// failing the request.
fn run_analysis(detector: &dyn Detector, image: &DynamicImage) -> ComplianceResult {
    match detector.detect(image) {
        Ok(detections) => {
            let mut flags = DetectionFlags::default();
            for d in &detections {
                match labels::normalize(&d.label) {
                    Some(term) => {
                        tracing::debug!("detected {} (score {:.2})", term.as_str(), d.score);
                        flags.set(term);
                    }
                    None => tracing::debug!("ignoring {} (score {:.2})", d.label, d.score),
                }
            }
            compliance::analyze(flags)
        }
        Err(e) => {
            tracing::error!("detection failed: {}", e);
            ComplianceResult::failure(e.to_string())
        }
    }
}
