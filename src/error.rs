//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing request failures. Detector failures caught inside the
/// analyzer never surface here; they come back as a ComplianceResult with
/// `error` set.
#[derive(Debug)]
pub enum AppError {
    /// `image` key absent or empty in the analyze payload.
    ImageNotProvided,

    /// The model failed to load at startup; analysis is unavailable.
    DetectorNotInitialized,

    /// Base64 or image decoding failed before the analyzer ran.
    ImageProcessing(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ImageNotProvided => {
                (StatusCode::BAD_REQUEST, "image not provided".to_string())
            }
            AppError::DetectorNotInitialized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "detector not initialized".to_string(),
            ),
            AppError::ImageProcessing(detail) => {
                tracing::error!("image processing failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("error processing image: {}", detail),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
