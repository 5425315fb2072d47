//! Analysis request/response models

use serde::{Deserialize, Serialize};

use crate::detector::labels::{Equipment, REQUIRED_EQUIPMENT};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64-encoded image, optionally with a data-URI header
    /// (`data:image/png;base64,...`).
    pub image: Option<String>,
}

/// Outcome of one compliance check. `detected_equipment` and
/// `missing_items` always partition the required set in its fixed order,
/// and `approved` holds exactly when nothing is missing.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceResult {
    pub approved: bool,
    #[serde(rename = "detectedEquipment")]
    pub detected_equipment: Vec<Equipment>,
    #[serde(rename = "missingItems")]
    pub missing_items: Vec<Equipment>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComplianceResult {
    /// Conservative result for a failed analysis: nothing approved, every
    /// required item reported missing, diagnostic carried in `error`.
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            approved: false,
            detected_equipment: Vec::new(),
            missing_items: REQUIRED_EQUIPMENT.to_vec(),
            message: "analysis failed".to_string(),
            error: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys_are_camel_case() {
        let result = ComplianceResult {
            approved: true,
            detected_equipment: vec![Equipment::Helmet],
            missing_items: vec![Equipment::Mask, Equipment::Vest],
            message: "m".to_string(),
            error: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["approved"], true);
        assert_eq!(value["detectedEquipment"], serde_json::json!(["helmet"]));
        assert_eq!(value["missingItems"], serde_json::json!(["mask", "vest"]));
        assert_eq!(value["message"], "m");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_reports_all_items_missing() {
        let result = ComplianceResult::failure("model exploded");
        assert!(!result.approved);
        assert!(result.detected_equipment.is_empty());
        assert_eq!(result.missing_items, REQUIRED_EQUIPMENT.to_vec());
        assert_eq!(result.error.as_deref(), Some("model exploded"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["error"], "model exploded");
    }
}
