//! Label vocabulary
//!
//! The PPE model is trained on the public construction-safety dataset whose
//! class names (`hardhat`, `no-hardhat`, ...) differ from the equipment
//! vocabulary the compliance policy reasons about. This module owns both
//! vocabularies and the mapping between them.

use serde::Serialize;

/// Class names the PPE model was trained on. Class ids emitted by the
/// detector index into this table.
pub const MODEL_CLASS_NAMES: [&str; 10] = [
    "hardhat",
    "mask",
    "no-hardhat",
    "no-mask",
    "no-safety-vest",
    "person",
    "safety-cone",
    "safety-vest",
    "machinery",
    "vehicle",
];

/// Normalized vocabulary term. Positive and negative equipment signals are
/// distinct terms; the policy combines them in `compliance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentLabel {
    Helmet,
    NoHelmet,
    Mask,
    NoMask,
    Vest,
    NoVest,
    Person,
}

impl EquipmentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentLabel::Helmet => "helmet",
            EquipmentLabel::NoHelmet => "no_helmet",
            EquipmentLabel::Mask => "mask",
            EquipmentLabel::NoMask => "no_mask",
            EquipmentLabel::Vest => "vest",
            EquipmentLabel::NoVest => "no_vest",
            EquipmentLabel::Person => "person",
        }
    }
}

/// A mandatory equipment item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Helmet,
    Mask,
    Vest,
}

/// Mandatory items, in the order they are reported.
pub const REQUIRED_EQUIPMENT: [Equipment; 3] =
    [Equipment::Helmet, Equipment::Mask, Equipment::Vest];

impl Equipment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Equipment::Helmet => "helmet",
            Equipment::Mask => "mask",
            Equipment::Vest => "vest",
        }
    }

    /// Vocabulary term signalling this item was seen.
    pub fn present(&self) -> EquipmentLabel {
        match self {
            Equipment::Helmet => EquipmentLabel::Helmet,
            Equipment::Mask => EquipmentLabel::Mask,
            Equipment::Vest => EquipmentLabel::Vest,
        }
    }

    /// Vocabulary term signalling this item was explicitly marked absent.
    pub fn absent(&self) -> EquipmentLabel {
        match self {
            Equipment::Helmet => EquipmentLabel::NoHelmet,
            Equipment::Mask => EquipmentLabel::NoMask,
            Equipment::Vest => EquipmentLabel::NoVest,
        }
    }
}

/// Map a raw detector class name to a normalized vocabulary term.
///
/// Published variants of the dataset disagree on casing and spacing
/// ("Hardhat" vs "hardhat", "NO-Safety Vest" vs "no-safety-vest"), so names
/// are folded before matching. Class names outside the vocabulary (cones,
/// machinery, ...) return `None` and never reach the compliance policy.
pub fn normalize(raw: &str) -> Option<EquipmentLabel> {
    let folded = raw.to_ascii_lowercase().replace(' ', "-");
    match folded.as_str() {
        "hardhat" => Some(EquipmentLabel::Helmet),
        "no-hardhat" => Some(EquipmentLabel::NoHelmet),
        "mask" => Some(EquipmentLabel::Mask),
        "no-mask" => Some(EquipmentLabel::NoMask),
        "safety-vest" => Some(EquipmentLabel::Vest),
        "no-safety-vest" => Some(EquipmentLabel::NoVest),
        "person" => Some(EquipmentLabel::Person),
        _ => None,
    }
}
