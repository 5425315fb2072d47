//! Compliance policy
//!
//! Pure decision logic over normalized detection labels. Presence is
//! boolean per vocabulary term; confidence was already thresholded by the
//! detector and duplicate observations are idempotent.

use crate::detector::labels::{EquipmentLabel, REQUIRED_EQUIPMENT};
use crate::models::ComplianceResult;

pub const MSG_NO_PERSON: &str = "no person detected in the image";
pub const MSG_APPROVED: &str = "all mandatory equipment detected";

/// Which vocabulary terms were observed anywhere in the image.
/// Rebuilt per analysis, no cross-call state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionFlags {
    helmet: bool,
    no_helmet: bool,
    mask: bool,
    no_mask: bool,
    vest: bool,
    no_vest: bool,
    person: bool,
}

impl DetectionFlags {
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = EquipmentLabel>,
    {
        let mut flags = Self::default();
        for label in labels {
            flags.set(label);
        }
        flags
    }

    pub fn set(&mut self, label: EquipmentLabel) {
        match label {
            EquipmentLabel::Helmet => self.helmet = true,
            EquipmentLabel::NoHelmet => self.no_helmet = true,
            EquipmentLabel::Mask => self.mask = true,
            EquipmentLabel::NoMask => self.no_mask = true,
            EquipmentLabel::Vest => self.vest = true,
            EquipmentLabel::NoVest => self.no_vest = true,
            EquipmentLabel::Person => self.person = true,
        }
    }

    pub fn get(&self, label: EquipmentLabel) -> bool {
        match label {
            EquipmentLabel::Helmet => self.helmet,
            EquipmentLabel::NoHelmet => self.no_helmet,
            EquipmentLabel::Mask => self.mask,
            EquipmentLabel::NoMask => self.no_mask,
            EquipmentLabel::Vest => self.vest,
            EquipmentLabel::NoVest => self.no_vest,
            EquipmentLabel::Person => self.person,
        }
    }
}

/// Evaluate the compliance policy over one image's detection flags.
///
/// Without a detected person the equipment cannot be attributed to anyone,
/// so the result is a full rejection. Otherwise an item counts as detected
/// iff its positive term was seen and its negative term was not: an
/// explicit "no_x" signal overrides a co-occurring "x" signal.
pub fn analyze(flags: DetectionFlags) -> ComplianceResult {
    if !flags.get(EquipmentLabel::Person) {
        return ComplianceResult {
            approved: false,
            detected_equipment: Vec::new(),
            missing_items: REQUIRED_EQUIPMENT.to_vec(),
            message: MSG_NO_PERSON.to_string(),
            error: None,
        };
    }

    let mut detected_equipment = Vec::new();
    let mut missing_items = Vec::new();
    for item in REQUIRED_EQUIPMENT {
        if flags.get(item.present()) && !flags.get(item.absent()) {
            detected_equipment.push(item);
        } else {
            missing_items.push(item);
        }
    }

    let approved = missing_items.is_empty();
    let message = if approved {
        MSG_APPROVED.to_string()
    } else {
        let names: Vec<&str> = missing_items.iter().map(|e| e.as_str()).collect();
        format!("missing equipment: {}", names.join(", "))
    };

    ComplianceResult {
        approved,
        detected_equipment,
        missing_items,
        message,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::labels::Equipment;

    fn flags(labels: &[EquipmentLabel]) -> DetectionFlags {
        DetectionFlags::from_labels(labels.iter().copied())
    }

    const ALL_LABELS: [EquipmentLabel; 7] = [
        EquipmentLabel::Helmet,
        EquipmentLabel::NoHelmet,
        EquipmentLabel::Mask,
        EquipmentLabel::NoMask,
        EquipmentLabel::Vest,
        EquipmentLabel::NoVest,
        EquipmentLabel::Person,
    ];

    #[test]
    fn test_fully_equipped_person_is_approved() {
        let result = analyze(flags(&[
            EquipmentLabel::Person,
            EquipmentLabel::Helmet,
            EquipmentLabel::Mask,
            EquipmentLabel::Vest,
        ]));

        assert!(result.approved);
        assert_eq!(
            result.detected_equipment,
            vec![Equipment::Helmet, Equipment::Mask, Equipment::Vest]
        );
        assert!(result.missing_items.is_empty());
        assert_eq!(result.message, MSG_APPROVED);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_no_person_rejects_everything() {
        // regardless of equipment signals
        let result = analyze(flags(&[
            EquipmentLabel::Helmet,
            EquipmentLabel::Mask,
            EquipmentLabel::Vest,
        ]));

        assert!(!result.approved);
        assert!(result.detected_equipment.is_empty());
        assert_eq!(result.missing_items, REQUIRED_EQUIPMENT.to_vec());
        assert_eq!(result.message, MSG_NO_PERSON);
    }

    #[test]
    fn test_negative_signal_overrides_positive() {
        let result = analyze(flags(&[
            EquipmentLabel::Person,
            EquipmentLabel::Helmet,
            EquipmentLabel::NoHelmet,
            EquipmentLabel::Mask,
            EquipmentLabel::Vest,
        ]));

        assert!(!result.approved);
        assert_eq!(result.missing_items, vec![Equipment::Helmet]);
        assert_eq!(
            result.detected_equipment,
            vec![Equipment::Mask, Equipment::Vest]
        );
        assert_eq!(result.message, "missing equipment: helmet");
    }

    #[test]
    fn test_missing_message_lists_items_in_order() {
        let result = analyze(flags(&[EquipmentLabel::Person, EquipmentLabel::Mask]));

        assert_eq!(
            result.missing_items,
            vec![Equipment::Helmet, Equipment::Vest]
        );
        assert_eq!(result.message, "missing equipment: helmet, vest");
    }

    #[test]
    fn test_duplicate_observations_are_idempotent() {
        let once = analyze(flags(&[EquipmentLabel::Person, EquipmentLabel::Helmet]));
        let twice = analyze(flags(&[
            EquipmentLabel::Person,
            EquipmentLabel::Helmet,
            EquipmentLabel::Helmet,
            EquipmentLabel::Person,
        ]));

        assert_eq!(once.approved, twice.approved);
        assert_eq!(once.detected_equipment, twice.detected_equipment);
        assert_eq!(once.missing_items, twice.missing_items);
        assert_eq!(once.message, twice.message);
    }

    #[test]
    fn test_same_flags_analyzed_twice_match() {
        let f = flags(&[EquipmentLabel::Person, EquipmentLabel::NoMask]);
        let first = analyze(f);
        let second = analyze(f);
        assert_eq!(first.approved, second.approved);
        assert_eq!(first.missing_items, second.missing_items);
        assert_eq!(first.message, second.message);
    }

    /// Exhaustive sweep of all 128 flag combinations: the two output lists
    /// always partition the required set in order, and approval tracks the
    /// missing list exactly.
    #[test]
    fn test_partition_invariant_over_all_flag_combinations() {
        for bits in 0u32..(1 << ALL_LABELS.len()) {
            let mut f = DetectionFlags::default();
            for (i, label) in ALL_LABELS.iter().enumerate() {
                if bits & (1 << i) != 0 {
                    f.set(*label);
                }
            }

            let result = analyze(f);

            assert_eq!(result.approved, result.missing_items.is_empty());
            assert_eq!(
                result.detected_equipment.len() + result.missing_items.len(),
                REQUIRED_EQUIPMENT.len()
            );
            // every required item lands in exactly one list, in order
            let mut merged = Vec::new();
            let mut detected = result.detected_equipment.iter().peekable();
            let mut missing = result.missing_items.iter().peekable();
            for item in REQUIRED_EQUIPMENT {
                if detected.peek() == Some(&&item) {
                    merged.push(*detected.next().unwrap());
                } else if missing.peek() == Some(&&item) {
                    merged.push(*missing.next().unwrap());
                }
            }
            assert_eq!(merged, REQUIRED_EQUIPMENT.to_vec());

            if !f.get(EquipmentLabel::Person) {
                assert_eq!(result.missing_items, REQUIRED_EQUIPMENT.to_vec());
                assert_eq!(result.message, MSG_NO_PERSON);
            }
        }
    }

    #[test]
    fn test_conflict_always_counts_as_missing() {
        for item in REQUIRED_EQUIPMENT {
            let result = analyze(flags(&[
                EquipmentLabel::Person,
                item.present(),
                item.absent(),
            ]));
            assert!(result.missing_items.contains(&item));
            assert!(!result.detected_equipment.contains(&item));
        }
    }
}
