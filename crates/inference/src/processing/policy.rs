use crate::labels::CropLabel;
use crate::processing::classify::ClassificationResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RETAKE_THRESHOLD: f32 = 0.30;
pub const DEFAULT_REPORT_THRESHOLD: f32 = 0.70;

/// Follow-up actions a caller should take for a single-image result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Unrecognised subject with weak confidence: ask for a new photo.
    RetakePhoto,
    /// The model thinks this is not a wheat crop at all.
    NotACrop,
    LowConfidence,
    /// Confident disease detection: forward to the surveillance network.
    Report,
}

/// Operator-tunable confidence thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidencePolicy {
    pub retake_below: f32,
    pub report_above: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            retake_below: DEFAULT_RETAKE_THRESHOLD,
            report_above: DEFAULT_REPORT_THRESHOLD,
        }
    }
}

impl ConfidencePolicy {
    pub fn new(retake_below: f32, report_above: f32) -> Self {
        Self {
            retake_below,
            report_above,
        }
    }

    pub fn needs_retake(&self, result: &ClassificationResult) -> bool {
        result.label == CropLabel::Unknown && result.confidence < self.retake_below
    }

    pub fn is_low_confidence(&self, result: &ClassificationResult) -> bool {
        result.confidence < self.retake_below
    }

    pub fn should_report(&self, result: &ClassificationResult) -> bool {
        result.confidence > self.report_above && result.label.is_disease()
    }

    pub fn evaluate(&self, result: &ClassificationResult) -> Vec<Advisory> {
        let mut advisories = Vec::new();
        if self.needs_retake(result) {
            advisories.push(Advisory::RetakePhoto);
        }
        if result.label == CropLabel::Unknown {
            advisories.push(Advisory::NotACrop);
        }
        if self.is_low_confidence(result) {
            advisories.push(Advisory::LowConfidence);
        }
        if self.should_report(result) {
            advisories.push(Advisory::Report);
        }
        advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: CropLabel, confidence: f32) -> ClassificationResult {
        ClassificationResult {
            label,
            class_index: label.index(),
            confidence,
            distribution: Vec::new(),
        }
    }

    #[test]
    fn weak_unknown_needs_retake() {
        let policy = ConfidencePolicy::default();
        let advisories = policy.evaluate(&result(CropLabel::Unknown, 0.2));

        assert_eq!(
            advisories,
            vec![Advisory::RetakePhoto, Advisory::NotACrop, Advisory::LowConfidence]
        );
    }

    #[test]
    fn confident_unknown_is_not_a_crop_only() {
        let policy = ConfidencePolicy::default();
        assert_eq!(
            policy.evaluate(&result(CropLabel::Unknown, 0.9)),
            vec![Advisory::NotACrop]
        );
    }

    #[test]
    fn confident_disease_is_reported() {
        let policy = ConfidencePolicy::default();
        assert!(policy.should_report(&result(CropLabel::BrownRust, 0.71)));
        assert!(!policy.should_report(&result(CropLabel::BrownRust, 0.70)));
        assert!(!policy.should_report(&result(CropLabel::Healthy, 0.99)));
        assert!(!policy.should_report(&result(CropLabel::Unknown, 0.99)));
    }

    #[test]
    fn thresholds_are_tunable() {
        let strict = ConfidencePolicy::new(0.5, 0.95);
        assert!(strict.needs_retake(&result(CropLabel::Unknown, 0.4)));
        assert!(!strict.should_report(&result(CropLabel::Mildew, 0.9)));
        assert!(strict.should_report(&result(CropLabel::Mildew, 0.96)));
    }

    #[test]
    fn weak_disease_is_low_confidence_but_no_retake() {
        let policy = ConfidencePolicy::default();
        assert_eq!(
            policy.evaluate(&result(CropLabel::Septoria, 0.25)),
            vec![Advisory::LowConfidence]
        );
    }
}
