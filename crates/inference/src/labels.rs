use serde::{Deserialize, Serialize};
use std::fmt;

pub const NUM_CLASSES: usize = 8;

/// Output classes of the wheat disease model, in model index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CropLabel {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "Yellow rust")]
    YellowRust,
    #[serde(rename = "Brown rust")]
    BrownRust,
    #[serde(rename = "Loose Smut")]
    LooseSmut,
    /// Not a wheat crop, or nothing the model recognises.
    #[serde(rename = "This is not a wheat crop", alias = "Unknown")]
    Unknown,
    #[serde(rename = "Septoria")]
    Septoria,
    #[serde(rename = "Stripe rust")]
    StripeRust,
    #[serde(rename = "Mildew")]
    Mildew,
}

/// Coarse grouping used for field statistics and the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Diseased,
    Unknown,
}

impl CropLabel {
    pub const ALL: [CropLabel; NUM_CLASSES] = [
        CropLabel::Healthy,
        CropLabel::YellowRust,
        CropLabel::BrownRust,
        CropLabel::LooseSmut,
        CropLabel::Unknown,
        CropLabel::Septoria,
        CropLabel::StripeRust,
        CropLabel::Mildew,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropLabel::Healthy => "Healthy",
            CropLabel::YellowRust => "Yellow rust",
            CropLabel::BrownRust => "Brown rust",
            CropLabel::LooseSmut => "Loose Smut",
            CropLabel::Unknown => "This is not a wheat crop",
            CropLabel::Septoria => "Septoria",
            CropLabel::StripeRust => "Stripe rust",
            CropLabel::Mildew => "Mildew",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CropLabel::Healthy => Severity::Healthy,
            CropLabel::Unknown => Severity::Unknown,
            CropLabel::YellowRust
            | CropLabel::BrownRust
            | CropLabel::LooseSmut
            | CropLabel::Septoria
            | CropLabel::StripeRust
            | CropLabel::Mildew => Severity::Diseased,
        }
    }

    /// A disease the model can name, as opposed to healthy or unrecognised.
    pub fn is_disease(&self) -> bool {
        self.severity() == Severity::Diseased
    }
}

impl fmt::Display for CropLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Healthy, Severity::Diseased, Severity::Unknown];

    /// Severity bucket of a raw model class index. Out-of-range indices are
    /// treated as unrecognised.
    pub fn from_class_index(index: usize) -> Self {
        CropLabel::from_index(index)
            .map(|label| label.severity())
            .unwrap_or(Severity::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_for_every_label() {
        for (i, label) in CropLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(CropLabel::from_index(i), Some(*label));
        }
        assert_eq!(CropLabel::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn severity_table_matches_model_layout() {
        let table: Vec<Severity> = (0..NUM_CLASSES).map(Severity::from_class_index).collect();
        assert_eq!(
            table,
            vec![
                Severity::Healthy,
                Severity::Diseased,
                Severity::Diseased,
                Severity::Diseased,
                Severity::Unknown,
                Severity::Diseased,
                Severity::Diseased,
                Severity::Diseased,
            ]
        );
        assert_eq!(Severity::from_class_index(99), Severity::Unknown);
    }

    #[test]
    fn severity_mapping_survives_json_round_trip() {
        let table: Vec<(CropLabel, Severity)> = CropLabel::ALL
            .iter()
            .map(|label| (*label, label.severity()))
            .collect();

        let json = serde_json::to_string(&table).unwrap();
        let decoded: Vec<(CropLabel, Severity)> = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, table);
        assert!(json.contains("\"Yellow rust\""));
        assert!(json.contains("\"diseased\""));
    }

    #[test]
    fn display_uses_human_readable_names() {
        assert_eq!(CropLabel::LooseSmut.to_string(), "Loose Smut");
        assert_eq!(CropLabel::StripeRust.to_string(), "Stripe rust");
        assert_eq!(CropLabel::Unknown.to_string(), "This is not a wheat crop");
    }

    #[test]
    fn non_crop_label_serializes_as_shown_to_the_user() {
        let json = serde_json::to_string(&CropLabel::Unknown).unwrap();
        assert_eq!(json, "\"This is not a wheat crop\"");

        let legacy: CropLabel = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(legacy, CropLabel::Unknown);
    }

    #[test]
    fn only_named_diseases_are_diseases() {
        assert!(!CropLabel::Healthy.is_disease());
        assert!(!CropLabel::Unknown.is_disease());
        assert!(CropLabel::Mildew.is_disease());
    }
}
