use crate::labels::{CropLabel, Severity};
use crate::scorer::ScoreVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelProbability {
    pub label: CropLabel,
    pub probability: f32,
}

/// Outcome of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: CropLabel,
    pub class_index: usize,
    pub confidence: f32,
    /// Every class, sorted by descending probability. The first entry is
    /// always `label`.
    pub distribution: Vec<LabelProbability>,
}

impl ClassificationResult {
    pub fn severity(&self) -> Severity {
        self.label.severity()
    }

    pub fn top(&self, k: usize) -> &[LabelProbability] {
        &self.distribution[..k.min(self.distribution.len())]
    }
}

/// Numerically stable softmax.
///
/// A zero exponential sum returns the raw scores unchanged instead of
/// dividing through. Scores are expected to be finite; [`ScoreVector`]
/// rejects anything else before it gets here.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum == 0.0 {
        return scores.to_vec();
    }

    exps.into_iter().map(|e| e / sum).collect()
}

/// Sort key that ranks NaN below every real probability.
#[inline]
fn rank(p: f32) -> f32 {
    if p.is_nan() { f32::NEG_INFINITY } else { p }
}

pub fn classify(scores: &ScoreVector) -> ClassificationResult {
    let probabilities = softmax(scores.as_slice());

    // Strict comparison keeps the lowest index on ties.
    let mut class_index = 0;
    for (i, &p) in probabilities.iter().enumerate() {
        if rank(p) > rank(probabilities[class_index]) {
            class_index = i;
        }
    }

    let mut distribution: Vec<LabelProbability> = probabilities
        .iter()
        .enumerate()
        .filter_map(|(i, &probability)| {
            CropLabel::from_index(i).map(|label| LabelProbability { label, probability })
        })
        .collect();
    // Stable sort: equal probabilities stay in label order.
    distribution.sort_by(|a, b| rank(b.probability).total_cmp(&rank(a.probability)));

    let label = CropLabel::from_index(class_index).unwrap_or(CropLabel::Unknown);
    let confidence = probabilities.get(class_index).copied().unwrap_or(0.0);

    tracing::trace!(%label, confidence, "Classified");

    ClassificationResult {
        label,
        class_index,
        confidence,
        distribution,
    }
}
