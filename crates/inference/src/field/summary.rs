use super::PatchResult;
use crate::labels::{CropLabel, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whole-field statistics over one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub total_patches: usize,
    /// Always holds all three buckets, zero when absent.
    pub counts_by_severity: BTreeMap<Severity, usize>,
    /// Only labels that occurred.
    pub counts_by_label: BTreeMap<CropLabel, usize>,
}

impl FieldSummary {
    /// Single-pass, unweighted reduction. Order of `patches` does not matter.
    pub fn summarize(patches: &[PatchResult]) -> Self {
        let mut counts_by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut counts_by_label = BTreeMap::new();

        for patch in patches {
            *counts_by_severity.entry(patch.severity).or_insert(0) += 1;
            *counts_by_label
                .entry(patch.classification.label)
                .or_insert(0) += 1;
        }

        Self {
            total_patches: patches.len(),
            counts_by_severity,
            counts_by_label,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counts_by_severity.get(&severity).copied().unwrap_or(0)
    }

    pub fn healthy_count(&self) -> usize {
        self.count(Severity::Healthy)
    }

    pub fn diseased_count(&self) -> usize {
        self.count(Severity::Diseased)
    }

    pub fn unknown_count(&self) -> usize {
        self.count(Severity::Unknown)
    }

    pub fn label_count(&self, label: CropLabel) -> usize {
        self.counts_by_label.get(&label).copied().unwrap_or(0)
    }

    pub fn percent(&self, severity: Severity) -> f32 {
        self.percent_of(self.count(severity))
    }

    pub fn healthy_percent(&self) -> f32 {
        self.percent(Severity::Healthy)
    }

    pub fn diseased_percent(&self) -> f32 {
        self.percent(Severity::Diseased)
    }

    pub fn unknown_percent(&self) -> f32 {
        self.percent(Severity::Unknown)
    }

    pub fn label_percent(&self, label: CropLabel) -> f32 {
        self.percent_of(self.label_count(label))
    }

    /// Labels by descending count; equal counts keep label order.
    pub fn histogram(&self) -> Vec<(CropLabel, usize)> {
        let mut entries: Vec<(CropLabel, usize)> =
            self.counts_by_label.iter().map(|(l, c)| (*l, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    fn percent_of(&self, count: usize) -> f32 {
        if self.total_patches == 0 {
            return 0.0;
        }
        count as f32 * 100.0 / self.total_patches as f32
    }
}
