//! Drone field analysis: split a large image into a patch grid, classify
//! every patch, and reduce the results into field statistics.

pub mod heatmap;
pub mod summary;
pub mod tiler;

use crate::labels::Severity;
use crate::processing::classify::ClassificationResult;
use serde::{Deserialize, Serialize};

pub use heatmap::HeatmapGrid;
pub use summary::FieldSummary;
pub use tiler::{GridShape, Patch, grid_shape, tile};

/// Classification of one patch, tagged with its grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchResult {
    pub row: u32,
    pub col: u32,
    pub classification: ClassificationResult,
    pub severity: Severity,
}

impl PatchResult {
    pub fn new(row: u32, col: u32, classification: ClassificationResult) -> Self {
        let severity = classification.severity();
        Self {
            row,
            col,
            classification,
            severity,
        }
    }
}
