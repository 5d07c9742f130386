use super::{GridShape, PatchResult};
use crate::labels::Severity;
use serde::Serialize;

/// Patch severities laid back out on the image grid for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    rows: u32,
    cols: u32,
    cells: Vec<Option<Severity>>,
}

impl HeatmapGrid {
    /// Place each patch in a grid of the shape the tiler produced. Patches
    /// outside `shape` are skipped.
    pub fn new(shape: GridShape, patches: &[PatchResult]) -> Self {
        let mut cells = vec![None; shape.len()];
        for patch in patches {
            if patch.row >= shape.rows || patch.col >= shape.cols {
                tracing::warn!(
                    row = patch.row,
                    col = patch.col,
                    rows = shape.rows,
                    cols = shape.cols,
                    "Patch outside heatmap grid, skipping"
                );
                continue;
            }
            let idx = patch.row as usize * shape.cols as usize + patch.col as usize;
            cells[idx] = Some(patch.severity);
        }

        Self {
            rows: shape.rows,
            cols: shape.cols,
            cells,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn get(&self, row: u32, col: u32) -> Option<Severity> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Option<Severity>]> {
        self.cells.chunks(self.cols.max(1) as usize)
    }
}
