use preprocess::RawImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `patch_size × patch_size` crop at grid position (`row`, `col`).
#[derive(Debug, Clone)]
pub struct Patch {
    pub row: u32,
    pub col: u32,
    pub image: RawImage,
}

/// Number of whole patches that fit in each direction.
///
/// Pixels past the last whole patch on the right and bottom edges are
/// dropped, not padded. A zero patch size yields an empty grid.
pub fn grid_shape(width: u32, height: u32, patch_size: u32) -> GridShape {
    if patch_size == 0 {
        return GridShape { rows: 0, cols: 0 };
    }
    GridShape {
        rows: height / patch_size,
        cols: width / patch_size,
    }
}

/// Partition `image` into non-overlapping patches in row-major order.
pub fn tile(image: &RawImage, patch_size: u32) -> Vec<Patch> {
    let shape = grid_shape(image.width(), image.height(), patch_size);

    let dropped_x = image.width() - shape.cols * patch_size;
    let dropped_y = image.height() - shape.rows * patch_size;
    if patch_size > 0 && (dropped_x > 0 || dropped_y > 0) {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            patch_size,
            dropped_x,
            dropped_y,
            "Dropping edge pixels that do not fill a whole patch"
        );
    }

    let mut patches = Vec::with_capacity(shape.len());
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            patches.push(Patch {
                row,
                col,
                image: image.crop(col * patch_size, row * patch_size, patch_size, patch_size),
            });
        }
    }
    patches
}
