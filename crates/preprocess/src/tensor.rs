use crate::config::CHANNELS;
use crate::error::PreprocessError;
use ndarray::{Array, ArrayView1, IxDyn};

/// Normalized model input: `[1, 3, size, size]`, channel-major, values in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct InputTensor {
    data: Array<f32, IxDyn>,
    size: u32,
}

impl InputTensor {
    /// Wrap a flat channel-major buffer. Fails if `values` is not exactly
    /// `3 × size × size` long.
    pub fn from_chw(size: u32, values: Vec<f32>) -> Result<Self, PreprocessError> {
        let expected = Self::expected_len(size);
        if values.len() != expected {
            return Err(PreprocessError::invalid_format(format!(
                "tensor length mismatch: expected {} values for {}x{}, got {}",
                expected,
                size,
                size,
                values.len()
            )));
        }

        let side = size as usize;
        let data = Array::from_shape_vec(IxDyn(&[1, CHANNELS, side, side]), values)
            .map_err(|e| PreprocessError::invalid_format(e.to_string()))?;

        Ok(Self { data, size })
    }

    pub fn expected_len(size: u32) -> usize {
        CHANNELS * size as usize * size as usize
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Batched NCHW view handed to the inference runtime.
    pub fn as_array(&self) -> &Array<f32, IxDyn> {
        &self.data
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().unwrap_or_default()
    }

    /// One colour plane in row-major pixel order.
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f32> {
        let spatial = self.size as usize * self.size as usize;
        let start = (channel * spatial).min(self.len());
        let end = (start + spatial).min(self.len());
        ArrayView1::from(&self.as_slice()[start..end])
    }
}
