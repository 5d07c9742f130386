use crate::backend::InferenceBackend;
use crate::error::PipelineError;
use crate::labels::NUM_CLASSES;
use common::span_debug;
use ndarray::ArrayD;
use preprocess::InputTensor;
use std::sync::Mutex;

/// Raw per-class model scores, one per [`crate::CropLabel`], in label order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector(Vec<f32>);

impl ScoreVector {
    /// Fails unless there is exactly one finite score per class.
    pub fn new(scores: Vec<f32>) -> Result<Self, PipelineError> {
        if scores.len() != NUM_CLASSES {
            return Err(PipelineError::Inference(format!(
                "expected {} class scores, got {}",
                NUM_CLASSES,
                scores.len()
            )));
        }
        if let Some((index, value)) = scores.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::Inference(format!(
                "non-finite score {} for class {}",
                value, index
            )));
        }
        Ok(Self(scores))
    }

    /// Normalize raw runtime output into a score vector.
    ///
    /// Accepts a flat `[num_classes]` vector or a singleton batch
    /// `[1, num_classes]`; any other shape is an error.
    pub fn from_output(output: ArrayD<f32>) -> Result<Self, PipelineError> {
        let shape = output.shape().to_vec();
        match shape.as_slice() {
            [_] | [1, _] => Self::new(output.iter().copied().collect()),
            _ => Err(PipelineError::Inference(format!(
                "unexpected output shape {:?}",
                shape
            ))),
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A loaded inference session plus the input contract it was loaded for.
///
/// The backend sits behind a mutex: the session is shared for the process
/// lifetime and runs are serialized.
pub struct Scorer<B: InferenceBackend> {
    backend: Mutex<B>,
    input_size: u32,
}

impl<B: InferenceBackend> Scorer<B> {
    pub fn new(backend: B, input_size: u32) -> Self {
        Self {
            backend: Mutex::new(backend),
            input_size,
        }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn score(&self, tensor: &InputTensor) -> Result<ScoreVector, PipelineError> {
        let _s = span_debug!("score");

        let expected = InputTensor::expected_len(self.input_size);
        if tensor.len() != expected {
            return Err(PipelineError::Inference(format!(
                "input tensor has {} values, model expects {} (3x{}x{})",
                tensor.len(),
                expected,
                self.input_size,
                self.input_size
            )));
        }

        let output = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| PipelineError::inference("inference session lock poisoned"))?;
            backend
                .infer(tensor.as_array())
                .map_err(|e| PipelineError::Inference(format!("{e:#}")))?
        };

        ScoreVector::from_output(output.logits)
    }
}
