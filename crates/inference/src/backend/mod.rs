use ndarray::{Array, ArrayD, IxDyn};
use std::path::Path;

#[cfg(feature = "ort-backend")]
pub mod ort;

/// An opaque scoring function: NCHW image tensor in, per-class logits out.
///
/// `infer` takes `&mut self` because runtimes such as ONNX Runtime require
/// exclusive access to the session while a run is in flight. Callers that
/// share a backend serialize access themselves (see [`crate::Scorer`]).
pub trait InferenceBackend: Send {
    fn load_model(path: &Path) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Run inference with a CPU array input
    fn infer(&mut self, images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput>;
}

pub struct InferenceOutput {
    pub logits: ArrayD<f32>, // [num_classes] or [1, num_classes]
}
