use preprocess::PreprocessError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load image")]
    Decode(#[source] PreprocessError),

    #[error("Unsupported image format")]
    InvalidFormat(#[source] PreprocessError),

    #[error("Model not loaded (state: {state})")]
    ModelNotLoaded { state: &'static str },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model asset unavailable at {}", path.display())]
    ModelAsset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Analysis cancelled")]
    Cancelled,
}

impl PipelineError {
    pub fn inference(err: impl std::fmt::Display) -> Self {
        Self::Inference(err.to_string())
    }

    /// Text shown to the farmer. Every error is recoverable by re-invoking
    /// the analysis; none of them should take the host down.
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Decode(_) | PipelineError::InvalidFormat(_) => "Failed to load image.",
            PipelineError::ModelNotLoaded { .. } | PipelineError::ModelAsset { .. } => {
                "AI model not ready yet."
            }
            PipelineError::Inference(_) => "Analysis failed. Please try again.",
            PipelineError::Cancelled => "Analysis cancelled.",
        }
    }
}

impl From<PreprocessError> for PipelineError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Decode(_) => PipelineError::Decode(err),
            PreprocessError::InvalidFormat(_) => PipelineError::InvalidFormat(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preprocess::RawImage;

    #[test]
    fn test_preprocess_errors_keep_their_kind() {
        let decode: PipelineError = RawImage::decode(b"nope").unwrap_err().into();
        assert!(matches!(decode, PipelineError::Decode(_)));

        let invalid: PipelineError = PreprocessError::invalid_format("bad").into();
        assert!(matches!(invalid, PipelineError::InvalidFormat(_)));
    }

    #[test]
    fn test_user_messages() {
        let decode: PipelineError = PreprocessError::invalid_format("bad").into();
        assert_eq!(decode.user_message(), "Failed to load image.");

        let not_loaded = PipelineError::ModelNotLoaded { state: "unloaded" };
        assert_eq!(not_loaded.user_message(), "AI model not ready yet.");
        assert_eq!(not_loaded.to_string(), "Model not loaded (state: unloaded)");

        assert_eq!(
            PipelineError::inference("shape").user_message(),
            "Analysis failed. Please try again."
        );
    }

    #[test]
    fn test_model_asset_error_display() {
        let err = PipelineError::ModelAsset {
            path: PathBuf::from("/data/model.onnx"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "Model asset unavailable at /data/model.onnx");
        assert_eq!(err.user_message(), "AI model not ready yet.");
    }
}
