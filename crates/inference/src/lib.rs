pub mod backend;
pub mod config;
pub mod error;
pub mod field;
pub mod labels;
pub mod logging;
pub mod model_asset;
pub mod processing;
pub mod reporting;
pub mod scorer;
pub mod service;
pub mod state;

// Re-export commonly used types for convenience
pub use backend::{InferenceBackend, InferenceOutput};
pub use config::AnalyzerConfig;
pub use error::PipelineError;
pub use field::{FieldSummary, HeatmapGrid, PatchResult};
pub use labels::{CropLabel, NUM_CLASSES, Severity};
pub use model_asset::ModelAsset;
pub use processing::classify::{ClassificationResult, LabelProbability, classify, softmax};
pub use processing::policy::{Advisory, ConfidencePolicy};
pub use reporting::{DetectionReport, DetectionReporter, GeoPoint, LogReporter};
pub use scorer::{ScoreVector, Scorer};
pub use service::{CancelToken, Diagnosis, FieldReport, Pipeline};
pub use state::ModelStatus;
