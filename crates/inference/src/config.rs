use crate::model_asset::ModelAsset;
use crate::processing::policy::{ConfidencePolicy, DEFAULT_REPORT_THRESHOLD, DEFAULT_RETAKE_THRESHOLD};
use common::config::env_or;
use preprocess::DEFAULT_INPUT_SIZE;
use std::env;
use std::path::PathBuf;

pub use common::Environment;

pub const DEFAULT_MODEL_NAME: &str = "mobilevit_wheat_8class.onnx";
pub const DEFAULT_PATCH_SIZE: u32 = 256;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub environment: Environment,
    pub model_name: String,
    pub model_bundle_dir: PathBuf,
    pub model_cache_dir: PathBuf,
    pub input_size: u32,
    pub patch_size: u32,
    pub policy: ConfidencePolicy,
    pub execution_provider: String,
    pub intra_threads: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_bundle_dir: PathBuf::from("assets"),
            model_cache_dir: PathBuf::from("model_cache"),
            input_size: DEFAULT_INPUT_SIZE,
            patch_size: DEFAULT_PATCH_SIZE,
            policy: ConfidencePolicy::default(),
            execution_provider: "cpu".to_string(),
            intra_threads: 4,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            environment: Environment::from_env(),
            model_name: env::var("MODEL_NAME").unwrap_or(defaults.model_name),
            model_bundle_dir: env::var("MODEL_BUNDLE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_bundle_dir),
            model_cache_dir: env::var("MODEL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_cache_dir),
            input_size: env_or("INPUT_SIZE", defaults.input_size),
            patch_size: env_or("PATCH_SIZE", defaults.patch_size),
            policy: ConfidencePolicy::new(
                env_or("RETAKE_CONFIDENCE_THRESHOLD", DEFAULT_RETAKE_THRESHOLD),
                env_or("REPORT_CONFIDENCE_THRESHOLD", DEFAULT_REPORT_THRESHOLD),
            ),
            execution_provider: env::var("EXECUTION_PROVIDER")
                .unwrap_or(defaults.execution_provider),
            intra_threads: env_or("INTRA_THREADS", defaults.intra_threads),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input_size == 0 {
            anyhow::bail!("INPUT_SIZE must be greater than zero");
        }
        if self.patch_size == 0 {
            anyhow::bail!("PATCH_SIZE must be greater than zero");
        }
        for (name, value) in [
            ("RETAKE_CONFIDENCE_THRESHOLD", self.policy.retake_below),
            ("REPORT_CONFIDENCE_THRESHOLD", self.policy.report_above),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.intra_threads == 0 {
            anyhow::bail!("INTRA_THREADS must be greater than zero");
        }
        Ok(())
    }

    pub fn model_asset(&self) -> ModelAsset {
        ModelAsset::new(
            self.model_bundle_dir.clone(),
            self.model_cache_dir.clone(),
            self.model_name.clone(),
        )
    }
}
