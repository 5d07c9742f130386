use crate::{
    backend::InferenceBackend,
    config::AnalyzerConfig,
    error::PipelineError,
    field::{FieldSummary, GridShape, HeatmapGrid, PatchResult, grid_shape, tile},
    model_asset::ModelAsset,
    processing::{
        classify::{ClassificationResult, classify},
        policy::{Advisory, ConfidencePolicy},
    },
    reporting::{DetectionReport, DetectionReporter, GeoPoint},
    scorer::Scorer,
    state::{ModelSlot, ModelStatus},
};
use common::span;
use preprocess::{CpuPreProcessor, RawImage};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Cooperative cancellation flag shared between a request and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Single-image outcome handed back to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub classification: ClassificationResult,
    pub advisories: Vec<Advisory>,
    /// Whether the reporting hook accepted a report for this result.
    pub reported: bool,
}

/// Drone outcome: per-patch results plus their reduction.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub grid: GridShape,
    pub patches: Vec<PatchResult>,
    pub summary: FieldSummary,
}

impl FieldReport {
    pub fn heatmap(&self) -> HeatmapGrid {
        HeatmapGrid::new(self.grid, &self.patches)
    }
}

pub struct Pipeline<B: InferenceBackend> {
    model: ModelSlot<B>,
    input_size: u32,
    patch_size: u32,
    policy: ConfidencePolicy,
    reporter: Option<Arc<dyn DetectionReporter>>,
}

impl<B: InferenceBackend> Pipeline<B> {
    pub fn new(input_size: u32, patch_size: u32, policy: ConfidencePolicy) -> Self {
        Self {
            model: ModelSlot::new(),
            input_size,
            patch_size,
            policy,
            reporter: None,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.input_size, config.patch_size, config.policy)
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn DetectionReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn status(&self) -> ModelStatus {
        self.model.status()
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    pub fn patch_size(&self) -> u32 {
        self.patch_size
    }

    /// Install an already-constructed backend, e.g. one loaded elsewhere.
    pub fn install(&self, backend: B) -> Result<(), PipelineError> {
        self.model.load(|| Ok(Scorer::new(backend, self.input_size)))
    }

    /// Load the session from a model file on disk.
    pub fn load<F>(&self, path: &Path, loader: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&Path) -> anyhow::Result<B>,
    {
        self.model.load(|| self.open_session(path, loader))
    }

    /// Stage the bundled asset, then load it. A staging failure leaves the
    /// pipeline `Failed`.
    pub fn load_asset<F>(&self, asset: &ModelAsset, loader: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&Path) -> anyhow::Result<B>,
    {
        self.model.load(|| {
            let path = asset.stage()?;
            self.open_session(&path, loader)
        })
    }

    /// Leave `Failed` and stage + load again.
    pub fn retry_load<F>(&self, asset: &ModelAsset, loader: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&Path) -> anyhow::Result<B>,
    {
        self.model.retry(|| {
            let path = asset.stage()?;
            self.open_session(&path, loader)
        })
    }

    fn open_session<F>(&self, path: &Path, loader: F) -> Result<Scorer<B>, PipelineError>
    where
        F: FnOnce(&Path) -> anyhow::Result<B>,
    {
        let start = Instant::now();
        let backend = loader(path).map_err(|e| PipelineError::Inference(format!("{e:#}")))?;
        tracing::info!(
            path = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model session created"
        );
        Ok(Scorer::new(backend, self.input_size))
    }

    /// Preprocess, score and classify one image.
    pub fn classify_image(&self, image: &RawImage) -> Result<ClassificationResult, PipelineError> {
        let scorer = self.model.scorer()?;
        let tensor = CpuPreProcessor::new(self.input_size).prepare(image)?;
        let scores = scorer.score(&tensor)?;
        Ok(classify(&scores))
    }

    pub fn diagnose(
        &self,
        image: &RawImage,
        location: Option<GeoPoint>,
    ) -> Result<Diagnosis, PipelineError> {
        let _s = span!("diagnose");

        let classification = self.classify_image(image)?;
        let advisories = self.policy.evaluate(&classification);

        let reported = if advisories.contains(&Advisory::Report) {
            self.fire_report(&classification, location)
        } else {
            false
        };

        tracing::info!(
            label = %classification.label,
            confidence = classification.confidence,
            advisories = ?advisories,
            reported,
            "Diagnosis complete"
        );

        Ok(Diagnosis {
            classification,
            advisories,
            reported,
        })
    }

    fn fire_report(&self, classification: &ClassificationResult, location: Option<GeoPoint>) -> bool {
        let Some(reporter) = &self.reporter else {
            tracing::debug!("No reporter configured, skipping detection report");
            return false;
        };

        let report = DetectionReport {
            label: classification.label,
            confidence: classification.confidence,
            location,
        };

        match reporter.report(&report) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, label = %report.label, "Failed to report detection");
                false
            }
        }
    }

    /// Tile, classify every patch, and summarize.
    ///
    /// Patches are cropped and normalized in parallel while scoring is
    /// serialized on the shared session. The summary is only built once every
    /// patch has a result; a cancelled or failed patch fails the whole request.
    pub fn analyze_field(
        &self,
        image: &RawImage,
        cancel: &CancelToken,
    ) -> Result<FieldReport, PipelineError> {
        let _s = span!("analyze_field");

        let scorer = self.model.scorer()?;
        let start = Instant::now();

        let grid = grid_shape(image.width(), image.height(), self.patch_size);
        let patches = tile(image, self.patch_size);
        tracing::info!(
            width = image.width(),
            height = image.height(),
            patch_size = self.patch_size,
            patches = patches.len(),
            "Starting field analysis"
        );

        let results = patches
            .into_par_iter()
            .map_init(
                || CpuPreProcessor::new(self.input_size),
                |preprocessor, patch| {
                    if cancel.is_cancelled() {
                        return Err(PipelineError::Cancelled);
                    }
                    let tensor = preprocessor.prepare(&patch.image)?;
                    let scores = scorer.score(&tensor)?;
                    let classification = classify(&scores);
                    tracing::trace!(
                        row = patch.row,
                        col = patch.col,
                        label = %classification.label,
                        "Patch classified"
                    );
                    Ok(PatchResult::new(patch.row, patch.col, classification))
                },
            )
            .collect::<Result<Vec<_>, _>>()?;

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let summary = FieldSummary::summarize(&results);

        tracing::info!(
            total_patches = summary.total_patches,
            healthy_percent = summary.healthy_percent(),
            diseased_percent = summary.diseased_percent(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Field analysis complete"
        );

        Ok(FieldReport {
            grid,
            patches: results,
            summary,
        })
    }
}

impl<B: InferenceBackend + 'static> Pipeline<B> {
    /// Stage and load the model on the blocking pool without holding up the
    /// caller. Requests made before the handle resolves get `ModelNotLoaded`.
    pub fn spawn_load<F>(
        self: &Arc<Self>,
        asset: ModelAsset,
        loader: F,
    ) -> tokio::task::JoinHandle<Result<(), PipelineError>>
    where
        F: FnOnce(&Path) -> anyhow::Result<B> + Send + 'static,
    {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.load_asset(&asset, loader))
    }

    pub async fn diagnose_async(
        self: &Arc<Self>,
        image: RawImage,
        location: Option<GeoPoint>,
    ) -> Result<Diagnosis, PipelineError> {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.diagnose(&image, location))
            .await
            .map_err(PipelineError::inference)?
    }

    /// Dropping the returned future does not stop the blocking work; cancel
    /// `cancel` to abandon it. No partial report is ever returned.
    pub async fn analyze_field_async(
        self: &Arc<Self>,
        image: RawImage,
        cancel: CancelToken,
    ) -> Result<FieldReport, PipelineError> {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.analyze_field(&image, &cancel))
            .await
            .map_err(PipelineError::inference)?
    }
}
