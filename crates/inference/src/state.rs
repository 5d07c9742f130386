use crate::backend::InferenceBackend;
use crate::error::PipelineError;
use crate::scorer::Scorer;
use serde::Serialize;
use std::sync::{Arc, Mutex, RwLock};

/// Lifecycle of the inference session.
pub enum ModelState<B: InferenceBackend> {
    Unloaded,
    Ready(Arc<Scorer<B>>),
    /// Terminal until [`ModelSlot::retry`] is called.
    Failed(String),
}

/// Payload-free view of [`ModelState`] for callers and UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum ModelStatus {
    Unloaded,
    Ready,
    Failed(String),
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Unloaded => "unloaded",
            ModelStatus::Ready => "ready",
            ModelStatus::Failed(_) => "failed",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready)
    }
}

/// Holds the process-wide session and guards its state transitions.
pub struct ModelSlot<B: InferenceBackend> {
    state: RwLock<ModelState<B>>,
    load_lock: Mutex<()>,
}

impl<B: InferenceBackend> Default for ModelSlot<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: InferenceBackend> ModelSlot<B> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ModelState::Unloaded),
            load_lock: Mutex::new(()),
        }
    }

    pub fn status(&self) -> ModelStatus {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            ModelState::Unloaded => ModelStatus::Unloaded,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Failed(reason) => ModelStatus::Failed(reason.clone()),
        }
    }

    /// The loaded scorer, or `ModelNotLoaded` in any other state.
    pub fn scorer(&self) -> Result<Arc<Scorer<B>>, PipelineError> {
        match &*self.state.read().unwrap_or_else(|e| e.into_inner()) {
            ModelState::Ready(scorer) => Ok(Arc::clone(scorer)),
            ModelState::Unloaded => Err(PipelineError::ModelNotLoaded { state: "unloaded" }),
            ModelState::Failed(_) => Err(PipelineError::ModelNotLoaded { state: "failed" }),
        }
    }

    /// Run `load` and move `Unloaded` to `Ready` or `Failed`.
    ///
    /// Loading an already-ready slot is a no-op. A failed slot stays failed
    /// until [`ModelSlot::retry`].
    pub fn load<F>(&self, load: F) -> Result<(), PipelineError>
    where
        F: FnOnce() -> Result<Scorer<B>, PipelineError>,
    {
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());

        match self.status() {
            ModelStatus::Ready => {
                tracing::debug!("Model already loaded");
                return Ok(());
            }
            ModelStatus::Failed(_) => {
                return Err(PipelineError::ModelNotLoaded { state: "failed" });
            }
            ModelStatus::Unloaded => {}
        }

        let next = match load() {
            Ok(scorer) => {
                tracing::info!("Inference session ready");
                Ok(ModelState::Ready(Arc::new(scorer)))
            }
            Err(e) => {
                tracing::error!(error = %e, "Inference session failed to load");
                Err(e)
            }
        };

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match next {
            Ok(ready) => {
                *state = ready;
                Ok(())
            }
            Err(e) => {
                *state = ModelState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Explicitly leave `Failed` and try loading again.
    pub fn retry<F>(&self, load: F) -> Result<(), PipelineError>
    where
        F: FnOnce() -> Result<Scorer<B>, PipelineError>,
    {
        {
            let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            if let ModelState::Failed(reason) = &*state {
                tracing::info!(previous_error = %reason, "Retrying model load");
                *state = ModelState::Unloaded;
            }
        }
        self.load(load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InferenceOutput;
    use ndarray::{Array, IxDyn};
    use std::path::Path;

    struct NullBackend;

    impl InferenceBackend for NullBackend {
        fn load_model(_path: &Path) -> anyhow::Result<Self> {
            Ok(Self)
        }

        fn infer(&mut self, _images: &Array<f32, IxDyn>) -> anyhow::Result<InferenceOutput> {
            Ok(InferenceOutput {
                logits: Array::zeros(IxDyn(&[8])),
            })
        }
    }

    fn ok_scorer() -> Result<Scorer<NullBackend>, PipelineError> {
        Ok(Scorer::new(NullBackend, 4))
    }

    fn failing_scorer() -> Result<Scorer<NullBackend>, PipelineError> {
        Err(PipelineError::inference("corrupt model"))
    }

    #[test]
    fn starts_unloaded_and_rejects_requests() {
        let slot: ModelSlot<NullBackend> = ModelSlot::new();

        assert_eq!(slot.status(), ModelStatus::Unloaded);
        assert!(matches!(
            slot.scorer(),
            Err(PipelineError::ModelNotLoaded { state: "unloaded" })
        ));
    }

    #[test]
    fn successful_load_becomes_ready() {
        let slot = ModelSlot::new();
        slot.load(ok_scorer).unwrap();

        assert!(slot.status().is_ready());
        assert_eq!(slot.scorer().unwrap().input_size(), 4);
    }

    #[test]
    fn second_load_is_a_no_op() {
        let slot = ModelSlot::new();
        slot.load(ok_scorer).unwrap();
        slot.load(failing_scorer).unwrap();

        assert!(slot.status().is_ready());
    }

    #[test]
    fn failed_load_is_terminal_until_retry() {
        let slot = ModelSlot::new();

        assert!(slot.load(failing_scorer).is_err());
        assert_eq!(slot.status().as_str(), "failed");
        assert!(matches!(
            slot.scorer(),
            Err(PipelineError::ModelNotLoaded { state: "failed" })
        ));

        // A plain load does not leave Failed.
        assert!(slot.load(ok_scorer).is_err());
        assert_eq!(slot.status().as_str(), "failed");

        slot.retry(ok_scorer).unwrap();
        assert!(slot.status().is_ready());
    }

    #[test]
    fn failed_status_carries_reason() {
        let slot = ModelSlot::new();
        let _ = slot.load(failing_scorer);

        match slot.status() {
            ModelStatus::Failed(reason) => assert!(reason.contains("corrupt model")),
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_string(&ModelStatus::Failed("disk full".into())).unwrap();
        assert_eq!(json, r#"{"state":"failed","reason":"disk full"}"#);
        assert_eq!(
            serde_json::to_string(&ModelStatus::Ready).unwrap(),
            r#"{"state":"ready"}"#
        );
    }
}
