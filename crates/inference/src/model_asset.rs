use crate::error::PipelineError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A model file bundled read-only with the application that has to be copied
/// into writable storage before the runtime can open it.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub bundle_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub file_name: String,
}

impl ModelAsset {
    pub fn new(
        bundle_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            bundle_dir: bundle_dir.into(),
            cache_dir: cache_dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn staged_path(&self) -> PathBuf {
        self.cache_dir.join(&self.file_name)
    }

    fn data_file_name(&self) -> String {
        format!("{}.data", self.file_name)
    }

    /// Copy the model (and its external-data companion, if bundled) into the
    /// cache directory. A file already staged by an earlier run is reused.
    pub fn stage(&self) -> Result<PathBuf, PipelineError> {
        let model_path = self.staged_path();

        fs::create_dir_all(&self.cache_dir).map_err(|source| PipelineError::ModelAsset {
            path: self.cache_dir.clone(),
            source,
        })?;

        if model_path.exists() {
            tracing::debug!(path = %model_path.display(), "Reusing staged model");
        } else {
            let bundled = self.bundle_dir.join(&self.file_name);
            tracing::info!(
                from = %bundled.display(),
                to = %model_path.display(),
                "Staging bundled model"
            );
            copy_atomic(&bundled, &model_path).map_err(|source| PipelineError::ModelAsset {
                path: bundled.clone(),
                source,
            })?;
        }

        self.stage_data_file();

        Ok(model_path)
    }

    /// Models exported without external data have no companion file, so a
    /// missing or failed copy here is not fatal.
    fn stage_data_file(&self) {
        let name = self.data_file_name();
        let staged = self.cache_dir.join(&name);
        if staged.exists() {
            return;
        }

        let bundled = self.bundle_dir.join(&name);
        if !bundled.exists() {
            tracing::debug!(file = %name, "No external data file bundled");
            return;
        }

        if let Err(e) = copy_atomic(&bundled, &staged) {
            tracing::warn!(error = %e, file = %name, "Failed to stage external data file");
        }
    }
}

/// Copy through a temporary sibling and rename, so an interrupted copy never
/// leaves a truncated file at `dest`.
fn copy_atomic(src: &Path, dest: &Path) -> io::Result<()> {
    let file_name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
    let tmp = dest.with_file_name(format!(".{}.partial", file_name.to_string_lossy()));

    let result = fs::copy(src, &tmp).and_then(|_| fs::rename(&tmp, dest));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
