use crate::services::price_model::PriceModel;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unable to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to decode model artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid model artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Reads the serialized regressor from the filesystem. Never writes.
#[derive(Debug, Clone)]
pub struct ModelRepository {
    path: PathBuf,
}

impl ModelRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<PriceModel, ModelError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ModelError::Io {
                path: self.path.clone(),
                source,
            })?;

        let model: PriceModel =
            serde_json::from_slice(&bytes).map_err(|source| ModelError::Decode {
                path: self.path.clone(),
                source,
            })?;

        model.check().map_err(|reason| ModelError::Invalid {
            path: self.path.clone(),
            reason,
        })?;

        info!(
            "Loaded model {:?} v{:?} from {} ({} columns)",
            model.name,
            model.version,
            self.path.display(),
            model.features.len()
        );
        Ok(model)
    }
}
