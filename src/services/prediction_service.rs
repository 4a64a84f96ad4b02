use crate::features::PredictionFeatures;
use crate::frame::{FeatureFrame, FrameError};
use crate::repositories::model_repository::{ModelError, ModelRepository};
use crate::services::price_model::{InferenceError, PriceModel};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, trace};

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Owns the regressor handed to the HTTP handlers.
///
/// The artifact is loaded once when the service is built. With
/// `reload_on_request` every prediction reads it from disk again instead.
pub struct PredictionService {
    repository: ModelRepository,
    model: Arc<PriceModel>,
    reload_on_request: bool,
}

pub type PredictionServiceState = Arc<PredictionService>;

impl PredictionService {
    pub async fn new(
        repository: ModelRepository,
        reload_on_request: bool,
    ) -> Result<Self, ModelError> {
        let model = Arc::new(repository.load().await?);
        Ok(Self::with_model(repository, model, reload_on_request))
    }

    pub fn with_model(
        repository: ModelRepository,
        model: Arc<PriceModel>,
        reload_on_request: bool,
    ) -> Self {
        Self {
            repository,
            model,
            reload_on_request,
        }
    }

    pub async fn predict(&self, features: &PredictionFeatures) -> Result<f64, PredictionError> {
        let frame = FeatureFrame::from_record(features)?;
        trace!("Built a {}-column frame", frame.width());
        let model = self.current_model().await?;

        let prediction = model.predict(&frame).inspect_err(|e| {
            error!("Inference failed for {}: {}", features.model_key, e);
        })?;
        debug!(
            "Predicted {:.2} for {} ({} km, {} hp)",
            prediction, features.model_key, features.mileage, features.engine_power
        );
        Ok(prediction)
    }

    async fn current_model(&self) -> Result<Arc<PriceModel>, ModelError> {
        if self.reload_on_request {
            debug!("Reloading model from {}", self.repository.path().display());
            Ok(Arc::new(self.repository.load().await?))
        } else {
            Ok(self.model.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_model(path: &std::path::Path, intercept: f64) {
        fs::write(
            path,
            format!(
                r#"{{"intercept": {}, "features": [{{"kind": "numeric", "column": "engine_power", "coefficient": 1.0}}]}}"#,
                intercept
            ),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn predicts_with_model_loaded_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_model(&path, 10.0);

        let service = PredictionService::new(ModelRepository::new(&path), false)
            .await
            .unwrap();
        fs::remove_file(&path).unwrap();

        let prediction = service.predict(&PredictionFeatures::default()).await.unwrap();
        assert_eq!(prediction, 120.0);
    }

    #[tokio::test]
    async fn reload_on_request_picks_up_new_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        write_model(&path, 10.0);

        let service = PredictionService::new(ModelRepository::new(&path), true)
            .await
            .unwrap();
        write_model(&path, 20.0);
        let prediction = service.predict(&PredictionFeatures::default()).await.unwrap();
        assert_eq!(prediction, 130.0);

        fs::remove_file(&path).unwrap();
        assert!(matches!(
            service.predict(&PredictionFeatures::default()).await,
            Err(PredictionError::Model(ModelError::Io { .. }))
        ));
    }

    #[tokio::test]
    async fn missing_artifact_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            PredictionService::new(ModelRepository::new(dir.path().join("none.json")), false)
                .await;
        assert!(result.is_err());
    }
}
