use crate::features::PredictionFeatures;
use crate::services::prediction_service::{PredictionError, PredictionServiceState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct PredictionResponse {
    prediction: f64,
}

pub fn router(state: PredictionServiceState) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/predict", post(post_predict))
        .with_state(state)
}

/// Liveness probe.
pub async fn get_index() -> Json<[&'static str; 1]> {
    Json(["Hello World!"])
}

pub async fn post_predict(
    State(service): State<PredictionServiceState>,
    payload: Result<Json<PredictionFeatures>, JsonRejection>,
) -> Result<Json<PredictionResponse>, PredictionError> {
    let Json(features) =
        payload.map_err(|rejection| PredictionError::InvalidRequest(rejection.body_text()))?;
    let prediction = service.predict(&features).await?;
    Ok(Json(PredictionResponse { prediction }))
}
