use crate::services::delay_analytics::AnalyticsError;
use crate::services::prediction_service::PredictionError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { message })).into_response()
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = match self {
            PredictionError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictionError::Frame(_)
            | PredictionError::Model(_)
            | PredictionError::Inference(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.to_string())
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = match self {
            AnalyticsError::InvalidQuery(_) | AnalyticsError::ThresholdOutOfRange(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AnalyticsError::NoLateRentals(_) => StatusCode::NOT_FOUND,
        };
        error_response(status, self.to_string())
    }
}
