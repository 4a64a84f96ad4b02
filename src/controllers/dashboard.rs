use crate::services::delay_analytics::{
    AnalyticsError, DashboardReport, DelayAnalyticsState, ResolvedRentals, Scope,
};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ResolvedQuery {
    threshold: u32,
    scope: Scope,
}

pub fn router(state: DelayAnalyticsState) -> Router {
    Router::new()
        .route("/", get(get_report))
        .route("/resolved", get(get_resolved))
        .with_state(state)
}

pub async fn get_report(State(analytics): State<DelayAnalyticsState>) -> Json<DashboardReport> {
    Json(analytics.report())
}

pub async fn get_resolved(
    State(analytics): State<DelayAnalyticsState>,
    query: Result<Query<ResolvedQuery>, QueryRejection>,
) -> Result<Json<ResolvedRentals>, AnalyticsError> {
    let Query(query) =
        query.map_err(|rejection| AnalyticsError::InvalidQuery(rejection.body_text()))?;
    let resolved = analytics.simulate(query.threshold, query.scope)?;
    Ok(Json(resolved))
}
