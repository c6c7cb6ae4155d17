use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::VarId;
use super::repository::CandidateRepository;
use super::scenario::ScenarioRequest;
use super::service::{AcquisitionService, AcquisitionServiceError, RankingRequest};

/// Router builder exposing ranking, explanation and scenario endpoints.
pub fn acquisition_router<R>(service: Arc<AcquisitionService<R>>) -> Router
where
    R: CandidateRepository + 'static,
{
    Router::new()
        .route("/api/v1/vars/rankings", post(rankings_handler::<R>))
        .route(
            "/api/v1/vars/:var_id/explanation",
            get(explanation_handler::<R>),
        )
        .route("/api/v1/scenarios", post(scenario_handler::<R>))
        .route("/api/v1/criteria/default", get(default_criteria_handler::<R>))
        .with_state(service)
}

pub(crate) async fn rankings_handler<R>(
    State(service): State<Arc<AcquisitionService<R>>>,
    axum::Json(request): axum::Json<RankingRequest>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.compute_rankings(request) {
        Ok(snapshot) => (StatusCode::OK, axum::Json(snapshot)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn explanation_handler<R>(
    State(service): State<Arc<AcquisitionService<R>>>,
    Path(var_id): Path<u64>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.explain(VarId(var_id)).await {
        Ok(payload) => (StatusCode::OK, axum::Json(payload)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn scenario_handler<R>(
    State(service): State<Arc<AcquisitionService<R>>>,
    axum::Json(request): axum::Json<ScenarioRequest>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    match service.simulate(request) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn default_criteria_handler<R>(
    State(service): State<Arc<AcquisitionService<R>>>,
) -> Response
where
    R: CandidateRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.default_criteria())).into_response()
}

fn error_response(error: AcquisitionServiceError) -> Response {
    let status = if error.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
