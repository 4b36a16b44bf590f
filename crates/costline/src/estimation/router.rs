use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::dealshield::DealShieldControls;
use super::domain::ProjectRequest;
use super::repository::{EstimateId, EstimateRepository, RepositoryError};
use super::service::{EstimateServiceError, EstimationService, RECENT_LIMIT};

/// Router builder exposing the estimate and DealShield endpoints.
pub fn estimate_router<R>(service: Arc<EstimationService<R>>) -> Router
where
    R: EstimateRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/estimates",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/estimates/:estimate_id", get(fetch_handler::<R>))
        .route(
            "/api/v1/estimates/:estimate_id/export.csv",
            get(export_handler::<R>),
        )
        .route("/api/v1/dealshield", post(dealshield_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DealShieldRequest {
    pub request: ProjectRequest,
    #[serde(default)]
    pub controls: DealShieldControls,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<EstimationService<R>>>,
    axum::Json(request): axum::Json<ProjectRequest>,
) -> Response
where
    R: EstimateRepository + 'static,
{
    match service.submit(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error, None),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<EstimationService<R>>>,
    Path(estimate_id): Path<String>,
) -> Response
where
    R: EstimateRepository + 'static,
{
    let id = EstimateId(estimate_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error, Some(&id)),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<EstimationService<R>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: EstimateRepository + 'static,
{
    match service.recent(query.limit.unwrap_or(RECENT_LIMIT)) {
        Ok(summaries) => (StatusCode::OK, axum::Json(summaries)).into_response(),
        Err(error) => error_response(error, None),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<EstimationService<R>>>,
    Path(estimate_id): Path<String>,
) -> Response
where
    R: EstimateRepository + 'static,
{
    let id = EstimateId(estimate_id);
    match service.export_csv(&id) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref())],
            body,
        )
            .into_response(),
        Err(error) => error_response(error, Some(&id)),
    }
}

pub(crate) async fn dealshield_handler<R>(
    State(service): State<Arc<EstimationService<R>>>,
    axum::Json(body): axum::Json<DealShieldRequest>,
) -> Response
where
    R: EstimateRepository + 'static,
{
    match service.dealshield(&body.request, &body.controls) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error, None),
    }
}

fn error_response(error: EstimateServiceError, estimate_id: Option<&EstimateId>) -> Response {
    match error {
        EstimateServiceError::InvalidRequest(message) => {
            let payload = json!({
                "error": message,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        EstimateServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "estimate not found",
                "estimate_id": estimate_id.map(EstimateId::as_str),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        EstimateServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "estimate already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            tracing::error!(error = %other, "estimate request failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
