use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde_json::json;

use crate::domain::{CompanyId, StudyId};
use crate::parameters::ParameterResolver;

use super::repository::StudyStore;
use super::service::{ScoringServiceError, StudyScoringService};

/// Router builder exposing the scoring operation.
pub fn study_router<S, P>(service: Arc<StudyScoringService<S, P>>) -> Router
where
    S: StudyStore + 'static,
    P: ParameterResolver + 'static,
{
    Router::new()
        .route(
            "/api/v1/companies/:company_id/credit-studies/:study_id/perform",
            post(perform_handler::<S, P>),
        )
        .with_state(service)
}

pub(crate) async fn perform_handler<S, P>(
    State(service): State<Arc<StudyScoringService<S, P>>>,
    Path((company_id, study_id)): Path<(String, String)>,
) -> Response
where
    S: StudyStore + 'static,
    P: ParameterResolver + 'static,
{
    let company_id = CompanyId(company_id);
    let study_id = StudyId(study_id);

    match service.perform(&company_id, &study_id, Utc::now()) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error @ ScoringServiceError::StudyNotFound(_))
        | Err(error @ ScoringServiceError::CompletedStatusMissing) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ ScoringServiceError::TenantMismatch { .. }) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
