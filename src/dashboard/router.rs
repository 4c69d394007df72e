use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Local;
use serde_json::json;

use crate::domain::CompanyId;
use crate::parameters::ParameterResolver;

use super::access::SubscriptionDirectory;
use super::domain::DashboardFilter;
use super::repository::{CustomerAnalytics, ProfileDirectory, StudyAnalytics};
use super::service::{DashboardError, DashboardService};

/// Router builder exposing both dashboard variants.
pub fn dashboard_router<S, C, P, U, B>(service: Arc<DashboardService<S, C, P, U, B>>) -> Router
where
    S: StudyAnalytics + 'static,
    C: CustomerAnalytics + 'static,
    P: ParameterResolver + 'static,
    U: ProfileDirectory + 'static,
    B: SubscriptionDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/companies/:company_id/dashboard/basic",
            get(basic_handler::<S, C, P, U, B>),
        )
        .route(
            "/api/v1/companies/:company_id/dashboard/advanced",
            get(advanced_handler::<S, C, P, U, B>),
        )
        .with_state(service)
}

pub(crate) async fn basic_handler<S, C, P, U, B>(
    State(service): State<Arc<DashboardService<S, C, P, U, B>>>,
    Path(company_id): Path<String>,
) -> Response
where
    S: StudyAnalytics + 'static,
    C: CustomerAnalytics + 'static,
    P: ParameterResolver + 'static,
    U: ProfileDirectory + 'static,
    B: SubscriptionDirectory + 'static,
{
    let company_id = CompanyId(company_id);
    let today = Local::now().date_naive();

    match service.basic(&company_id, today) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn advanced_handler<S, C, P, U, B>(
    State(service): State<Arc<DashboardService<S, C, P, U, B>>>,
    Path(company_id): Path<String>,
    Query(filter): Query<DashboardFilter>,
) -> Response
where
    S: StudyAnalytics + 'static,
    C: CustomerAnalytics + 'static,
    P: ParameterResolver + 'static,
    U: ProfileDirectory + 'static,
    B: SubscriptionDirectory + 'static,
{
    let company_id = CompanyId(company_id);
    let today = Local::now().date_naive();

    match service.advanced(&company_id, &filter, today) {
        Ok(dashboard) => (StatusCode::OK, axum::Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: DashboardError) -> Response {
    let status = match &error {
        DashboardError::SubscriptionNotFound(_) => StatusCode::NOT_FOUND,
        DashboardError::AdvancedTierRequired(_) => StatusCode::FORBIDDEN,
        DashboardError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
