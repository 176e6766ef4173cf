use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::acceptance::{AcceptanceError, AcceptanceService, ApplicationLedger, LedgerError};
use super::domain::ApplicationForm;
use super::gateway::SubmissionResponse;

/// Router exposing the reference acceptance endpoint.
pub fn acceptance_router<L>(service: Arc<AcceptanceService<L>>) -> Router
where
    L: ApplicationLedger + 'static,
{
    Router::new()
        .route("/api/applications", post(submit_handler::<L>))
        .route("/api/applications/:application_id", get(status_handler::<L>))
        .with_state(service)
}

pub(crate) async fn submit_handler<L>(
    State(service): State<Arc<AcceptanceService<L>>>,
    axum::Json(form): axum::Json<ApplicationForm>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.accept(form) {
        Ok(accepted) => (StatusCode::CREATED, axum::Json(accepted.receipt())).into_response(),
        Err(AcceptanceError::Invalid(report)) => {
            let payload = json!({
                "success": false,
                "message": "Invalid application data. Please review your information and try again.",
                "error": report.summary(),
                "errors": report.errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(AcceptanceError::Ledger(LedgerError::Conflict)) => {
            let payload = SubmissionResponse::rejected(
                "Failed to submit application. Please try again.",
                "application already exists",
            );
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "success": false,
                "message": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<L>(
    State(service): State<Arc<AcceptanceService<L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: ApplicationLedger + 'static,
{
    match service.get(&application_id) {
        Ok(accepted) => (StatusCode::OK, axum::Json(accepted.status_view())).into_response(),
        Err(AcceptanceError::Ledger(LedgerError::NotFound)) => {
            let payload = json!({
                "applicationId": application_id,
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
