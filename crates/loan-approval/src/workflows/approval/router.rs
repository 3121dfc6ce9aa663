use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::domain::{
    ApplicantForm, ApplicantRecord, CreditGrade, EmploymentLength, HomeOwnership, LoanPurpose,
};
use super::service::{ApprovalServiceError, LoanApprovalService};

/// Router builder exposing the scoring action and its supporting form metadata.
pub fn approval_router(service: Arc<LoanApprovalService>) -> Router {
    Router::new()
        .route("/api/v1/loan/decisions", post(decision_handler))
        .route("/api/v1/loan/form", get(form_handler))
        .route("/api/v1/model/status", get(model_status_handler))
        .with_state(service)
}

pub(crate) async fn decision_handler(
    State(service): State<Arc<LoanApprovalService>>,
    payload: Result<Json<ApplicantForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => return invalid_input(rejection.status(), rejection.body_text()),
    };
    let record = match ApplicantRecord::try_from(form) {
        Ok(record) => record,
        Err(error) => return invalid_input(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    };

    match service.assess(record) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => {
            warn!(kind = error.kind().label(), error = %error, "loan assessment failed");
            let status = match error {
                ApprovalServiceError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ApprovalServiceError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            let payload = json!({
                "error": error.to_string(),
                "kind": error.kind(),
            });
            (status, Json(payload)).into_response()
        }
    }
}

fn invalid_input(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
        "kind": "invalid_input",
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn model_status_handler(
    State(service): State<Arc<LoanApprovalService>>,
) -> Response {
    (StatusCode::OK, Json(service.model_status())).into_response()
}

/// Enumerated options and defaults used to draw the intake form.
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub defaults: ApplicantForm,
    pub employment_lengths: Vec<&'static str>,
    pub purposes: Vec<&'static str>,
    pub credit_grades: Vec<&'static str>,
    pub home_ownership: Vec<&'static str>,
}

impl FormSchema {
    pub fn standard() -> Self {
        Self {
            defaults: ApplicantForm::default(),
            employment_lengths: EmploymentLength::ALL.iter().map(|o| o.label()).collect(),
            purposes: LoanPurpose::ALL.iter().map(|o| o.label()).collect(),
            credit_grades: CreditGrade::ALL.iter().map(|o| o.label()).collect(),
            home_ownership: HomeOwnership::ALL.iter().map(|o| o.label()).collect(),
        }
    }
}

pub(crate) async fn form_handler() -> Json<FormSchema> {
    Json(FormSchema::standard())
}
