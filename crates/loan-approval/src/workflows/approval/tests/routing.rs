use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::approval::domain::{ApplicantForm, CreditGrade, EmploymentLength};
use crate::workflows::approval::router::{approval_router, decision_handler};

fn decision_request(body: &Value) -> Request<Body> {
    Request::post("/api/v1/loan/decisions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("json body")))
        .expect("request builds")
}

fn eligible_payload() -> Value {
    json!({
        "loan_amount": 8000,
        "annual_income": 2000000,
        "int_rate": 11.5,
        "dti": 15.0,
        "emp_length": "5 years",
        "purpose": "debt_consolidation",
        "grade": "A",
        "home_ownership": "RENT"
    })
}

#[tokio::test]
async fn decision_route_returns_report() {
    let router = approval_router(Arc::new(service_with_probability(0.80)));

    let response = router
        .oneshot(decision_request(&eligible_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["outcome"]["status"], "approved");
    assert_eq!(payload["applicant"]["annual_income"], 2_000_000.0);
    assert!(payload["explanation_warning"].is_string());
}

#[tokio::test]
async fn decision_route_accepts_descriptive_field_names() {
    let router = approval_router(Arc::new(service_with_probability(0.30)));
    let body = json!({
        "loan_amount": 8000,
        "annual_income": 2000000,
        "interest_rate": 9.0,
        "debt_to_income": 11.0,
        "employment_length": "10+ years",
        "purpose": "credit_card",
        "credit_grade": "B",
        "home_ownership": "MORTGAGE"
    });

    let response = router
        .oneshot(decision_request(&body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["outcome"]["status"], "rejected_by_low_probability");
    assert_eq!(payload["banner"]["kind"], "warning");
}

#[tokio::test]
async fn decision_route_rejects_negative_amounts() {
    let router = approval_router(Arc::new(service_with_probability(0.80)));
    let mut body = eligible_payload();
    body["loan_amount"] = json!(-5);

    let response = router
        .oneshot(decision_request(&body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "invalid_input");
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("loan_amount"));
}

#[tokio::test]
async fn decision_route_rejects_unknown_grade() {
    let router = approval_router(Arc::new(service_with_probability(0.80)));
    let mut body = eligible_payload();
    body["grade"] = json!("Z");

    let response = router
        .oneshot(decision_request(&body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "invalid_input");
    assert!(payload["error"].as_str().unwrap_or_default().contains("Z"));
}

#[tokio::test]
async fn malformed_body_is_reported_as_invalid_input() {
    let router = approval_router(Arc::new(service_with_probability(0.80)));

    let response = router
        .oneshot(
            Request::post("/api/v1/loan/decisions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"loan_amount\": "))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "invalid_input");
}

#[tokio::test]
async fn missing_model_reports_artifact_missing_without_banner() {
    let service = Arc::new(service_without_model());

    let response = decision_handler(
        State(service),
        Ok(axum::Json(ApplicantForm {
            credit_grade: CreditGrade::G,
            employment_length: EmploymentLength::LessThanOneYear,
            ..ApplicantForm::default()
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "artifact_missing");
    assert!(payload.get("banner").is_none());
    assert!(payload.get("outcome").is_none());
}

#[tokio::test]
async fn inference_failure_maps_to_unprocessable() {
    let response = decision_handler(
        State(Arc::new(service_with(BrokenModel))),
        Ok(axum::Json(ApplicantForm::default())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], "inference_failure");
}

#[tokio::test]
async fn model_status_route_reports_unavailable_model() {
    let router = approval_router(Arc::new(service_without_model()));

    let response = router
        .oneshot(
            Request::get("/api/v1/model/status")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"], "unavailable");
    assert_eq!(payload["kind"], "artifact_missing");
}

#[tokio::test]
async fn form_route_lists_options_and_defaults() {
    let router = approval_router(Arc::new(service_without_model()));

    let response = router
        .oneshot(
            Request::get("/api/v1/loan/form")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["employment_lengths"].as_array().map(Vec::len), Some(11));
    assert_eq!(payload["employment_lengths"][0], "< 1 year");
    assert_eq!(payload["purposes"].as_array().map(Vec::len), Some(4));
    assert_eq!(payload["credit_grades"].as_array().map(Vec::len), Some(7));
    assert_eq!(payload["home_ownership"], json!(["RENT", "MORTGAGE", "OWN"]));
    assert_eq!(payload["defaults"]["loan_amount"], 8000.0);
    assert_eq!(payload["defaults"]["emp_length"], "< 1 year");
}
