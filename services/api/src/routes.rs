use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use axum::Json;
use loan_approval::workflows::approval::{approval_router, LoanApprovalService};
use serde_json::json;
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Static files served under `/assets/`, embedded at compile time.
const ASSETS: &[(&str, &str)] = &[
    ("app.css", include_str!("../assets/app.css")),
    ("app.js", include_str!("../assets/app.js")),
];

pub(crate) fn with_approval_routes(service: Arc<LoanApprovalService>) -> axum::Router {
    approval_router(service)
        .route("/", axum::routing::get(index_page))
        .route("/assets/:file", axum::routing::get(asset_endpoint))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn asset_endpoint(Path(file): Path<String>) -> Response {
    match ASSETS.iter().find(|(name, _)| *name == file) {
        Some((name, body)) => {
            let mime = mime_guess::from_path(name).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                *body,
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no asset named '{file}'") })),
        )
            .into_response(),
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use loan_approval::workflows::approval::{ModelLoadError, ModelStatus};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let service = Arc::new(LoanApprovalService::new(ModelStatus::Unavailable(
            ModelLoadError::NotFound {
                path: PathBuf::from("loan_model.json"),
            },
        )));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_approval_routes(service).layer(Extension(state))
    }

    async fn get(router: axum::Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[tokio::test]
    async fn index_serves_the_intake_form() {
        let response = get(app(true), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Loan Approval"));
        assert!(body.contains("/assets/app.js"));
    }

    #[tokio::test]
    async fn assets_carry_guessed_content_type() {
        let response = get(app(true), "/assets/app.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.contains("javascript"), "{content_type}");
    }

    #[tokio::test]
    async fn form_script_reports_model_status_and_keeps_predict_enabled() {
        let body = body_text(get(app(true), "/assets/app.js").await).await;

        assert!(body.contains(r#"showBanner(modelStatus, "success", status.message)"#));
        assert!(body.contains("Model not loaded or invalid"));
        assert!(!body.contains("disabled = true"));
    }

    #[tokio::test]
    async fn unknown_assets_are_not_found() {
        let response = get(app(true), "/assets/secrets.env").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn readiness_tracks_startup_flag() {
        assert_eq!(
            get(app(false), "/ready").await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get(app(true), "/ready").await.status(), StatusCode::OK);
        assert_eq!(get(app(true), "/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn approval_routes_are_mounted() {
        let response = app(true)
            .oneshot(
                Request::post("/api/v1/loan/decisions")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&loan_approval::workflows::approval::ApplicantForm::default())
                            .expect("json body"),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let status = get(app(true), "/api/v1/model/status").await;
        assert_eq!(status.status(), StatusCode::OK);
        assert!(body_text(status).await.contains("unavailable"));
    }
}
