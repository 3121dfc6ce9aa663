use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_approval_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::telemetry;
use loan_approval::workflows::approval::{LoanApprovalService, ModelLoader};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(model) = args.model.take() {
        config.model.path = model;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let model_status = ModelLoader::new(config.model.path.clone()).load_status();
    if !model_status.is_loaded() {
        warn!(path = %config.model.path.display(), "serving without a model; scoring is disabled");
    }
    let approval_service = Arc::new(LoanApprovalService::new(model_status));

    let app = with_approval_routes(approval_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan approval service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
