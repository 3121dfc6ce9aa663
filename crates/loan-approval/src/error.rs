use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::approval::{ApprovalServiceError, IntakeError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Intake(IntakeError),
    Approval(ApprovalServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Intake(err) => write!(f, "invalid applicant details: {}", err),
            AppError::Approval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Approval(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Intake(_) | AppError::Approval(ApprovalServiceError::Inference(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Approval(ApprovalServiceError::ModelUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}

impl AppError {
    /// Machine-readable tag included in error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Intake(_) => "invalid_input",
            AppError::Approval(err) => err.kind().label(),
            AppError::Config(_) => "configuration",
            AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => "internal",
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Intake(value)
    }
}

impl From<ApprovalServiceError> for AppError {
    fn from(value: ApprovalServiceError) -> Self {
        Self::Approval(value)
    }
}
