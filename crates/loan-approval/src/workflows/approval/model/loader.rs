use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::super::failure::FailureKind;
use super::pipeline::{LogisticPipeline, PipelineArtifact};
use super::ScoringModel;

/// Relative path the artifact is read from when nothing else is configured.
pub const DEFAULT_MODEL_PATH: &str = "loan_model.json";

const LOADED_MESSAGE: &str = "Model loaded successfully.";

/// Reasons a model artifact could not be turned into a usable model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelLoadError {
    #[error("model file not found at '{}'", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to load model from '{}': {message}", .path.display())]
    Incompatible { path: PathBuf, message: String },
}

impl ModelLoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ModelLoadError::NotFound { .. } => FailureKind::ArtifactMissing,
            ModelLoadError::Incompatible { .. } => FailureKind::ArtifactIncompatible,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ModelLoadError::NotFound { path } | ModelLoadError::Incompatible { path, .. } => path,
        }
    }
}

/// Reads a pipeline artifact from a fixed location. No retries.
#[derive(Debug, Clone)]
pub struct ModelLoader {
    path: PathBuf,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<LogisticPipeline, ModelLoadError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ModelLoadError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(err) => return Err(self.incompatible(err)),
        };

        let artifact: PipelineArtifact =
            serde_json::from_str(&raw).map_err(|err| self.incompatible(err))?;
        LogisticPipeline::from_artifact(artifact).map_err(|err| self.incompatible(err))
    }

    /// Loads once and records the outcome; failures leave the model absent.
    pub fn load_status(&self) -> ModelStatus {
        match self.load() {
            Ok(pipeline) => {
                info!(
                    path = %self.path.display(),
                    model = pipeline.name(),
                    "scoring model loaded"
                );
                ModelStatus::loaded(Arc::new(pipeline), self.path.clone())
            }
            Err(err) => {
                error!(
                    path = %self.path.display(),
                    kind = err.kind().label(),
                    error = %err,
                    "scoring model unavailable"
                );
                ModelStatus::Unavailable(err)
            }
        }
    }

    fn incompatible(&self, err: impl fmt::Display) -> ModelLoadError {
        ModelLoadError::Incompatible {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

/// Process-wide model slot: either a loaded model or the reason it is absent.
#[derive(Clone)]
pub enum ModelStatus {
    Loaded {
        model: Arc<dyn ScoringModel>,
        path: PathBuf,
        loaded_at: DateTime<Utc>,
    },
    Unavailable(ModelLoadError),
}

impl ModelStatus {
    pub fn loaded(model: Arc<dyn ScoringModel>, path: impl Into<PathBuf>) -> Self {
        ModelStatus::Loaded {
            model,
            path: path.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn model(&self) -> Result<&dyn ScoringModel, &ModelLoadError> {
        match self {
            ModelStatus::Loaded { model, .. } => Ok(model.as_ref()),
            ModelStatus::Unavailable(err) => Err(err),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelStatus::Loaded { .. })
    }

    pub fn view(&self) -> ModelStatusView {
        match self {
            ModelStatus::Loaded {
                model,
                path,
                loaded_at,
            } => ModelStatusView {
                state: "loaded",
                message: LOADED_MESSAGE.to_string(),
                kind: None,
                model_name: Some(model.name().to_string()),
                path: path.display().to_string(),
                loaded_at: Some(*loaded_at),
            },
            ModelStatus::Unavailable(err) => ModelStatusView {
                state: "unavailable",
                message: err.to_string(),
                kind: Some(err.kind()),
                model_name: None,
                path: err.path().display().to_string(),
                loaded_at: None,
            },
        }
    }
}

impl fmt::Debug for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Loaded {
                model,
                path,
                loaded_at,
            } => f
                .debug_struct("Loaded")
                .field("model", &model.name())
                .field("path", path)
                .field("loaded_at", loaded_at)
                .finish(),
            ModelStatus::Unavailable(err) => f.debug_tuple("Unavailable").field(err).finish(),
        }
    }
}

/// Serializable model status for the form banner and status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatusView {
    pub state: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}
