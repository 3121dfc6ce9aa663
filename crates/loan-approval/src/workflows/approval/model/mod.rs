//! Scoring model capabilities and the artifact-backed logistic pipeline.
//!
//! Any type exposing predict, predict-probability and a preprocessing/classification
//! stage split can back the approval service; the shipped implementation is
//! [`LogisticPipeline`], deserialized from a JSON artifact by [`ModelLoader`].

mod loader;
mod pipeline;

pub use loader::{ModelLoadError, ModelLoader, ModelStatus, ModelStatusView, DEFAULT_MODEL_PATH};
pub use pipeline::{
    ArtifactError, CategoricalColumn, ClassifierArtifact, LogisticClassifier, LogisticPipeline,
    NumericColumn, PipelineArtifact, PipelineSteps, PreprocessorArtifact, TabularPreprocessor,
    UnknownCategoryPolicy, SUPPORTED_FORMAT_VERSION,
};

use super::domain::ApplicantRecord;
use serde::{Deserialize, Serialize};

/// Capability set the approval service needs from a trained model.
pub trait ScoringModel: Send + Sync {
    fn name(&self) -> &str;

    /// Predicted class label for the record.
    fn predict(&self, record: &ApplicantRecord) -> Result<i64, InferenceError>;

    /// Probability of the positive (approved) class.
    fn predict_probability(&self, record: &ApplicantRecord) -> Result<f64, InferenceError>;

    /// Named preprocessing and classification stages, when the model exposes them.
    fn stages(&self) -> Option<PipelineStages<'_>> {
        None
    }
}

/// Borrowed view of a model split into its preprocessing and classification stages.
#[derive(Clone, Copy)]
pub struct PipelineStages<'a> {
    pub preprocessor: &'a dyn Preprocessor,
    pub classifier: &'a dyn Classifier,
}

pub trait Preprocessor: Send + Sync {
    fn transform(&self, record: &ApplicantRecord) -> Result<Vec<f64>, InferenceError>;

    fn feature_names_out(&self) -> Vec<String>;
}

pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Raw model margin (log-odds for the positive class).
    fn decision_function(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Per-feature additive contributions to the decision function for one row.
    fn local_contributions(&self, features: &[f64]) -> Result<AdditiveContributions, InferenceError> {
        let _ = features;
        Err(InferenceError::Unsupported(
            "classifier does not support local attribution".to_string(),
        ))
    }
}

/// Additive breakdown: `base_value + sum(values)` equals the decision function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditiveContributions {
    pub base_value: f64,
    pub values: Vec<f64>,
}

/// Label and positive-class probability for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub label: i64,
    pub probability: f64,
}

/// Failures raised while running a record through a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("input column '{0}' is not available")]
    MissingColumn(String),
    #[error("column '{column}' expected {expected} values but received {found}")]
    ColumnKind {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("found unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },
    #[error("feature shape mismatch: expected {expected} features, received {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("non-finite value produced for feature '{feature}'")]
    NonFinite { feature: String },
    #[error("{0}")]
    Unsupported(String),
}

pub(crate) fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}
