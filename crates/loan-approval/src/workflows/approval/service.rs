use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::ApplicantRecord;
use super::evaluation::{DecisionBanner, DecisionOutcome, PolicyAssessment, PolicyEngine};
use super::explain::{explain, render_svg, Waterfall, MAX_DISPLAY};
use super::failure::FailureKind;
use super::model::{InferenceError, ModelLoadError, ModelPrediction, ModelStatus, ModelStatusView};

/// Service composing the loaded model, the policy overlay and the explainer.
#[derive(Debug, Clone)]
pub struct LoanApprovalService {
    model: ModelStatus,
    engine: PolicyEngine,
}

impl LoanApprovalService {
    pub fn new(model: ModelStatus) -> Self {
        Self {
            model,
            engine: PolicyEngine::new(),
        }
    }

    pub fn model_status(&self) -> ModelStatusView {
        self.model.view()
    }

    /// Score one applicant and overlay the lending policy.
    pub fn assess(&self, record: ApplicantRecord) -> Result<ApprovalReport, ApprovalServiceError> {
        let model = self
            .model
            .model()
            .map_err(|err| ApprovalServiceError::ModelUnavailable(err.clone()))?;

        let prediction = ModelPrediction {
            label: model.predict(&record)?,
            probability: model.predict_probability(&record)?,
        };

        let policy = self.engine.assess(&record);
        let outcome = self.engine.decide(&policy, prediction.probability);

        info!(
            outcome = outcome.label(),
            probability = prediction.probability,
            policy_reasons = policy.reasons.len(),
            "loan application assessed"
        );

        let (explanation, explanation_warning) = match explain(model, &record) {
            Ok(explanation) => {
                let waterfall = explanation.waterfall(MAX_DISPLAY);
                let svg = render_svg(&waterfall);
                (Some(ExplanationView { waterfall, svg }), None)
            }
            Err(err) => {
                warn!(kind = err.kind().label(), error = %err, "attribution unavailable");
                (
                    None,
                    Some(format!("Could not generate attribution plot: {err}")),
                )
            }
        };

        Ok(ApprovalReport {
            evaluated_at: Utc::now(),
            banner: outcome.banner(),
            outcome,
            prediction,
            policy,
            applicant: record,
            explanation,
            explanation_warning,
        })
    }
}

/// Everything rendered back to the user for one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalReport {
    pub evaluated_at: DateTime<Utc>,
    pub outcome: DecisionOutcome,
    pub banner: DecisionBanner,
    pub prediction: ModelPrediction,
    pub policy: PolicyAssessment,
    pub applicant: ApplicantRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplanationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_warning: Option<String>,
}

/// Top contributions as waterfall steps plus the rendered chart.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationView {
    pub waterfall: Waterfall,
    pub svg: String,
}

/// Error raised by the approval service. No decision is produced when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalServiceError {
    #[error("model not loaded or invalid: {0}")]
    ModelUnavailable(ModelLoadError),
    #[error("prediction failed: {0}")]
    Inference(#[from] InferenceError),
}

impl ApprovalServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApprovalServiceError::ModelUnavailable(err) => err.kind(),
            ApprovalServiceError::Inference(_) => FailureKind::InferenceFailure,
        }
    }
}
