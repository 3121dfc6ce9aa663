//! Loan approval: intake validation, model scoring, lending-policy overlay and attribution.
//!
//! The policy overlay always has the final word. The model's probability only decides the
//! outcome once every policy rule has passed.

pub mod domain;
pub mod evaluation;
pub mod explain;
pub mod failure;
pub mod model;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantForm, ApplicantRecord, ColumnKind, ColumnValue, CreditGrade, EmploymentLength,
    HomeOwnership, IntakeError, LoanPurpose, UnknownOption, APPLICANT_COLUMNS,
};
pub use evaluation::{
    BannerKind, DecisionBanner, DecisionOutcome, PolicyAssessment, PolicyEngine, PolicyRule,
};
pub use explain::{explain, AttributionError, Explanation, Waterfall, WaterfallStep, MAX_DISPLAY};
pub use failure::FailureKind;
pub use model::{
    InferenceError, LogisticPipeline, ModelLoadError, ModelLoader, ModelPrediction, ModelStatus,
    ModelStatusView, ScoringModel,
};
pub use router::{approval_router, FormSchema};
pub use service::{ApprovalReport, ApprovalServiceError, ExplanationView, LoanApprovalService};
