use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::approval::domain::{
    ApplicantForm, ApplicantRecord, CreditGrade, EmploymentLength, HomeOwnership, LoanPurpose,
};
use crate::workflows::approval::model::{
    CategoricalColumn, ClassifierArtifact, InferenceError, LogisticPipeline, ModelLoadError,
    ModelStatus, NumericColumn, PipelineArtifact, PipelineSteps, PreprocessorArtifact,
    ScoringModel, UnknownCategoryPolicy, SUPPORTED_FORMAT_VERSION,
};
use crate::workflows::approval::service::LoanApprovalService;

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < TOLERANCE
}

pub(super) fn form(
    annual_income: f64,
    loan_amount: f64,
    credit_grade: CreditGrade,
    employment_length: EmploymentLength,
) -> ApplicantForm {
    ApplicantForm {
        loan_amount,
        annual_income,
        interest_rate: 11.5,
        debt_to_income: 15.0,
        employment_length,
        purpose: LoanPurpose::DebtConsolidation,
        credit_grade,
        home_ownership: HomeOwnership::Rent,
    }
}

pub(super) fn record(
    annual_income: f64,
    loan_amount: f64,
    credit_grade: CreditGrade,
    employment_length: EmploymentLength,
) -> ApplicantRecord {
    ApplicantRecord::try_from(form(
        annual_income,
        loan_amount,
        credit_grade,
        employment_length,
    ))
    .expect("valid applicant")
}

/// Passes every policy rule: 166,667 RWF per month, loan well under 40% of income.
pub(super) fn eligible_record() -> ApplicantRecord {
    record(
        2_000_000.0,
        8_000.0,
        CreditGrade::A,
        EmploymentLength::FiveYears,
    )
}

/// One numeric and one two-category column:
/// an applicant earning 2,000,000 with grade A has margin 1.0 + 0.5 = 1.5.
pub(super) fn small_artifact() -> PipelineArtifact {
    PipelineArtifact {
        format_version: SUPPORTED_FORMAT_VERSION,
        name: "small-logreg".to_string(),
        steps: PipelineSteps {
            preprocessor: PreprocessorArtifact {
                numeric: vec![NumericColumn {
                    column: "annual_income".to_string(),
                    mean: 1_000_000.0,
                    scale: 1_000_000.0,
                }],
                categorical: vec![CategoricalColumn {
                    column: "grade".to_string(),
                    categories: vec!["A".to_string(), "B".to_string()],
                }],
                handle_unknown: UnknownCategoryPolicy::Error,
            },
            classifier: ClassifierArtifact {
                classes: [0, 1],
                coefficients: vec![1.0, 0.5, -0.5],
                intercept: 0.0,
                feature_means: Some(vec![0.0, 0.5, 0.5]),
            },
        },
    }
}

pub(super) fn small_pipeline() -> LogisticPipeline {
    LogisticPipeline::from_artifact(small_artifact()).expect("small artifact is valid")
}

pub(super) fn shipped_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/loan_model.json")
}

/// Model returning a fixed probability and exposing no pipeline stages.
pub(super) struct FixedModel {
    pub(super) probability: f64,
}

impl ScoringModel for FixedModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _record: &ApplicantRecord) -> Result<i64, InferenceError> {
        Ok(i64::from(self.probability >= 0.5))
    }

    fn predict_probability(&self, _record: &ApplicantRecord) -> Result<f64, InferenceError> {
        Ok(self.probability)
    }
}

pub(super) struct BrokenModel;

impl ScoringModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn predict(&self, _record: &ApplicantRecord) -> Result<i64, InferenceError> {
        Err(InferenceError::ShapeMismatch {
            expected: 29,
            found: 8,
        })
    }

    fn predict_probability(&self, _record: &ApplicantRecord) -> Result<f64, InferenceError> {
        Err(InferenceError::ShapeMismatch {
            expected: 29,
            found: 8,
        })
    }
}

pub(super) fn service_with(model: impl ScoringModel + 'static) -> LoanApprovalService {
    LoanApprovalService::new(ModelStatus::loaded(Arc::new(model), "test-model.json"))
}

pub(super) fn service_with_probability(probability: f64) -> LoanApprovalService {
    service_with(FixedModel { probability })
}

pub(super) fn service_without_model() -> LoanApprovalService {
    LoanApprovalService::new(ModelStatus::Unavailable(ModelLoadError::NotFound {
        path: PathBuf::from("loan_model.json"),
    }))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
