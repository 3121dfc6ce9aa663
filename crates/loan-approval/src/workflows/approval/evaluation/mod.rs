mod policy;
mod rules;
pub mod thresholds;

pub use policy::{BannerKind, DecisionBanner, DecisionOutcome};
pub use rules::{PolicyAssessment, PolicyRule};

use super::domain::ApplicantRecord;
use policy::decide_outcome;

/// Stateless evaluator that overlays the lending policy on a model probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, record: &ApplicantRecord) -> PolicyAssessment {
        rules::assess_record(record)
    }

    /// Combines a prior assessment with the model probability. Policy always wins.
    pub fn decide(&self, assessment: &PolicyAssessment, probability: f64) -> DecisionOutcome {
        decide_outcome(assessment, probability)
    }

    pub fn evaluate(&self, record: &ApplicantRecord, probability: f64) -> DecisionOutcome {
        let assessment = self.assess(record);
        self.decide(&assessment, probability)
    }
}
