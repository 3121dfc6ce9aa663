use super::rules::PolicyAssessment;
use super::thresholds::APPROVAL_PROBABILITY_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Final adjudication for a scored applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved { probability: f64 },
    RejectedByPolicy { reasons: Vec<String> },
    RejectedByLowProbability { probability: f64 },
}

impl DecisionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionOutcome::Approved { .. } => "approved",
            DecisionOutcome::RejectedByPolicy { .. } => "rejected_by_policy",
            DecisionOutcome::RejectedByLowProbability { .. } => "rejected_by_low_probability",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, DecisionOutcome::Approved { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            DecisionOutcome::Approved { probability } => {
                format!("Loan Approved with {} probability.", percent(*probability))
            }
            DecisionOutcome::RejectedByPolicy { reasons } => {
                format!("Loan Rejected based on policy: {}", reasons.join(", "))
            }
            DecisionOutcome::RejectedByLowProbability { probability } => format!(
                "Loan Not Approved: Probability too low ({})",
                percent(*probability)
            ),
        }
    }

    pub fn banner(&self) -> DecisionBanner {
        let kind = match self {
            DecisionOutcome::Approved { .. } => BannerKind::Success,
            DecisionOutcome::RejectedByPolicy { .. } => BannerKind::Error,
            DecisionOutcome::RejectedByLowProbability { .. } => BannerKind::Warning,
        };

        DecisionBanner {
            kind,
            message: self.summary(),
        }
    }
}

/// Visual treatment for the decision banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionBanner {
    pub kind: BannerKind,
    pub message: String,
}

fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub(crate) fn decide_outcome(assessment: &PolicyAssessment, probability: f64) -> DecisionOutcome {
    if assessment.risk_flag {
        return DecisionOutcome::RejectedByPolicy {
            reasons: assessment.reasons.clone(),
        };
    }

    if probability >= APPROVAL_PROBABILITY_THRESHOLD {
        DecisionOutcome::Approved { probability }
    } else {
        DecisionOutcome::RejectedByLowProbability { probability }
    }
}
