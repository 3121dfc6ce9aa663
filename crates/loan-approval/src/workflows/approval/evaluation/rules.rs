use super::super::domain::{ApplicantRecord, EmploymentLength};
use super::thresholds::{MAXIMUM_LOAN_TO_INCOME, MINIMUM_MONTHLY_INCOME, MONTHS_PER_YEAR};
use serde::{Deserialize, Serialize};

/// Hard eligibility rules, declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    MinimumMonthlyIncome,
    LoanToIncomeCap,
    CreditGradeFloor,
    EmploymentHistory,
}

impl PolicyRule {
    pub const ORDERED: [PolicyRule; 4] = [
        PolicyRule::MinimumMonthlyIncome,
        PolicyRule::LoanToIncomeCap,
        PolicyRule::CreditGradeFloor,
        PolicyRule::EmploymentHistory,
    ];

    pub const fn reason(self) -> &'static str {
        match self {
            PolicyRule::MinimumMonthlyIncome => "Monthly income is below RWF 120,000",
            PolicyRule::LoanToIncomeCap => "Loan exceeds 40% of annual income",
            PolicyRule::CreditGradeFloor => "Very low credit grade",
            PolicyRule::EmploymentHistory => "Insufficient employment history",
        }
    }
}

/// Result of running every policy rule against one applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAssessment {
    pub risk_flag: bool,
    pub reasons: Vec<String>,
    pub triggered: Vec<PolicyRule>,
    pub monthly_income: f64,
    pub max_loan_allowed: f64,
}

pub(crate) fn assess_record(record: &ApplicantRecord) -> PolicyAssessment {
    let monthly_income = record.annual_income() / MONTHS_PER_YEAR;
    let max_loan_allowed = MAXIMUM_LOAN_TO_INCOME * record.annual_income();

    // Every rule runs so that co-occurring reasons are all reported.
    let triggered: Vec<PolicyRule> = PolicyRule::ORDERED
        .into_iter()
        .filter(|rule| match rule {
            PolicyRule::MinimumMonthlyIncome => monthly_income < MINIMUM_MONTHLY_INCOME,
            PolicyRule::LoanToIncomeCap => record.loan_amount() > max_loan_allowed,
            PolicyRule::CreditGradeFloor => record.credit_grade().is_very_low(),
            PolicyRule::EmploymentHistory => {
                record.employment_length() == EmploymentLength::LessThanOneYear
            }
        })
        .collect();

    PolicyAssessment {
        risk_flag: !triggered.is_empty(),
        reasons: triggered
            .iter()
            .map(|rule| rule.reason().to_string())
            .collect(),
        triggered,
        monthly_income,
        max_loan_allowed,
    }
}
