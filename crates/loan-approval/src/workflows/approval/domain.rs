use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column names the scoring pipeline was trained on, in form order.
pub const APPLICANT_COLUMNS: [&str; 8] = [
    "loan_amount",
    "annual_income",
    "int_rate",
    "dti",
    "emp_length",
    "purpose",
    "grade",
    "home_ownership",
];

/// Employment tenure bands offered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentLength {
    #[serde(rename = "< 1 year")]
    LessThanOneYear,
    #[serde(rename = "1 year")]
    OneYear,
    #[serde(rename = "2 years")]
    TwoYears,
    #[serde(rename = "3 years")]
    ThreeYears,
    #[serde(rename = "4 years")]
    FourYears,
    #[serde(rename = "5 years")]
    FiveYears,
    #[serde(rename = "6 years")]
    SixYears,
    #[serde(rename = "7 years")]
    SevenYears,
    #[serde(rename = "8 years")]
    EightYears,
    #[serde(rename = "9 years")]
    NineYears,
    #[serde(rename = "10+ years")]
    TenPlusYears,
}

impl EmploymentLength {
    pub const ALL: [EmploymentLength; 11] = [
        EmploymentLength::LessThanOneYear,
        EmploymentLength::OneYear,
        EmploymentLength::TwoYears,
        EmploymentLength::ThreeYears,
        EmploymentLength::FourYears,
        EmploymentLength::FiveYears,
        EmploymentLength::SixYears,
        EmploymentLength::SevenYears,
        EmploymentLength::EightYears,
        EmploymentLength::NineYears,
        EmploymentLength::TenPlusYears,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentLength::LessThanOneYear => "< 1 year",
            EmploymentLength::OneYear => "1 year",
            EmploymentLength::TwoYears => "2 years",
            EmploymentLength::ThreeYears => "3 years",
            EmploymentLength::FourYears => "4 years",
            EmploymentLength::FiveYears => "5 years",
            EmploymentLength::SixYears => "6 years",
            EmploymentLength::SevenYears => "7 years",
            EmploymentLength::EightYears => "8 years",
            EmploymentLength::NineYears => "9 years",
            EmploymentLength::TenPlusYears => "10+ years",
        }
    }
}

/// Declared use of the loan proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    DebtConsolidation,
    CreditCard,
    HomeImprovement,
    MajorPurchase,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 4] = [
        LoanPurpose::DebtConsolidation,
        LoanPurpose::CreditCard,
        LoanPurpose::HomeImprovement,
        LoanPurpose::MajorPurchase,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LoanPurpose::DebtConsolidation => "debt_consolidation",
            LoanPurpose::CreditCard => "credit_card",
            LoanPurpose::HomeImprovement => "home_improvement",
            LoanPurpose::MajorPurchase => "major_purchase",
        }
    }
}

/// Bureau credit grade, `A` being the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditGrade {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl CreditGrade {
    pub const ALL: [CreditGrade; 7] = [
        CreditGrade::A,
        CreditGrade::B,
        CreditGrade::C,
        CreditGrade::D,
        CreditGrade::E,
        CreditGrade::F,
        CreditGrade::G,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CreditGrade::A => "A",
            CreditGrade::B => "B",
            CreditGrade::C => "C",
            CreditGrade::D => "D",
            CreditGrade::E => "E",
            CreditGrade::F => "F",
            CreditGrade::G => "G",
        }
    }

    pub const fn is_very_low(self) -> bool {
        matches!(self, CreditGrade::F | CreditGrade::G)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HomeOwnership {
    Rent,
    Mortgage,
    Own,
}

impl HomeOwnership {
    pub const ALL: [HomeOwnership; 3] = [
        HomeOwnership::Rent,
        HomeOwnership::Mortgage,
        HomeOwnership::Own,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            HomeOwnership::Rent => "RENT",
            HomeOwnership::Mortgage => "MORTGAGE",
            HomeOwnership::Own => "OWN",
        }
    }
}

/// Raised when a form value does not name one of the enumerated options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {field} (expected one of: {expected})")]
pub struct UnknownOption {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! impl_option_parsing {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownOption;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| UnknownOption {
                        field: $field,
                        value: raw.to_string(),
                        expected: <$ty>::ALL
                            .iter()
                            .map(|option| option.label())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

impl_option_parsing!(EmploymentLength, "employment length");
impl_option_parsing!(LoanPurpose, "loan purpose");
impl_option_parsing!(CreditGrade, "credit grade");
impl_option_parsing!(HomeOwnership, "home ownership");

/// Raw intake payload as submitted by the form; validated into an [`ApplicantRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantForm {
    pub loan_amount: f64,
    pub annual_income: f64,
    #[serde(rename = "int_rate", alias = "interest_rate")]
    pub interest_rate: f64,
    #[serde(rename = "dti", alias = "debt_to_income")]
    pub debt_to_income: f64,
    #[serde(rename = "emp_length", alias = "employment_length")]
    pub employment_length: EmploymentLength,
    pub purpose: LoanPurpose,
    #[serde(rename = "grade", alias = "credit_grade")]
    pub credit_grade: CreditGrade,
    pub home_ownership: HomeOwnership,
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self {
            loan_amount: 8_000.0,
            annual_income: 80_000.0,
            interest_rate: 11.5,
            debt_to_income: 15.0,
            employment_length: EmploymentLength::LessThanOneYear,
            purpose: LoanPurpose::DebtConsolidation,
            credit_grade: CreditGrade::A,
            home_ownership: HomeOwnership::Rent,
        }
    }
}

/// Validation failures raised while turning a form into an applicant record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("{field} must be zero or greater (found {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// One validated applicant row. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApplicantForm")]
pub struct ApplicantRecord {
    loan_amount: f64,
    annual_income: f64,
    #[serde(rename = "int_rate")]
    interest_rate: f64,
    #[serde(rename = "dti")]
    debt_to_income: f64,
    #[serde(rename = "emp_length")]
    employment_length: EmploymentLength,
    purpose: LoanPurpose,
    #[serde(rename = "grade")]
    credit_grade: CreditGrade,
    home_ownership: HomeOwnership,
}

impl ApplicantRecord {
    pub fn loan_amount(&self) -> f64 {
        self.loan_amount
    }

    pub fn annual_income(&self) -> f64 {
        self.annual_income
    }

    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    pub fn debt_to_income(&self) -> f64 {
        self.debt_to_income
    }

    pub fn employment_length(&self) -> EmploymentLength {
        self.employment_length
    }

    pub fn purpose(&self) -> LoanPurpose {
        self.purpose
    }

    pub fn credit_grade(&self) -> CreditGrade {
        self.credit_grade
    }

    pub fn home_ownership(&self) -> HomeOwnership {
        self.home_ownership
    }

    /// Looks up a model input column by its trained name.
    pub fn column(&self, name: &str) -> Option<ColumnValue> {
        let value = match name {
            "loan_amount" => ColumnValue::Numeric(self.loan_amount),
            "annual_income" => ColumnValue::Numeric(self.annual_income),
            "int_rate" => ColumnValue::Numeric(self.interest_rate),
            "dti" => ColumnValue::Numeric(self.debt_to_income),
            "emp_length" => ColumnValue::Categorical(self.employment_length.label()),
            "purpose" => ColumnValue::Categorical(self.purpose.label()),
            "grade" => ColumnValue::Categorical(self.credit_grade.label()),
            "home_ownership" => ColumnValue::Categorical(self.home_ownership.label()),
            _ => return None,
        };
        Some(value)
    }
}

impl TryFrom<ApplicantForm> for ApplicantRecord {
    type Error = IntakeError;

    fn try_from(form: ApplicantForm) -> Result<Self, Self::Error> {
        Ok(Self {
            loan_amount: non_negative("loan_amount", form.loan_amount)?,
            annual_income: non_negative("annual_income", form.annual_income)?,
            interest_rate: non_negative("int_rate", form.interest_rate)?,
            debt_to_income: non_negative("dti", form.debt_to_income)?,
            employment_length: form.employment_length,
            purpose: form.purpose,
            credit_grade: form.credit_grade,
            home_ownership: form.home_ownership,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, IntakeError> {
    if !value.is_finite() {
        return Err(IntakeError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(IntakeError::Negative { field, value });
    }
    Ok(value)
}

/// Whether a model input column holds numbers or enumerated labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub const fn label(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }

    /// Kind of a trained column name, or `None` when the applicant row has no such column.
    pub fn of_column(name: &str) -> Option<Self> {
        match name {
            "loan_amount" | "annual_income" | "int_rate" | "dti" => Some(ColumnKind::Numeric),
            "emp_length" | "purpose" | "grade" | "home_ownership" => Some(ColumnKind::Categorical),
            _ => None,
        }
    }
}

/// Cell value handed to the preprocessing stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue {
    Numeric(f64),
    Categorical(&'static str),
}

impl ColumnValue {
    pub const fn kind(&self) -> ColumnKind {
        match self {
            ColumnValue::Numeric(_) => ColumnKind::Numeric,
            ColumnValue::Categorical(_) => ColumnKind::Categorical,
        }
    }
}
