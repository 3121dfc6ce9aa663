//! Fixed lending-policy constants.

/// Minimum monthly income in RWF.
pub const MINIMUM_MONTHLY_INCOME: f64 = 120_000.0;

/// Largest loan allowed as a share of annual income.
pub const MAXIMUM_LOAN_TO_INCOME: f64 = 0.4;

/// Model probability at or above which an application that passed policy is approved.
pub const APPROVAL_PROBABILITY_THRESHOLD: f64 = 0.65;

pub const MONTHS_PER_YEAR: f64 = 12.0;
