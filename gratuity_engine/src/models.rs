//! Data models for the Gratuity Engine.
//!
//! The `models` module defines the serialisable records exchanged with
//! the engine: the employee record submitted for evaluation, the
//! per-record calculation result, and the aggregate returned for a
//! batch.  Monetary values use [`Decimal`] so that the half-up rounding
//! applied to payouts is exact; they serialise as strings
//! (`"173076.92"`).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statutory category of an employee.  The category selects the
/// divisor used by the gratuity formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum EmployeeType {
    /// Covered by the gratuity statute (15/26 formula).
    #[default]
    Standard,
    /// Not covered by the statute (15/30 formula).
    NonCovered,
    /// A value was supplied but not recognised.
    Unknown,
}

impl EmployeeType {
    /// Normalises a free-form label.  Empty input falls back to the
    /// default; anything unrecognised becomes [`EmployeeType::Unknown`].
    pub fn from_label(raw: &str) -> Self {
        match normalize_label(raw).as_str() {
            "" | "standard" => Self::Standard,
            "non_covered" | "noncovered" => Self::NonCovered,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::NonCovered => "non_covered",
            Self::Unknown => "unknown",
        }
    }
}

impl From<Option<String>> for EmployeeType {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::from_label).unwrap_or_default()
    }
}

impl fmt::Display for EmployeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why the employment ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum TerminationReason {
    #[default]
    Resignation,
    Retirement,
    Death,
    Disability,
    /// A value was supplied but not recognised.
    Unknown,
}

impl TerminationReason {
    /// Normalises a free-form label.  Empty input falls back to the
    /// default; anything unrecognised becomes
    /// [`TerminationReason::Unknown`].
    pub fn from_label(raw: &str) -> Self {
        match normalize_label(raw).as_str() {
            "" | "resignation" => Self::Resignation,
            "retirement" => Self::Retirement,
            "death" => Self::Death,
            "disability" | "disablement" => Self::Disability,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Resignation => "resignation",
            Self::Retirement => "retirement",
            Self::Death => "death",
            Self::Disability => "disability",
            Self::Unknown => "unknown",
        }
    }

    /// Death and disability make the employee eligible irrespective of
    /// tenure.
    pub fn waives_minimum_service(&self) -> bool {
        matches!(self, Self::Death | Self::Disability)
    }
}

impl From<Option<String>> for TerminationReason {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::from_label).unwrap_or_default()
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// An employee submitted for gratuity evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// The employee's full name.  Must not be blank.
    pub employee_name: String,
    /// First day of service.
    pub joining_date: NaiveDate,
    /// Last day of service.  Must fall strictly after `joining_date`.
    pub leaving_date: NaiveDate,
    /// Last drawn monthly salary (basic plus dearness allowance).  Must
    /// be positive.
    pub last_drawn_salary: Decimal,
    #[serde(default)]
    pub employee_type: EmployeeType,
    #[serde(default)]
    pub termination_reason: TerminationReason,
}

/// The outcome of evaluating one [`EmployeeRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub employee_name: String,
    pub joining_date: NaiveDate,
    pub leaving_date: NaiveDate,
    pub last_drawn_salary: Decimal,
    pub employee_type: EmployeeType,
    pub termination_reason: TerminationReason,
    /// Completed years, with a remainder of six months or more counted
    /// as a full year.
    pub years_of_service: u32,
    /// Payable amount rounded to two decimals; zero when ineligible.
    pub gratuity_amount: Decimal,
    pub is_eligible: bool,
    /// The formula applied, present only for eligible results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Explanation of ineligibility, waived requirements or corrected
    /// input.
    pub message: Option<String>,
}

/// A batch row that never reached a [`CalculationResult`], either
/// because it could not be parsed or because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRowError {
    /// One-based position of the row in the submitted table.
    pub row: usize,
    /// Echo of the name column when one was readable.
    pub employee_name: Option<String>,
    pub message: String,
}

/// Per-row entry of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Eligible(CalculationResult),
    Ineligible(CalculationResult),
    Error(BatchRowError),
}

impl RowOutcome {
    pub fn from_result(result: CalculationResult) -> Self {
        if result.is_eligible {
            Self::Eligible(result)
        } else {
            Self::Ineligible(result)
        }
    }

    /// The calculation, if the row reached one.
    pub fn result(&self) -> Option<&CalculationResult> {
        match self {
            Self::Eligible(result) | Self::Ineligible(result) => Some(result),
            Self::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// The aggregate result of a batch evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// One entry per submitted row, in submission order.
    pub results: Vec<RowOutcome>,
    /// Sum of `gratuity_amount` over eligible rows.
    pub total_gratuity_amount: Decimal,
    pub eligible_count: usize,
    pub ineligible_count: usize,
    /// Rows reported inline as errors.  Excluded from both counts above.
    pub error_count: usize,
}

impl BatchResult {
    /// Builds the aggregate from ordered row outcomes.  An eligible row
    /// whose amount would push the total out of range is reported as a
    /// row error instead.
    pub fn from_outcomes(mut results: Vec<RowOutcome>) -> Self {
        let mut total_gratuity_amount = Decimal::new(0, 2);
        let mut eligible_count = 0;
        let mut ineligible_count = 0;
        let mut error_count = 0;

        for (index, outcome) in results.iter_mut().enumerate() {
            match outcome {
                RowOutcome::Eligible(result) => {
                    match total_gratuity_amount.checked_add(result.gratuity_amount) {
                        Some(total) => {
                            total_gratuity_amount = total;
                            eligible_count += 1;
                        }
                        None => {
                            let employee_name = Some(result.employee_name.clone());
                            *outcome = RowOutcome::Error(BatchRowError {
                                row: index + 1,
                                employee_name,
                                message: "gratuity_amount pushes the batch total out of range"
                                    .to_string(),
                            });
                            error_count += 1;
                        }
                    }
                }
                RowOutcome::Ineligible(_) => ineligible_count += 1,
                RowOutcome::Error(_) => error_count += 1,
            }
        }

        Self {
            results,
            total_gratuity_amount,
            eligible_count,
            ineligible_count,
            error_count,
        }
    }
}
