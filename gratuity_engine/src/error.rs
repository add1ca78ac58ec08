//! Error taxonomy for the engine.
//!
//! Ineligibility is not an error: it is a successful evaluation with a
//! zero payout.  The types here cover input that cannot be evaluated.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A record whose shape is invalid.  Reported per record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("employee_name must not be empty")]
    EmptyName,
    #[error("last_drawn_salary must be greater than zero (got {0})")]
    NonPositiveSalary(Decimal),
    #[error("leaving_date {leaving} must be after joining_date {joining}")]
    LeavingNotAfterJoining {
        joining: NaiveDate,
        leaving: NaiveDate,
    },
    #[error("gratuity for last_drawn_salary {0} exceeds the representable amount range")]
    AmountOutOfRange(Decimal),
}

/// A raw table row that could not be turned into an employee record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    #[error("{0} is missing")]
    MissingField(&'static str),
    #[error("{field} '{value}' is not a valid date")]
    InvalidDate { field: &'static str, value: String },
    #[error("last_drawn_salary '{0}' is not a number")]
    InvalidSalary(String),
}

/// A failure of the batch input as a whole.  Aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchInputError {
    #[error("no employee rows found")]
    Empty,
    #[error("unsupported file format '{0}': upload a CSV file")]
    UnsupportedFormat(String),
    #[error("unable to read table: {0}")]
    Unreadable(String),
    #[error("file is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

impl From<csv::Error> for BatchInputError {
    fn from(err: csv::Error) -> Self {
        Self::Unreadable(err.to_string())
    }
}
