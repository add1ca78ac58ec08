//! Gratuity evaluation engine.
//!
//! The `engine` module turns an [`EmployeeRecord`] into a
//! [`CalculationResult`] and a table of [`RawRow`]s into a
//! [`BatchResult`].  Batch rows are independent, so they are evaluated
//! in parallel with the [`rayon`] crate; collecting an indexed parallel
//! iterator keeps the output in input order.  Payout formulas are
//! delegated to implementations of the [`GratuityFormula`] trait.
//!
//! [`GratuityFormula`]: crate::rules::GratuityFormula

use crate::error::{BatchInputError, ValidationError};
use crate::models::{
    BatchResult, BatchRowError, CalculationResult, EmployeeRecord, EmployeeType, RowOutcome,
    TerminationReason,
};
use crate::rules::{formula_for, ServicePeriod, MIN_QUALIFYING_YEARS};
use crate::table::RawRow;
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Evaluates one employee.
///
/// Returns a [`ValidationError`] when the record cannot be evaluated.
/// An employee who does not qualify is a successful evaluation with
/// `is_eligible == false` and a zero amount.
pub fn evaluate(record: &EmployeeRecord) -> Result<CalculationResult, ValidationError> {
    if record.employee_name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if record.last_drawn_salary <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveSalary(record.last_drawn_salary));
    }
    let period = ServicePeriod::between(record.joining_date, record.leaving_date).ok_or(
        ValidationError::LeavingNotAfterJoining {
            joining: record.joining_date,
            leaving: record.leaving_date,
        },
    )?;

    let years_of_service = period.rounded_years();
    let meets_tenure = years_of_service >= MIN_QUALIFYING_YEARS;
    let is_eligible = meets_tenure || record.termination_reason.waives_minimum_service();

    let mut notes = Vec::new();
    if record.employee_type == EmployeeType::Unknown {
        notes.push("Unrecognised employee type; calculated as a standard employee".to_string());
    }
    if record.termination_reason == TerminationReason::Unknown {
        notes.push(
            "Unrecognised termination reason; the minimum service requirement applies"
                .to_string(),
        );
    }

    let (gratuity_amount, formula) = if is_eligible {
        let formula = formula_for(record.employee_type);
        if !meets_tenure {
            notes.push(format!(
                "Minimum service requirement of {MIN_QUALIFYING_YEARS} years waived on {}",
                record.termination_reason
            ));
        }
        let amount = formula
            .amount(record.last_drawn_salary, years_of_service)
            .ok_or(ValidationError::AmountOutOfRange(record.last_drawn_salary))?;
        (amount, Some(formula.description().to_string()))
    } else {
        notes.push(format!(
            "Employee has not completed {MIN_QUALIFYING_YEARS} years of continuous service"
        ));
        notes.push(format!("{years_of_service} years counted"));
        (Decimal::new(0, 2), None)
    };

    Ok(CalculationResult {
        employee_name: record.employee_name.trim().to_string(),
        joining_date: record.joining_date,
        leaving_date: record.leaving_date,
        last_drawn_salary: record.last_drawn_salary,
        employee_type: record.employee_type,
        termination_reason: record.termination_reason,
        years_of_service,
        gratuity_amount,
        is_eligible,
        formula,
        message: (!notes.is_empty()).then(|| notes.join("; ")),
    })
}

/// Evaluates a table of raw rows.
///
/// Every row appears in the output at its input position.  Rows that
/// cannot be parsed or fail validation are reported inline and excluded
/// from the eligible/ineligible counts; only an empty table fails the
/// batch as a whole.
pub fn evaluate_batch(rows: &[RawRow]) -> Result<BatchResult, BatchInputError> {
    if rows.is_empty() {
        return Err(BatchInputError::Empty);
    }

    let outcomes: Vec<RowOutcome> = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| evaluate_row(index + 1, row))
        .collect();

    let batch = BatchResult::from_outcomes(outcomes);
    info!(
        rows = rows.len(),
        eligible = batch.eligible_count,
        ineligible = batch.ineligible_count,
        errors = batch.error_count,
        total = %batch.total_gratuity_amount,
        "batch evaluated"
    );
    Ok(batch)
}

fn evaluate_row(position: usize, row: &RawRow) -> RowOutcome {
    let outcome = row
        .to_record()
        .map_err(|err| err.to_string())
        .and_then(|record| evaluate(&record).map_err(|err| err.to_string()));

    match outcome {
        Ok(result) => RowOutcome::from_result(result),
        Err(message) => {
            debug!(row = position, %message, "batch row rejected");
            RowOutcome::Error(BatchRowError {
                row: position,
                employee_name: row.text("employee_name"),
                message,
            })
        }
    }
}
