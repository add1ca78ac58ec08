//! Statutory rules: service-period arithmetic and payout formulas.
//!
//! The `rules` module defines the [`GratuityFormula`] trait, which each
//! employee category implements, and [`ServicePeriod`], the calendar
//! difference between joining and leaving that determines the years of
//! service counted towards eligibility and payout.

use crate::models::EmployeeType;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Years of service required before gratuity becomes payable.
pub const MIN_QUALIFYING_YEARS: u32 = 5;

/// Days of wages credited for each counted year of service.
pub const DAYS_PER_YEAR: u32 = 15;

/// A remainder of this many months or more counts as a full year.
pub const ROUND_UP_MONTHS: u32 = 6;

/// Calendar difference between two dates, as whole years, months and
/// days.  Month arithmetic clamps to the last day of shorter months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePeriod {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl ServicePeriod {
    /// Returns `None` unless `leaving` falls strictly after `joining`.
    pub fn between(joining: NaiveDate, leaving: NaiveDate) -> Option<Self> {
        if leaving <= joining {
            return None;
        }

        let span = (leaving.year() - joining.year()) * 12 + leaving.month() as i32
            - joining.month() as i32;
        let mut months = u32::try_from(span).ok()?;
        let mut anchor = joining.checked_add_months(Months::new(months))?;
        // The anchor lands past `leaving` when the leaving day-of-month
        // is earlier than the joining one.
        while anchor > leaving && months > 0 {
            months -= 1;
            anchor = joining.checked_add_months(Months::new(months))?;
        }
        let days = u32::try_from((leaving - anchor).num_days()).ok()?;

        Some(Self {
            years: months / 12,
            months: months % 12,
            days,
        })
    }

    /// Whole years counted for gratuity.
    pub fn rounded_years(&self) -> u32 {
        if self.months >= ROUND_UP_MONTHS {
            self.years + 1
        } else {
            self.years
        }
    }
}

/// A payout formula determines the gratuity for a salary and a number
/// of counted years.  Each employee category provides its own divisor.
///
/// Formulas must be thread-safe (`Send + Sync`) because batch rows are
/// evaluated concurrently.
pub trait GratuityFormula: Send + Sync {
    /// Working days assumed per month.
    fn divisor(&self) -> u32;

    /// Human-readable description of the formula.
    fn description(&self) -> &'static str;

    /// `salary × years × 15 / divisor`, rounded half-up and expressed
    /// with exactly two decimals.  `None` when an intermediate product
    /// exceeds the range of [`Decimal`].
    fn amount(&self, salary: Decimal, years: u32) -> Option<Decimal> {
        let raw = salary
            .checked_mul(Decimal::from(years))?
            .checked_mul(Decimal::from(DAYS_PER_YEAR))?
            .checked_div(Decimal::from(self.divisor()))?;
        let mut amount = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        Some(amount)
    }
}

/// Formula for employees covered by the statute.
pub struct StandardFormula;

impl GratuityFormula for StandardFormula {
    fn divisor(&self) -> u32 {
        26
    }

    fn description(&self) -> &'static str {
        "15/26 × last drawn salary × years of service"
    }
}

/// Formula for employees outside the statute.
pub struct NonCoveredFormula;

impl GratuityFormula for NonCoveredFormula {
    fn divisor(&self) -> u32 {
        30
    }

    fn description(&self) -> &'static str {
        "15/30 × last drawn salary × years of service"
    }
}

/// Selects the formula for an employee category.  Unrecognised
/// categories are calculated as standard.
pub fn formula_for(employee_type: EmployeeType) -> &'static dyn GratuityFormula {
    match employee_type {
        EmployeeType::NonCovered => &NonCoveredFormula,
        EmployeeType::Standard | EmployeeType::Unknown => &StandardFormula,
    }
}
