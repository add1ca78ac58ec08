//! Raw tabular input for batch evaluation.
//!
//! Uploaded tables arrive as rows of column name to raw cell value.  This
//! module decodes CSV uploads into [`RawRow`]s and normalises each row
//! into an [`EmployeeRecord`], applying the documented defaults for the
//! optional columns.

use crate::error::{BatchInputError, RowParseError};
use crate::models::{EmployeeRecord, EmployeeType, TerminationReason};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Columns every table must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    "employee_name",
    "joining_date",
    "leaving_date",
    "last_drawn_salary",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One row of an uploaded table.  Cells hold text or numbers; column
/// lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: BTreeMap<String, Value>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// Cell contents as trimmed text.  Blank cells and nulls read as
    /// absent.
    pub fn text(&self, column: &str) -> Option<String> {
        let text = match self.get(column)? {
            Value::Null => return None,
            Value::String(text) => text.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Normalises the row into an [`EmployeeRecord`].  Missing optional
    /// columns take their defaults; unrecognised values become
    /// `unknown`.  Semantic checks (date order, salary sign) are left to
    /// the evaluator.
    pub fn to_record(&self) -> Result<EmployeeRecord, RowParseError> {
        let employee_name = self
            .text("employee_name")
            .ok_or(RowParseError::MissingField("employee_name"))?;
        let joining_date = self.date("joining_date")?;
        let leaving_date = self.date("leaving_date")?;
        let raw_salary = self
            .text("last_drawn_salary")
            .ok_or(RowParseError::MissingField("last_drawn_salary"))?;
        let last_drawn_salary =
            parse_salary(&raw_salary).ok_or(RowParseError::InvalidSalary(raw_salary))?;

        Ok(EmployeeRecord {
            employee_name,
            joining_date,
            leaving_date,
            last_drawn_salary,
            employee_type: EmployeeType::from(self.text("employee_type")),
            termination_reason: TerminationReason::from(self.text("termination_reason")),
        })
    }

    fn date(&self, field: &'static str) -> Result<NaiveDate, RowParseError> {
        let raw = self.text(field).ok_or(RowParseError::MissingField(field))?;
        parse_date(&raw).ok_or(RowParseError::InvalidDate { field, value: raw })
    }
}

/// Parses ISO dates as well as the day-first layouts spreadsheet
/// exports produce.  A trailing midnight timestamp is tolerated.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
}

/// Parses an amount, ignoring thousands separators and a leading rupee
/// sign.
pub fn parse_salary(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// Table encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
}

/// Decides the upload format from the file name and content type.  A
/// file name extension takes precedence over the declared type.
pub fn detect_format(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<TableFormat, BatchInputError> {
    if let Some(name) = file_name.map(str::trim).filter(|name| !name.is_empty()) {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        return match extension.as_str() {
            "csv" => Ok(TableFormat::Csv),
            _ => Err(BatchInputError::UnsupportedFormat(name.to_string())),
        };
    }

    let mime = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match mime.as_str() {
        "" | "text/csv" | "application/csv" => Ok(TableFormat::Csv),
        other => Err(BatchInputError::UnsupportedFormat(other.to_string())),
    }
}

/// Decodes a CSV table.  The header must carry every required column
/// and be valid UTF-8; rows are returned in file order with raw text
/// cells.  Cells that are not valid UTF-8 (legacy spreadsheet encodings)
/// are decoded lossily so the row still reaches evaluation.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRow>, BatchInputError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_ascii_lowercase())
        .collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(BatchInputError::Empty);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BatchInputError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let cells = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| {
                let text = String::from_utf8_lossy(cell).into_owned();
                (header.clone(), Value::String(text))
            })
            .collect();
        rows.push(RawRow { cells });
    }

    if rows.is_empty() {
        return Err(BatchInputError::Empty);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_csv_with_mixed_case_headers() {
        let csv = "Employee_Name,Joining_Date,Leaving_Date,Last_Drawn_Salary,Employee_Type\n\
                   John Doe,2015-01-01,2023-01-01,25000,standard\n\
                   Jane Smith,2010-06-15,2023-01-01,\"35,000\",non-covered\n";
        let rows = parse_csv(csv.as_bytes()).expect("csv parses");
        assert_eq!(rows.len(), 2);

        let second = rows[1].to_record().expect("row normalises");
        assert_eq!(second.employee_name, "Jane Smith");
        assert_eq!(second.last_drawn_salary, Decimal::from(35_000));
        assert_eq!(second.employee_type, EmployeeType::NonCovered);
        assert_eq!(second.termination_reason, TerminationReason::Resignation);
    }

    #[test]
    fn reports_missing_required_columns() {
        let csv = "employee_name,leaving_date,last_drawn_salary\nJohn,2023-01-01,25000\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            BatchInputError::MissingColumns(vec!["joining_date".to_string()])
        );
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn header_only_table_is_empty() {
        let csv = "employee_name,joining_date,leaving_date,last_drawn_salary\n";
        assert_eq!(parse_csv(csv.as_bytes()).unwrap_err(), BatchInputError::Empty);
        assert_eq!(parse_csv(b"").unwrap_err(), BatchInputError::Empty);
    }

    #[test]
    fn non_utf8_cell_stays_a_row() {
        let mut csv = b"employee_name,joining_date,leaving_date,last_drawn_salary\n\
                        Asha,2015-01-01,2021-06-15,50000\n"
            .to_vec();
        // "Jos\xE9" as written by a Windows-1252 spreadsheet export.
        csv.extend_from_slice(b"Jos\xE9,2015-01-01,2023-01-01,25000\n");

        let rows = parse_csv(&csv).expect("csv parses");
        assert_eq!(rows.len(), 2);
        let record = rows[1].to_record().expect("row normalises");
        assert!(record.employee_name.starts_with("Jos"));
        assert_eq!(record.last_drawn_salary, Decimal::from(25_000));
    }

    #[test]
    fn non_utf8_header_is_unreadable() {
        let csv = b"employee_name,joining_date,leaving_date,last_drawn_salary,not\xE9\n\
                    Asha,2015-01-01,2021-06-15,50000,x\n";
        assert!(matches!(
            parse_csv(csv),
            Err(BatchInputError::Unreadable(_))
        ));
    }

    #[test]
    fn blank_lines_are_skipped_and_short_rows_kept() {
        let csv = "employee_name,joining_date,leaving_date,last_drawn_salary\n\
                   A,2015-01-01,2023-01-01,1000\n\
                   ,,,\n\
                   B,2015-01-01\n";
        let rows = parse_csv(csv.as_bytes()).expect("csv parses");
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1].to_record().unwrap_err(),
            RowParseError::MissingField("leaving_date")
        );
    }

    #[test]
    fn row_accepts_numbers_and_day_first_dates() {
        let row = RawRow::new()
            .with("EMPLOYEE_NAME", "Meera")
            .with("joining_date", "01/02/2012")
            .with("leaving_date", "2020-03-01 00:00:00")
            .with("last_drawn_salary", json!(42000.5));
        let record = row.to_record().expect("row normalises");
        assert_eq!(record.joining_date, date(2012, 2, 1));
        assert_eq!(record.leaving_date, date(2020, 3, 1));
        assert_eq!(record.last_drawn_salary, Decimal::from_str("42000.5").unwrap());
    }

    #[test]
    fn row_reports_unparseable_cells() {
        let row = RawRow::new()
            .with("employee_name", "Ravi")
            .with("joining_date", "2015-13-01")
            .with("leaving_date", "2020-01-01")
            .with("last_drawn_salary", "30000");
        assert!(matches!(
            row.to_record(),
            Err(RowParseError::InvalidDate { field: "joining_date", .. })
        ));

        let row = row.with("joining_date", "2015-01-01").with("last_drawn_salary", "thirty");
        assert_eq!(
            row.to_record().unwrap_err(),
            RowParseError::InvalidSalary("thirty".to_string())
        );
    }

    #[test]
    fn format_detection_prefers_file_name() {
        assert_eq!(detect_format(Some("staff.CSV"), None), Ok(TableFormat::Csv));
        assert_eq!(
            detect_format(Some("staff.csv"), Some("application/octet-stream")),
            Ok(TableFormat::Csv)
        );
        assert!(matches!(
            detect_format(Some("staff.xlsx"), Some("text/csv")),
            Err(BatchInputError::UnsupportedFormat(_))
        ));
        assert_eq!(
            detect_format(None, Some("text/csv; charset=utf-8")),
            Ok(TableFormat::Csv)
        );
        assert!(detect_format(None, Some("text/plain")).is_err());
    }
}
