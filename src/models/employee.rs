//! Employee model and raw upload types.
//!
//! This module defines the canonical [`Employee`] record produced by the
//! normalizer, and the [`CellValue`]/[`RawRow`] types handed over by the
//! ingestion layer.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cell as delivered by the CSV/Excel ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A numeric cell.
    Number(f64),
    /// A text cell (may still hold a currency-formatted amount).
    Text(String),
    /// An empty cell.
    Blank,
}

impl CellValue {
    /// Returns true for blank cells and text cells holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Renders the cell as trimmed text.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// One uploaded row: raw column name to cell value.
pub type RawRow = BTreeMap<String, CellValue>;

/// Gender as recorded in the upload, used by the equity analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Female.
    Female,
    /// Male.
    Male,
}

impl Gender {
    /// Parses the usual spreadsheet spellings ("F", "Femenino", "M", "Masculino", ...).
    ///
    /// Returns `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "f" | "fem" | "femenino" | "female" | "mujer" => Some(Gender::Female),
            "m" | "masc" | "masculino" | "male" | "hombre" => Some(Gender::Male),
            _ => None,
        }
    }
}

/// Represents an employee after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// The 0-based index of the source row.
    pub row: usize,
    /// Identity document number (CI) or other unique identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job title.
    pub job_title: String,
    /// Job level code; must belong to the configured level set.
    pub level: String,
    /// Area or department.
    pub area: String,
    /// Regional unit.
    pub regional: String,
    /// Current basic pay. `None` when the cell was blank.
    pub basic_pay: Option<Decimal>,
    /// Current seniority bonus as uploaded.
    pub seniority_bonus: Decimal,
    /// Other fixed bonuses.
    pub other_bonuses: Decimal,
    /// Completed years of service, when uploaded explicitly.
    pub years_of_service: Option<u32>,
    /// Hire date, when uploaded.
    pub hire_date: Option<NaiveDate>,
    /// Gender, when uploaded.
    pub gender: Option<Gender>,
    /// Absence days in the period.
    pub absence_days: Decimal,
    /// Set by the validator when another record shares this identifier.
    #[serde(default)]
    pub duplicate: bool,
}

impl Employee {
    /// Returns the completed years of service on `reference_date`.
    ///
    /// An explicit years-of-service value takes precedence over the hire date.
    /// Returns `None` when neither is known.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use chrono::NaiveDate;
    ///
    /// let mut employee = Employee::new(0, "1234567", "N1");
    /// employee.hire_date = NaiveDate::from_ymd_opt(2015, 7, 1);
    ///
    /// let reference = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    /// assert_eq!(employee.years_of_service_at(reference), Some(9));
    /// ```
    pub fn years_of_service_at(&self, reference_date: NaiveDate) -> Option<u32> {
        if let Some(years) = self.years_of_service {
            return Some(years);
        }
        let hired = self.hire_date?;
        let mut years = reference_date.year() - hired.year();
        if (reference_date.month(), reference_date.day()) < (hired.month(), hired.day()) {
            years -= 1;
        }
        Some(years.max(0) as u32)
    }

    /// Creates an employee with the given identity and every other field empty.
    pub fn new(row: usize, id: &str, level: &str) -> Self {
        Self {
            row,
            id: id.to_string(),
            name: String::new(),
            job_title: String::new(),
            level: level.to_string(),
            area: String::new(),
            regional: String::new(),
            basic_pay: None,
            seniority_bonus: Decimal::ZERO,
            other_bonuses: Decimal::ZERO,
            years_of_service: None,
            hire_date: None,
            gender: None,
            absence_days: Decimal::ZERO,
            duplicate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_cell_values() {
        let row: RawRow =
            serde_json::from_str(r#"{"CI": "4455667", "Haber": 3000.5, "Bono": null}"#).unwrap();
        assert_eq!(row["CI"], CellValue::Text("4455667".to_string()));
        assert_eq!(row["Haber"], CellValue::Number(3000.5));
        assert_eq!(row["Bono"], CellValue::Blank);
    }

    #[test]
    fn test_cell_is_blank() {
        assert!(CellValue::Blank.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from(0.0).is_blank());
    }

    #[test]
    fn test_integral_number_renders_without_fraction() {
        assert_eq!(CellValue::Number(4455667.0).as_text(), "4455667");
        assert_eq!(CellValue::Number(12.5).as_text(), "12.5");
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("F"), Some(Gender::Female));
        assert_eq!(Gender::parse(" Masculino "), Some(Gender::Male));
        assert_eq!(Gender::parse("x"), None);
    }

    #[test]
    fn test_years_of_service_before_anniversary() {
        let mut employee = Employee::new(0, "1", "N1");
        employee.hire_date = Some(date(2020, 7, 1));
        assert_eq!(employee.years_of_service_at(date(2025, 6, 30)), Some(4));
        assert_eq!(employee.years_of_service_at(date(2025, 7, 1)), Some(5));
    }

    #[test]
    fn test_explicit_years_take_precedence() {
        let mut employee = Employee::new(0, "1", "N1");
        employee.hire_date = Some(date(2020, 7, 1));
        employee.years_of_service = Some(12);
        assert_eq!(employee.years_of_service_at(date(2025, 6, 30)), Some(12));
    }

    #[test]
    fn test_future_hire_date_counts_as_zero_years() {
        let mut employee = Employee::new(0, "1", "N1");
        employee.hire_date = Some(date(2026, 1, 1));
        assert_eq!(employee.years_of_service_at(date(2025, 6, 30)), Some(0));
    }

    #[test]
    fn test_unknown_seniority() {
        let employee = Employee::new(0, "1", "N1");
        assert_eq!(employee.years_of_service_at(date(2025, 6, 30)), None);
    }

    #[test]
    fn test_serialize_employee() {
        let mut employee = Employee::new(3, "4455667", "N2");
        employee.basic_pay = Some(Decimal::new(300050, 2));
        let json = serde_json::to_string(&employee).unwrap();

        let deserialized: Employee = serde_json::from_str(&json).unwrap();
        assert_eq!(employee, deserialized);
        assert!(json.contains("\"basic_pay\":\"3000.50\""));
    }
}
