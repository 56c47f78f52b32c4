//! Record normalization.
//!
//! Converts uploaded rows (column name to raw cell) into canonical
//! [`Employee`] records using a caller-supplied [`ColumnMapping`]. This is a
//! pure transform: parse failures are returned, never logged or thrown.

mod currency;
mod mapping;

pub use currency::{cell_to_date, cell_to_decimal, parse_currency};
pub use mapping::{CanonicalField, ColumnMapping};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::models::{CellValue, Employee, Gender, RawRow};

/// The outcome of normalizing a batch of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    /// Number of rows handed in.
    pub rows_received: usize,
    /// Rows that normalized without errors, in input order.
    pub employees: Vec<Employee>,
    /// Every parse failure, in row order.
    pub errors: Vec<ParseError>,
}

/// Normalizes a batch of rows, collecting every parse failure.
///
/// A row with at least one unparsable cell is left out of `employees`; all
/// of its errors are reported so the caller can show them at once.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{CellValue, RawRow};
/// use payroll_engine::normalize::{normalize_rows, CanonicalField, ColumnMapping};
///
/// let mapping = ColumnMapping::new()
///     .with("CI", CanonicalField::Id)
///     .with("Nivel", CanonicalField::Level)
///     .with("Haber", CanonicalField::BasicPay);
///
/// let mut good = RawRow::new();
/// good.insert("CI".to_string(), CellValue::from("4455667"));
/// good.insert("Nivel".to_string(), CellValue::from("N1"));
/// good.insert("Haber".to_string(), CellValue::from("Bs 3,000.00"));
///
/// let mut bad = good.clone();
/// bad.insert("Haber".to_string(), CellValue::from("tres mil"));
///
/// let batch = normalize_rows(&[good, bad], &mapping);
/// assert_eq!(batch.employees.len(), 1);
/// assert_eq!(batch.errors.len(), 1);
/// assert_eq!(batch.errors[0].row, 1);
/// ```
pub fn normalize_rows(rows: &[RawRow], mapping: &ColumnMapping) -> NormalizedBatch {
    let mut batch = NormalizedBatch {
        rows_received: rows.len(),
        ..NormalizedBatch::default()
    };

    for (index, row) in rows.iter().enumerate() {
        match normalize_row(index, row, mapping) {
            Ok(employee) => batch.employees.push(employee),
            Err(errors) => batch.errors.extend(errors),
        }
    }

    batch
}

/// Normalizes a single row.
///
/// Text fields are trimmed; blank optional text becomes `""`, blank optional
/// amounts become zero, and a blank basic pay stays `None`.
pub fn normalize_row(
    row_index: usize,
    row: &RawRow,
    mapping: &ColumnMapping,
) -> Result<Employee, Vec<ParseError>> {
    let mut reader = RowReader {
        row_index,
        row,
        mapping,
        errors: Vec::new(),
    };

    let mut employee = Employee::new(row_index, &reader.text(CanonicalField::Id), "");
    employee.name = reader.text(CanonicalField::Name);
    employee.job_title = reader.text(CanonicalField::JobTitle);
    employee.level = reader.text(CanonicalField::Level);
    employee.area = reader.text(CanonicalField::Area);
    employee.regional = reader.text(CanonicalField::Regional);
    employee.basic_pay = reader.amount(CanonicalField::BasicPay);
    employee.seniority_bonus = reader
        .amount(CanonicalField::SeniorityBonus)
        .unwrap_or(Decimal::ZERO);
    employee.other_bonuses = reader.summed_amount(CanonicalField::OtherBonuses);
    employee.years_of_service = reader.years(CanonicalField::YearsOfService);
    employee.hire_date = reader.date(CanonicalField::HireDate);
    employee.gender = Gender::parse(&reader.text(CanonicalField::Gender));
    employee.absence_days = reader
        .amount(CanonicalField::AbsenceDays)
        .unwrap_or(Decimal::ZERO);

    if reader.errors.is_empty() {
        Ok(employee)
    } else {
        Err(reader.errors)
    }
}

/// Reads mapped cells from one row, accumulating parse errors.
struct RowReader<'a> {
    row_index: usize,
    row: &'a RawRow,
    mapping: &'a ColumnMapping,
    errors: Vec<ParseError>,
}

impl RowReader<'_> {
    /// The first non-blank mapped cell for `field`, with its column name.
    fn cell(&self, field: CanonicalField) -> Option<(&str, &CellValue)> {
        self.mapping
            .columns_for(field)
            .into_iter()
            .filter_map(|column| self.row.get(column).map(|cell| (column, cell)))
            .find(|(_, cell)| !cell.is_blank())
    }

    fn fail(&mut self, column: &str, cell: &CellValue, message: String) {
        self.errors.push(ParseError {
            row: self.row_index,
            column: column.to_string(),
            value: cell.as_text(),
            message,
        });
    }

    fn text(&self, field: CanonicalField) -> String {
        self.cell(field)
            .map(|(_, cell)| cell.as_text())
            .unwrap_or_default()
    }

    fn amount(&mut self, field: CanonicalField) -> Option<Decimal> {
        let (column, cell) = self.cell(field)?;
        match cell_to_decimal(cell) {
            Ok(value) => value,
            Err(message) => {
                let (column, cell) = (column.to_string(), cell.clone());
                self.fail(&column, &cell, message);
                None
            }
        }
    }

    fn summed_amount(&mut self, field: CanonicalField) -> Decimal {
        let mut total = Decimal::ZERO;
        for column in self.mapping.columns_for(field) {
            let Some(cell) = self.row.get(column) else {
                continue;
            };
            match cell_to_decimal(cell) {
                Ok(value) => total += value.unwrap_or(Decimal::ZERO),
                Err(message) => self.errors.push(ParseError {
                    row: self.row_index,
                    column: column.to_string(),
                    value: cell.as_text(),
                    message,
                }),
            }
        }
        total
    }

    fn years(&mut self, field: CanonicalField) -> Option<u32> {
        let (column, cell) = self.cell(field)?;
        let (column, cell) = (column.to_string(), cell.clone());
        let value = match cell_to_decimal(&cell) {
            Ok(value) => value?,
            Err(message) => {
                self.fail(&column, &cell, message);
                return None;
            }
        };
        if value < Decimal::ZERO {
            self.fail(&column, &cell, "years of service cannot be negative".to_string());
            return None;
        }
        let years = value.trunc().to_u32();
        if years.is_none() {
            self.fail(&column, &cell, "years of service out of range".to_string());
        }
        years
    }

    fn date(&mut self, field: CanonicalField) -> Option<chrono::NaiveDate> {
        let (column, cell) = self.cell(field)?;
        match cell_to_date(cell) {
            Ok(value) => value,
            Err(message) => {
                let (column, cell) = (column.to_string(), cell.clone());
                self.fail(&column, &cell, message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .with("CI", CanonicalField::Id)
            .with("Nombre", CanonicalField::Name)
            .with("Cargo", CanonicalField::JobTitle)
            .with("Nivel", CanonicalField::Level)
            .with("Area", CanonicalField::Area)
            .with("Regional", CanonicalField::Regional)
            .with("Haber Basico", CanonicalField::BasicPay)
            .with("Bono Antiguedad", CanonicalField::SeniorityBonus)
            .with("Bono Produccion", CanonicalField::OtherBonuses)
            .with("Bono Frontera", CanonicalField::OtherBonuses)
            .with("Fecha Ingreso", CanonicalField::HireDate)
            .with("Sexo", CanonicalField::Gender)
            .with("Faltas", CanonicalField::AbsenceDays)
    }

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(column, cell)| (column.to_string(), cell.clone()))
            .collect()
    }

    fn full_row() -> RawRow {
        row(&[
            ("CI", CellValue::Number(4455667.0)),
            ("Nombre", CellValue::from("  Ana Pérez ")),
            ("Cargo", CellValue::from("Analista")),
            ("Nivel", CellValue::from("N3")),
            ("Area", CellValue::from("Finanzas")),
            ("Regional", CellValue::from("La Paz")),
            ("Haber Basico", CellValue::from("Bs 4.500,00")),
            ("Bono Antiguedad", CellValue::Number(412.5)),
            ("Bono Produccion", CellValue::from("200")),
            ("Bono Frontera", CellValue::from("150,50")),
            ("Fecha Ingreso", CellValue::from("01/07/2015")),
            ("Sexo", CellValue::from("F")),
            ("Faltas", CellValue::from("2")),
        ])
    }

    #[test]
    fn test_full_row_normalizes() {
        let employee = normalize_row(0, &full_row(), &mapping()).unwrap();

        assert_eq!(employee.id, "4455667");
        assert_eq!(employee.name, "Ana Pérez");
        assert_eq!(employee.level, "N3");
        assert_eq!(employee.basic_pay, Some(dec("4500.00")));
        assert_eq!(employee.seniority_bonus, dec("412.5"));
        assert_eq!(employee.other_bonuses, dec("350.50"));
        assert_eq!(employee.hire_date, NaiveDate::from_ymd_opt(2015, 7, 1));
        assert_eq!(employee.gender, Some(Gender::Female));
        assert_eq!(employee.absence_days, dec("2"));
    }

    #[test]
    fn test_blank_optional_fields_default() {
        let raw = row(&[
            ("CI", CellValue::from("123")),
            ("Nivel", CellValue::from("N1")),
            ("Haber Basico", CellValue::from("3000")),
            ("Bono Antiguedad", CellValue::Blank),
        ]);
        let employee = normalize_row(5, &raw, &mapping()).unwrap();

        assert_eq!(employee.row, 5);
        assert_eq!(employee.name, "");
        assert_eq!(employee.seniority_bonus, Decimal::ZERO);
        assert_eq!(employee.other_bonuses, Decimal::ZERO);
        assert_eq!(employee.hire_date, None);
        assert_eq!(employee.gender, None);
    }

    #[test]
    fn test_blank_basic_pay_stays_none() {
        let raw = row(&[
            ("CI", CellValue::from("123")),
            ("Nivel", CellValue::from("N1")),
            ("Haber Basico", CellValue::from("   ")),
        ]);
        let employee = normalize_row(0, &raw, &mapping()).unwrap();
        assert_eq!(employee.basic_pay, None);
    }

    #[test]
    fn test_unparsable_cells_report_row_and_column() {
        let mut raw = full_row();
        raw.insert("Haber Basico".to_string(), CellValue::from("tres mil"));
        raw.insert("Fecha Ingreso".to_string(), CellValue::from("ayer"));

        let errors = normalize_row(7, &raw, &mapping()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.row == 7));
        assert!(errors.iter().any(|e| e.column == "Haber Basico" && e.value == "tres mil"));
        assert!(errors.iter().any(|e| e.column == "Fecha Ingreso"));
    }

    #[test]
    fn test_negative_years_rejected() {
        let mapping = mapping().with("Antiguedad", CanonicalField::YearsOfService);
        let mut raw = full_row();
        raw.insert("Antiguedad".to_string(), CellValue::Number(-2.0));

        let errors = normalize_row(0, &raw, &mapping).unwrap_err();
        assert_eq!(errors[0].column, "Antiguedad");
    }

    #[test]
    fn test_fractional_years_truncate() {
        let mapping = mapping().with("Antiguedad", CanonicalField::YearsOfService);
        let mut raw = full_row();
        raw.insert("Antiguedad".to_string(), CellValue::Number(7.9));

        let employee = normalize_row(0, &raw, &mapping).unwrap();
        assert_eq!(employee.years_of_service, Some(7));
    }

    #[test]
    fn test_unmapped_columns_are_ignored() {
        let mut raw = full_row();
        raw.insert("Observaciones".to_string(), CellValue::from("???"));
        assert!(normalize_row(0, &raw, &mapping()).is_ok());
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let mut second = full_row();
        second.insert("CI".to_string(), CellValue::from("999"));
        let batch = normalize_rows(&[full_row(), second], &mapping());

        assert_eq!(batch.rows_received, 2);
        assert_eq!(batch.employees[0].id, "4455667");
        assert_eq!(batch.employees[1].id, "999");
        assert_eq!(batch.employees[1].row, 1);
        assert!(batch.errors.is_empty());
    }
}
