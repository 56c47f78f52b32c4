//! Column mapping from uploaded headers to canonical employee fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A canonical employee field an uploaded column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// Identity document number (CI) or employee id.
    Id,
    /// Full name.
    Name,
    /// Job title.
    JobTitle,
    /// Job level code.
    Level,
    /// Area or department.
    Area,
    /// Regional unit.
    Regional,
    /// Current basic pay.
    BasicPay,
    /// Current seniority bonus.
    SeniorityBonus,
    /// Other fixed bonuses; several columns may map here and are summed.
    OtherBonuses,
    /// Completed years of service.
    YearsOfService,
    /// Hire date.
    HireDate,
    /// Gender.
    Gender,
    /// Absence days in the period.
    AbsenceDays,
}

impl CanonicalField {
    /// Fields every record needs before it can be calculated.
    pub const REQUIRED: [CanonicalField; 3] = [
        CanonicalField::Id,
        CanonicalField::Level,
        CanonicalField::BasicPay,
    ];

    /// The field's snake_case name, as used in validation issues.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Id => "id",
            CanonicalField::Name => "name",
            CanonicalField::JobTitle => "job_title",
            CanonicalField::Level => "level",
            CanonicalField::Area => "area",
            CanonicalField::Regional => "regional",
            CanonicalField::BasicPay => "basic_pay",
            CanonicalField::SeniorityBonus => "seniority_bonus",
            CanonicalField::OtherBonuses => "other_bonuses",
            CanonicalField::YearsOfService => "years_of_service",
            CanonicalField::HireDate => "hire_date",
            CanonicalField::Gender => "gender",
            CanonicalField::AbsenceDays => "absence_days",
        }
    }
}

/// Maps raw column names to canonical fields.
///
/// Supplied by the column-detection layer; the engine never guesses.
///
/// # Example
///
/// ```
/// use payroll_engine::normalize::{CanonicalField, ColumnMapping};
///
/// let mapping = ColumnMapping::new()
///     .with("CI", CanonicalField::Id)
///     .with("Haber Basico", CanonicalField::BasicPay);
///
/// assert_eq!(mapping.columns_for(CanonicalField::BasicPay), vec!["Haber Basico"]);
/// assert!(mapping.columns_for(CanonicalField::Gender).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<String, CanonicalField>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw column, returning the mapping.
    pub fn with(mut self, column: &str, field: CanonicalField) -> Self {
        self.insert(column, field);
        self
    }

    /// Maps `column` to `field`, replacing any previous mapping of `column`.
    pub fn insert(&mut self, column: &str, field: CanonicalField) {
        self.columns.insert(column.to_string(), field);
    }

    /// Returns the raw columns mapped to `field`, in column-name order.
    pub fn columns_for(&self, field: CanonicalField) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, f)| **f == field)
            .map(|(column, _)| column.as_str())
            .collect()
    }

    /// Returns the required fields no column is mapped to.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        CanonicalField::REQUIRED
            .into_iter()
            .filter(|field| self.columns_for(*field).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_several_columns_for_other_bonuses() {
        let mapping = ColumnMapping::new()
            .with("Bono Produccion", CanonicalField::OtherBonuses)
            .with("Bono Frontera", CanonicalField::OtherBonuses);

        assert_eq!(
            mapping.columns_for(CanonicalField::OtherBonuses),
            vec!["Bono Frontera", "Bono Produccion"]
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let mapping = ColumnMapping::new().with("CI", CanonicalField::Id);
        assert_eq!(
            mapping.missing_required(),
            vec![CanonicalField::Level, CanonicalField::BasicPay]
        );
    }

    #[test]
    fn test_mapping_deserializes_from_object() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"CI": "id", "Nivel": "level"}"#).unwrap();
        assert_eq!(mapping.columns_for(CanonicalField::Level), vec!["Nivel"]);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(CanonicalField::BasicPay.as_str(), "basic_pay");
        assert_eq!(CanonicalField::HireDate.as_str(), "hire_date");
    }
}
