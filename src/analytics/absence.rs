//! Absence analytics per area.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_money;
use crate::config::AbsenceSettings;
use crate::models::Employee;

/// Area label used for employees with a blank area.
pub const UNASSIGNED_AREA: &str = "Sin área";

/// Absence figures for a group of employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceStats {
    /// Employees in the group.
    pub headcount: usize,
    /// Sum of absence days.
    pub absence_days: Decimal,
    /// `absence_days / (headcount * working_days) * 100`.
    pub absence_rate: Decimal,
}

impl AbsenceStats {
    fn from_days(headcount: usize, absence_days: Decimal, working_days: u32) -> Self {
        let capacity = Decimal::from(headcount) * Decimal::from(working_days);
        let absence_rate = if capacity.is_zero() {
            Decimal::ZERO
        } else {
            round_money(absence_days / capacity * Decimal::ONE_HUNDRED)
        };
        Self {
            headcount,
            absence_days,
            absence_rate,
        }
    }
}

/// Absence figures for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaAbsence {
    /// Area name.
    pub area: String,
    /// The area's figures.
    pub stats: AbsenceStats,
}

/// An employee above the high-absence threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighAbsenceEmployee {
    /// The 0-based index of the source row.
    pub row: usize,
    /// Employee identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Area name.
    pub area: String,
    /// Absence days in the period.
    pub absence_days: Decimal,
}

/// Absence analytics over a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceReport {
    /// Figures over every employee.
    pub overall: AbsenceStats,
    /// Per-area figures, ordered by area name.
    pub by_area: Vec<AreaAbsence>,
    /// Employees with more absence days than the threshold, most absent first.
    pub high_absence: Vec<HighAbsenceEmployee>,
    /// The threshold applied.
    pub threshold_days: Decimal,
}

fn area_of(employee: &Employee) -> &str {
    if employee.area.is_empty() {
        UNASSIGNED_AREA
    } else {
        &employee.area
    }
}

/// Computes absence analytics.
pub fn absence_report(employees: &[Employee], settings: &AbsenceSettings) -> AbsenceReport {
    let working_days = settings.working_days_per_period;
    let mut areas: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for employee in employees {
        let entry = areas.entry(area_of(employee)).or_default();
        entry.0 += 1;
        entry.1 += employee.absence_days;
    }

    let total_days: Decimal = employees.iter().map(|e| e.absence_days).sum();

    let mut high_absence: Vec<HighAbsenceEmployee> = employees
        .iter()
        .filter(|e| e.absence_days > settings.high_absence_threshold_days)
        .map(|e| HighAbsenceEmployee {
            row: e.row,
            id: e.id.clone(),
            name: e.name.clone(),
            area: area_of(e).to_string(),
            absence_days: e.absence_days,
        })
        .collect();
    high_absence.sort_by(|a, b| b.absence_days.cmp(&a.absence_days));

    AbsenceReport {
        overall: AbsenceStats::from_days(employees.len(), total_days, working_days),
        by_area: areas
            .into_iter()
            .map(|(area, (headcount, days))| AreaAbsence {
                area: area.to_string(),
                stats: AbsenceStats::from_days(headcount, days, working_days),
            })
            .collect(),
        high_absence,
        threshold_days: settings.high_absence_threshold_days,
    }
}
