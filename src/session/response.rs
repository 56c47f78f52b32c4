//! Report types handed to the export layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{AbsenceReport, EquityReport};
use crate::error::CalculationError;
use crate::models::{CalculatedEmployee, ComparisonSummary, SimulatedEmployee, SimulationParams};
use crate::validation::ValidationIssue;

/// One simulation run over the loaded dataset.
///
/// A run is immutable; a new simulation produces a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// When the run was produced.
    pub created_at: DateTime<Utc>,
    /// The policy the run was produced with.
    pub params: SimulationParams,
    /// Projected employees, in input order.
    pub employees: Vec<SimulatedEmployee>,
    /// Current vs. projected comparison.
    pub summary: ComparisonSummary,
    /// Records skipped because their current period could not be calculated.
    pub failures: Vec<CalculationError>,
}

/// Row counts for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Rows handed to the engine.
    pub rows_received: usize,
    /// Records that passed validation.
    pub records_valid: usize,
    /// Rows excluded by normalization or validation.
    pub records_failed: usize,
    /// Validation issues of any severity.
    pub issues: usize,
    /// Valid records whose calculation failed.
    pub calculation_failures: usize,
}

/// The full result of a one-shot analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Row counts.
    pub processing: ProcessingSummary,
    /// Validation issues, ordered by row.
    pub issues: Vec<ValidationIssue>,
    /// Current-period results.
    pub current: Vec<CalculatedEmployee>,
    /// Calculation failures.
    pub calculation_failures: Vec<CalculationError>,
    /// Simulation results, when parameters were supplied.
    pub simulation: Option<SimulationRun>,
    /// Pay equity analytics.
    pub equity: EquityReport,
    /// Absence analytics.
    pub absence: AbsenceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_summary_serialization() {
        let summary = ProcessingSummary {
            rows_received: 10,
            records_valid: 8,
            records_failed: 2,
            issues: 3,
            calculation_failures: 0,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"rows_received\":10"));
        assert!(json.contains("\"records_failed\":2"));
    }
}
