//! In-memory analysis session.
//!
//! Holds the loaded rule set, the currently loaded dataset and the current
//! simulation run. Loading a dataset or starting a simulation replaces
//! what was there before.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analytics::{AbsenceReport, EquityReport, absence_report, equity_report};
use crate::calculation::{DEFAULT_TOP_N, calculate_all, compare, simulate_all};
use crate::config::{ConfigLoader, PayrollConfig, RuleSet};
use crate::error::{CalculationError, EngineError, EngineResult};
use crate::models::{CalculatedEmployee, RawRow, SimulationParams};
use crate::normalize::{ColumnMapping, normalize_rows};
use crate::validation::{ValidationReport, Validator};

use super::response::{ProcessingSummary, SimulationRun};

/// A dataset that has been normalized, validated and calculated.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// The date the formulas and years of service were taken at.
    pub reference_date: NaiveDate,
    /// The calculation configuration in force on the reference date.
    pub payroll: PayrollConfig,
    /// Validation outcome, including the valid records.
    pub validation: ValidationReport,
    /// Current-period results for the valid records.
    pub calculated: Vec<CalculatedEmployee>,
    /// Valid records that could not be calculated.
    pub failures: Vec<CalculationError>,
}

impl LoadedDataset {
    /// Row counts for this dataset.
    pub fn processing_summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            rows_received: self.validation.rows_received,
            records_valid: self.validation.valid.len(),
            records_failed: self.validation.rejected_count(),
            issues: self.validation.issues.len(),
            calculation_failures: self.failures.len(),
        }
    }
}

/// A single-user analysis session.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    config: Arc<ConfigLoader>,
    top_n: usize,
    dataset: Option<LoadedDataset>,
    run: Option<SimulationRun>,
}

impl AnalysisSession {
    /// Creates a session over the given rule set.
    pub fn new(config: ConfigLoader) -> Self {
        Self::from_shared(Arc::new(config))
    }

    /// Creates a session sharing an already loaded rule set.
    pub fn from_shared(config: Arc<ConfigLoader>) -> Self {
        Self {
            config,
            top_n: DEFAULT_TOP_N,
            dataset: None,
            run: None,
        }
    }

    /// Sets the length of the top-impact ranking.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Returns the rule set.
    pub fn rules(&self) -> &RuleSet {
        self.config.rules()
    }

    /// Normalizes, validates and calculates a dataset, replacing the current one.
    ///
    /// Any previous simulation run is discarded. Row-level problems are
    /// reported in the dataset, never as an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RulesNotFound`] when no formula table is in
    /// force on `reference_date`.
    pub fn load_rows(
        &mut self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        reference_date: NaiveDate,
    ) -> EngineResult<&LoadedDataset> {
        let start = Instant::now();
        let payroll = self.config.payroll_config(reference_date)?;

        let missing = mapping.missing_required();
        if !missing.is_empty() {
            warn!(
                missing = ?missing.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
                "Column mapping lacks required fields"
            );
        }

        let batch = normalize_rows(rows, mapping);
        let validation = Validator::new(self.config.rules()).validate(batch);
        if validation.has_errors() {
            warn!(
                rejected = validation.rejected_count(),
                issues = validation.issues.len(),
                "Validation excluded records"
            );
        }

        let calculation = calculate_all(&validation.valid, &payroll);

        self.run = None;
        let dataset = self.dataset.insert(LoadedDataset {
            reference_date,
            payroll,
            validation,
            calculated: calculation.employees,
            failures: calculation.failures,
        });

        info!(
            rows = dataset.validation.rows_received,
            valid = dataset.validation.valid.len(),
            calculated = dataset.calculated.len(),
            reference_date = %reference_date,
            duration_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );

        Ok(&*dataset)
    }

    /// Returns the loaded dataset, if any.
    pub fn dataset(&self) -> Option<&LoadedDataset> {
        self.dataset.as_ref()
    }

    /// Runs a simulation over the loaded dataset, replacing the current run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParams`] for invalid parameters and
    /// [`EngineError::NoDataLoaded`] when no dataset is loaded.
    pub fn simulate(&mut self, params: SimulationParams) -> EngineResult<&SimulationRun> {
        params.validate()?;
        let dataset = self.dataset.as_ref().ok_or(EngineError::NoDataLoaded)?;

        let run_id = Uuid::new_v4();
        let start = Instant::now();
        let employees = simulate_all(&dataset.calculated, &params, &dataset.payroll);
        let summary = compare(&employees, self.top_n);

        info!(
            run_id = %run_id,
            employees = summary.employee_count,
            total_impact = %summary.total_impact,
            total_impact_pct = %summary.total_impact_pct,
            duration_ms = start.elapsed().as_millis() as u64,
            "Simulation run stored"
        );

        let run = SimulationRun {
            run_id,
            created_at: Utc::now(),
            params,
            employees,
            summary,
            failures: dataset.failures.clone(),
        };
        Ok(&*self.run.insert(run))
    }

    /// Returns the current simulation run, if any.
    pub fn current_run(&self) -> Option<&SimulationRun> {
        self.run.as_ref()
    }

    /// Pay equity analytics over the valid records.
    pub fn equity(&self) -> EngineResult<EquityReport> {
        let dataset = self.dataset.as_ref().ok_or(EngineError::NoDataLoaded)?;
        Ok(equity_report(&dataset.validation.valid))
    }

    /// Absence analytics over the valid records.
    pub fn absence(&self) -> EngineResult<AbsenceReport> {
        let dataset = self.dataset.as_ref().ok_or(EngineError::NoDataLoaded)?;
        Ok(absence_report(
            &dataset.validation.valid,
            self.config.rules().absence(),
        ))
    }

    /// Drops the loaded dataset and the current run.
    pub fn clear(&mut self) {
        self.dataset = None;
        self.run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, EligibleLevels};
    use crate::normalize::CanonicalField;
    use crate::validation::IssueKind;
    use rust_decimal::Decimal;

    fn session() -> AnalysisSession {
        let config = ConfigLoader::load("./config/bolivia").expect("Failed to load config");
        AnalysisSession::new(config)
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .with("CI", CanonicalField::Id)
            .with("Nivel", CanonicalField::Level)
            .with("Haber", CanonicalField::BasicPay)
    }

    fn row(id: &str, level: &str, pay: &str) -> RawRow {
        [
            ("CI".to_string(), CellValue::from(id)),
            ("Nivel".to_string(), CellValue::from(level)),
            ("Haber".to_string(), CellValue::from(pay)),
        ]
        .into_iter()
        .collect()
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn params() -> SimulationParams {
        SimulationParams {
            new_minimum_wage: Decimal::from(3200),
            government_pct: Decimal::from(5),
            company_pct: Decimal::from(3),
            eligible_levels: EligibleLevels::All,
        }
    }

    #[test]
    fn test_simulate_without_data_fails() {
        let mut session = session();
        assert!(matches!(
            session.simulate(params()),
            Err(EngineError::NoDataLoaded)
        ));
        assert!(matches!(session.equity(), Err(EngineError::NoDataLoaded)));
    }

    #[test]
    fn test_invalid_params_rejected_before_data_check() {
        let mut session = session();
        let mut p = params();
        p.new_minimum_wage = Decimal::ZERO;
        assert!(matches!(
            session.simulate(p),
            Err(EngineError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_load_then_simulate() {
        let mut session = session();
        let rows = vec![row("1", "N1", "3000"), row("2", "N9", "3000")];

        let dataset = session.load_rows(&rows, &mapping(), reference_date()).unwrap();
        assert_eq!(dataset.calculated.len(), 1);
        let summary = dataset.processing_summary();
        assert_eq!(summary.rows_received, 2);
        assert_eq!(summary.records_failed, 1);

        let run = session.simulate(params()).unwrap();
        assert_eq!(run.employees.len(), 1);
        assert_eq!(run.summary.percentage_increase_count, 1);
    }

    #[test]
    fn test_oversized_amount_is_reported_not_fatal() {
        let mut session = session();
        let rows = vec![
            row("1", "N1", "3000"),
            row("2", "N1", "50000000000000000000000000000"),
            row("3", "N2", "4000"),
        ];

        let dataset = session.load_rows(&rows, &mapping(), reference_date()).unwrap();
        assert_eq!(dataset.calculated.len(), 2);
        assert_eq!(dataset.validation.issues.len(), 1);
        assert_eq!(dataset.validation.issues[0].row, 1);
        assert_eq!(dataset.validation.issues[0].kind, IssueKind::AmountOutOfRange);

        let run = session.simulate(params()).unwrap();
        assert_eq!(run.employees.len(), 2);
        assert!(session.equity().is_ok());
    }

    #[test]
    fn test_new_run_replaces_previous() {
        let mut session = session();
        session
            .load_rows(&[row("1", "N1", "3000")], &mapping(), reference_date())
            .unwrap();

        let first = session.simulate(params()).unwrap().run_id;
        let second = session.simulate(params()).unwrap().run_id;

        assert_ne!(first, second);
        assert_eq!(session.current_run().unwrap().run_id, second);
    }

    #[test]
    fn test_loading_discards_run() {
        let mut session = session();
        session
            .load_rows(&[row("1", "N1", "3000")], &mapping(), reference_date())
            .unwrap();
        session.simulate(params()).unwrap();

        session
            .load_rows(&[row("2", "N2", "4000")], &mapping(), reference_date())
            .unwrap();
        assert!(session.current_run().is_none());
    }

    #[test]
    fn test_reference_date_without_rules() {
        let mut session = session();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(matches!(
            session.load_rows(&[], &mapping(), date),
            Err(EngineError::RulesNotFound { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut session = session();
        session
            .load_rows(&[row("1", "N1", "3000")], &mapping(), reference_date())
            .unwrap();
        session.clear();
        assert!(session.dataset().is_none());
    }
}
