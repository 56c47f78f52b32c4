//! One-shot analysis over a serde request.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};

use super::request::AnalysisRequest;
use super::response::AnalysisReport;
use super::state::AnalysisSession;

/// Runs the whole pipeline: normalize, validate, calculate, optionally
/// simulate, then compute the analytics.
///
/// # Errors
///
/// Fails only for problems that stop the run outright: no formula table
/// for the reference date, or invalid simulation parameters. Row-level
/// problems are reported inside the [`AnalysisReport`].
pub fn analyze(config: Arc<ConfigLoader>, request: AnalysisRequest) -> EngineResult<AnalysisReport> {
    let correlation_id = Uuid::new_v4();
    let start = Instant::now();
    info!(
        correlation_id = %correlation_id,
        rows = request.rows.len(),
        simulate = request.params.is_some(),
        "Processing analysis request"
    );

    let mut session = AnalysisSession::from_shared(config).with_top_n(request.top_n);

    let processing = session
        .load_rows(&request.rows, &request.mapping, request.reference_date)
        .inspect_err(|err| warn!(correlation_id = %correlation_id, error = %err, "Load failed"))?
        .processing_summary();

    let simulation = match request.params {
        Some(params) => Some(
            session
                .simulate(params)
                .inspect_err(|err| {
                    warn!(correlation_id = %correlation_id, error = %err, "Simulation rejected")
                })?
                .clone(),
        ),
        None => None,
    };

    let equity = session.equity()?;
    let absence = session.absence()?;
    let dataset = session.dataset().ok_or(EngineError::NoDataLoaded)?;

    info!(
        correlation_id = %correlation_id,
        rows_received = processing.rows_received,
        records_valid = processing.records_valid,
        records_failed = processing.records_failed,
        duration_ms = start.elapsed().as_millis() as u64,
        "Analysis completed"
    );

    Ok(AnalysisReport {
        processing,
        issues: dataset.validation.issues.clone(),
        current: dataset.calculated.clone(),
        calculation_failures: dataset.failures.clone(),
        simulation,
        equity,
        absence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, EligibleLevels, RawRow, SimulationParams};
    use crate::normalize::{CanonicalField, ColumnMapping};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn config() -> Arc<ConfigLoader> {
        Arc::new(ConfigLoader::load("./config/bolivia").expect("Failed to load config"))
    }

    fn request(params: Option<SimulationParams>) -> AnalysisRequest {
        let rows: Vec<RawRow> = vec![
            [
                ("CI".to_string(), CellValue::from("100")),
                ("Nivel".to_string(), CellValue::from("N1")),
                ("Haber".to_string(), CellValue::Number(3000.0)),
            ]
            .into_iter()
            .collect(),
            [
                ("CI".to_string(), CellValue::from("101")),
                ("Nivel".to_string(), CellValue::from("N2")),
                ("Haber".to_string(), CellValue::from("sin dato")),
            ]
            .into_iter()
            .collect(),
        ];
        AnalysisRequest {
            rows,
            mapping: ColumnMapping::new()
                .with("CI", CanonicalField::Id)
                .with("Nivel", CanonicalField::Level)
                .with("Haber", CanonicalField::BasicPay),
            reference_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            params,
            top_n: 5,
        }
    }

    #[test]
    fn test_analysis_without_simulation() {
        let report = analyze(config(), request(None)).unwrap();

        assert_eq!(report.processing.rows_received, 2);
        assert_eq!(report.processing.records_valid, 1);
        assert_eq!(report.processing.records_failed, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.current.len(), 1);
        assert!(report.simulation.is_none());
        assert_eq!(report.equity.by_level.len(), 1);
    }

    #[test]
    fn test_analysis_with_simulation() {
        let params = SimulationParams {
            new_minimum_wage: Decimal::from(3200),
            government_pct: Decimal::from(5),
            company_pct: Decimal::from(3),
            eligible_levels: EligibleLevels::only(["N1"]),
        };
        let report = analyze(config(), request(Some(params))).unwrap();

        let run = report.simulation.unwrap();
        assert_eq!(run.employees.len(), 1);
        assert_eq!(run.employees[0].projected.basic_pay, Decimal::from(3240));
        assert_eq!(run.summary.top_impact.len(), 1);
    }

    #[test]
    fn test_invalid_params_fail_the_analysis() {
        let params = SimulationParams {
            new_minimum_wage: Decimal::from(3200),
            government_pct: Decimal::from(-1),
            company_pct: Decimal::ZERO,
            eligible_levels: EligibleLevels::All,
        };
        assert!(matches!(
            analyze(config(), request(Some(params))),
            Err(EngineError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_report_serializes() {
        let report = analyze(config(), request(None)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["processing"]["records_valid"], 1);
        assert_eq!(json["issues"][0]["kind"], "non_numeric");
    }
}
