//! Request types for a one-shot analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::DEFAULT_TOP_N;
use crate::models::{RawRow, SimulationParams};
use crate::normalize::ColumnMapping;

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Everything needed to run the pipeline over an uploaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Uploaded rows, as parsed by the ingestion layer.
    pub rows: Vec<RawRow>,
    /// Raw column name to canonical field.
    pub mapping: ColumnMapping,
    /// Date selecting the formula table and measuring years of service.
    pub reference_date: NaiveDate,
    /// Simulation policy; no simulation is run when absent.
    #[serde(default)]
    pub params: Option<SimulationParams>,
    /// Length of the top-impact ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}
