//! Analysis session for the Payroll Engine.
//!
//! This module holds the in-memory session state, the serde request and
//! report types consumed by the export layer, and the one-shot pipeline.

mod pipeline;
mod request;
mod response;
mod state;

pub use pipeline::analyze;
pub use request::AnalysisRequest;
pub use response::{AnalysisReport, ProcessingSummary, SimulationRun};
pub use state::{AnalysisSession, LoadedDataset};
