//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Row-level problems ([`ParseError`], [`CalculationError`]) are collected and
//! reported alongside partial results; [`EngineError`] covers the failures
//! that stop an operation outright.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cell value that could not be converted to the type its column requires.
///
/// # Example
///
/// ```
/// use payroll_engine::error::ParseError;
///
/// let error = ParseError {
///     row: 4,
///     column: "Haber Basico".to_string(),
///     value: "n/a".to_string(),
///     message: "not a monetary amount".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Row 4, column 'Haber Basico': cannot parse 'n/a' (not a monetary amount)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Row {row}, column '{column}': cannot parse '{value}' ({message})")]
pub struct ParseError {
    /// The 0-based index of the source row.
    pub row: usize,
    /// The raw column name the value came from.
    pub column: String,
    /// The offending cell content.
    pub value: String,
    /// A description of why the value was rejected.
    pub message: String,
}

/// A precondition violation found while calculating a single employee.
///
/// Calculation errors never abort a batch: the record is skipped and the
/// error is returned next to the successful results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Calculation failed for employee '{employee_id}' (row {row}): {message}")]
pub struct CalculationError {
    /// The identifier of the employee being calculated.
    pub employee_id: String,
    /// The 0-based index of the source row.
    pub row: usize,
    /// A description of the violated precondition.
    pub message: String,
}

/// The main error type for the Payroll Engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/ruleset.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/ruleset.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds inconsistent values.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// No formula table is effective on the requested date.
    #[error("No payroll rules effective on {date}")]
    RulesNotFound {
        /// The date for which rules were requested.
        date: NaiveDate,
    },

    /// Simulation parameters were rejected before the run started.
    #[error("Invalid simulation parameter '{field}': {message}")]
    InvalidParams {
        /// The parameter that was invalid.
        field: String,
        /// A description of what made it invalid.
        message: String,
    },

    /// A simulation was requested before any dataset was loaded.
    #[error("No dataset loaded in the current session")]
    NoDataLoaded,
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
