//! Payroll Engine for minimum-wage increase analysis
//!
//! This crate normalizes and validates uploaded employee compensation rows,
//! calculates current-period payroll costs (seniority bonus, employer
//! charges, provisions), simulates salary increments against a new minimum
//! wage, and aggregates current vs. projected cost structures together with
//! equity and absence analytics.

#![warn(missing_docs)]

pub mod analytics;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod session;
pub mod validation;
