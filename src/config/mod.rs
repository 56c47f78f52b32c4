//! Configuration loading and management for the Payroll Engine.
//!
//! Payroll rules change by jurisdiction and year, so seniority tiers and
//! provision rates live in effective-dated YAML formula tables rather than
//! in code. The only built-in default is the employer-charge rate.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/bolivia").unwrap();
//! println!("Loaded rule set: {}", loader.rules().metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AbsenceSettings, DEFAULT_EMPLOYER_CHARGE_RATE, DEFAULT_MAX_AMOUNT, DuplicatePolicy,
    FormulaTable, JobLevel, PayrollConfig, ProvisionRule, RuleSet, RuleSetFile, RuleSetMetadata,
    SeniorityBase, SeniorityRule, SeniorityTier,
};
