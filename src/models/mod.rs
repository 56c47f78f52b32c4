//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employee;
mod simulation;
mod summary;

pub use calculation_result::{
    AuditStep, CalculatedEmployee, PayBreakdown, ProvisionLine, SeniorityBasis,
};
pub use employee::{CellValue, Employee, Gender, RawRow};
pub use simulation::{
    ALL_LEVELS, EligibleLevels, IncreaseMechanism, PayVariation, SimulatedEmployee,
    SimulationParams, Variation,
};
pub use summary::{ComparisonSummary, CostTotals, ImpactEntry, LevelBreakdown};
