//! Calculation logic for the Payroll Engine.
//!
//! This module contains the current-period payroll calculation (seniority
//! bonus, employer charges, provisions, total cost), the increment
//! simulation that projects each employee under a raise policy, and the
//! aggregation of a run into a current vs. projected comparison.

mod comparison;
mod increment;
mod payroll;
mod rounding;
mod seniority;

pub use comparison::{DEFAULT_TOP_N, compare, rank_top_impact};
pub use increment::{
    is_level_eligible, pay_variation, project_employee, simulate_all, simulate_employee,
};
pub use payroll::{
    CalculationBatch, PayTotalsResult, calculate_all, calculate_employee, calculate_pay_totals,
};
pub use rounding::{
    MAX_CALCULABLE_AMOUNT, MAX_RATE_PCT, MONEY_DP, apply_rate, percentage_variation, round_money,
};
pub use seniority::{
    SeniorityResult, rescaled_seniority_bonus, tiered_seniority_bonus, uploaded_seniority_bonus,
};
