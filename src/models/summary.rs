//! Aggregate comparison models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculation_result::PayBreakdown;
use super::simulation::IncreaseMechanism;

/// Summed cost structure over a group of employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTotals {
    /// Sum of basic pay.
    pub basic_pay: Decimal,
    /// Sum of total earned.
    pub total_earned: Decimal,
    /// Sum of employer charges.
    pub employer_charges: Decimal,
    /// Sum of provisions.
    pub provisions: Decimal,
    /// Sum of total cost.
    pub total_cost: Decimal,
}

impl CostTotals {
    /// Adds one employee's rounded amounts.
    pub fn add(&mut self, pay: &PayBreakdown) {
        self.basic_pay += pay.basic_pay;
        self.total_earned += pay.total_earned;
        self.employer_charges += pay.employer_charges;
        self.provisions += pay.provisions;
        self.total_cost += pay.total_cost;
    }
}

/// Subtotals for one job level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBreakdown {
    /// Job level code.
    pub level: String,
    /// Employees in the level.
    pub employee_count: usize,
    /// Employees raised by the percentage.
    pub percentage_increase_count: usize,
    /// Employees raised to the minimum wage.
    pub floored_count: usize,
    /// Current totals.
    pub current: CostTotals,
    /// Projected totals.
    pub projected: CostTotals,
    /// Sum of per-employee total cost deltas.
    pub delta_total_cost: Decimal,
}

/// One entry of the top-impact ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactEntry {
    /// 1-based rank.
    pub rank: usize,
    /// The 0-based index of the source row.
    pub row: usize,
    /// Employee identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job level code.
    pub level: String,
    /// Change in total cost.
    pub delta_total_cost: Decimal,
    /// Change in total cost, in percent.
    pub pct_total_cost: Decimal,
    /// Mechanism behind the raise.
    pub mechanism: IncreaseMechanism,
}

/// Current vs. projected comparison over a whole simulation run.
///
/// Every figure is derived from the per-employee rounded amounts, so the
/// totals reconcile exactly with the sum of the displayed rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// Employees in the run.
    pub employee_count: usize,
    /// Current totals.
    pub current: CostTotals,
    /// Projected totals.
    pub projected: CostTotals,
    /// Sum of every employee's total cost delta.
    pub total_impact: Decimal,
    /// Total impact as a percentage of current total cost.
    pub total_impact_pct: Decimal,
    /// Employees raised by the percentage.
    pub percentage_increase_count: usize,
    /// Employees raised to the minimum wage.
    pub floored_count: usize,
    /// Employees whose basic pay is unchanged.
    pub unchanged_count: usize,
    /// Per-level subtotals, ordered by level code.
    pub by_level: Vec<LevelBreakdown>,
    /// Employees with the largest total cost delta.
    pub top_impact: Vec<ImpactEntry>,
}
