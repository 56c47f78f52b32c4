//! Aggregation of a simulation run into a current vs. projected comparison.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{
    ComparisonSummary, CostTotals, ImpactEntry, IncreaseMechanism, LevelBreakdown,
    SimulatedEmployee,
};

use super::rounding::percentage_variation;

/// Number of employees listed in the top-impact ranking by default.
pub const DEFAULT_TOP_N: usize = 10;

/// Ranks employees by total cost delta, largest first.
///
/// The sort is stable, so employees with equal deltas keep their input order.
pub fn rank_top_impact(employees: &[SimulatedEmployee], top_n: usize) -> Vec<ImpactEntry> {
    let mut ranked: Vec<&SimulatedEmployee> = employees.iter().collect();
    ranked.sort_by(|a, b| b.delta_total_cost().cmp(&a.delta_total_cost()));

    ranked
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, employee)| ImpactEntry {
            rank: i + 1,
            row: employee.row,
            id: employee.id.clone(),
            name: employee.name.clone(),
            level: employee.level.clone(),
            delta_total_cost: employee.delta_total_cost(),
            pct_total_cost: employee.variation.total_cost.pct,
            mechanism: employee.mechanism(),
        })
        .collect()
}

/// Aggregates a simulation run.
///
/// Every sum is taken over the per-employee rounded amounts, so
/// `total_impact` equals the sum of the employees' total cost deltas.
pub fn compare(employees: &[SimulatedEmployee], top_n: usize) -> ComparisonSummary {
    let mut current = CostTotals::default();
    let mut projected = CostTotals::default();
    let mut total_impact = Decimal::ZERO;
    let mut percentage_increase_count = 0;
    let mut floored_count = 0;
    let mut unchanged_count = 0;
    let mut levels: BTreeMap<&str, LevelBreakdown> = BTreeMap::new();

    for employee in employees {
        current.add(&employee.current);
        projected.add(&employee.projected);
        total_impact += employee.delta_total_cost();

        let mechanism = employee.mechanism();
        match mechanism {
            IncreaseMechanism::PercentageIncrease => percentage_increase_count += 1,
            IncreaseMechanism::MinimumWageFloor => floored_count += 1,
            IncreaseMechanism::Unchanged => unchanged_count += 1,
        }

        let level = levels
            .entry(employee.level.as_str())
            .or_insert_with(|| LevelBreakdown {
                level: employee.level.clone(),
                employee_count: 0,
                percentage_increase_count: 0,
                floored_count: 0,
                current: CostTotals::default(),
                projected: CostTotals::default(),
                delta_total_cost: Decimal::ZERO,
            });
        level.employee_count += 1;
        match mechanism {
            IncreaseMechanism::PercentageIncrease => level.percentage_increase_count += 1,
            IncreaseMechanism::MinimumWageFloor => level.floored_count += 1,
            IncreaseMechanism::Unchanged => {}
        }
        level.current.add(&employee.current);
        level.projected.add(&employee.projected);
        level.delta_total_cost += employee.delta_total_cost();
    }

    ComparisonSummary {
        employee_count: employees.len(),
        total_impact_pct: percentage_variation(total_impact, current.total_cost),
        current,
        projected,
        total_impact,
        percentage_increase_count,
        floored_count,
        unchanged_count,
        by_level: levels.into_values().collect(),
        top_impact: rank_top_impact(employees, top_n),
    }
}
