//! Salary increment simulation.
//!
//! Projects each employee's pay under a [`SimulationParams`] policy: a
//! percentage raise for eligible levels, then the new minimum wage as a
//! floor, then seniority and totals recomputed on the new basic pay.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::info;

use crate::config::PayrollConfig;
use crate::error::CalculationError;
use crate::models::{
    AuditStep, CalculatedEmployee, EligibleLevels, Employee, PayBreakdown, PayVariation,
    SeniorityBasis, SimulatedEmployee, SimulationParams, Variation,
};

use super::payroll::{calculate_employee, calculate_pay_totals};
use super::rounding::{percentage_variation, round_money};
use super::seniority::{rescaled_seniority_bonus, tiered_seniority_bonus};

/// Returns true if `level` receives the percentage increase.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::is_level_eligible;
/// use payroll_engine::models::EligibleLevels;
///
/// let eligible = EligibleLevels::only(["N1", "N2"]);
/// assert!(is_level_eligible("N1", &eligible));
/// assert!(!is_level_eligible("N4", &eligible));
/// assert!(is_level_eligible("N4", &EligibleLevels::All));
/// ```
pub fn is_level_eligible(level: &str, eligible_levels: &EligibleLevels) -> bool {
    eligible_levels.contains(level)
}

fn variation(current: Decimal, projected: Decimal) -> Variation {
    let delta = projected - current;
    Variation {
        delta,
        pct: percentage_variation(delta, current),
    }
}

/// Computes projected-minus-current for every amount of a pay breakdown.
pub fn pay_variation(current: &PayBreakdown, projected: &PayBreakdown) -> PayVariation {
    PayVariation {
        basic_pay: variation(current.basic_pay, projected.basic_pay),
        seniority_bonus: variation(current.seniority_bonus, projected.seniority_bonus),
        total_earned: variation(current.total_earned, projected.total_earned),
        employer_charges: variation(current.employer_charges, projected.employer_charges),
        provisions: variation(current.provisions, projected.provisions),
        total_cost: variation(current.total_cost, projected.total_cost),
    }
}

/// Projects an already calculated employee under the given policy.
///
/// Steps:
/// 1. eligible levels get `government_pct + company_pct`, others zero;
/// 2. the candidate basic pay is the raised pay rounded to cents;
/// 3. the new basic pay is the greater of the candidate and the new minimum wage;
/// 4. an employee lifted by the floor is flagged floored and never also
///    flagged as receiving the percentage;
/// 5. the seniority bonus is recomputed against the new basic pay and new
///    minimum wage (uploaded bonuses are rescaled by the base ratio);
/// 6. totals and variations are recomputed.
///
/// `params` should have passed [`SimulationParams::validate`]; the minimum
/// wage is rounded to cents before the floor is applied.
pub fn project_employee(
    current: &CalculatedEmployee,
    params: &SimulationParams,
    config: &PayrollConfig,
) -> SimulatedEmployee {
    let mut audit_steps: Vec<AuditStep> = Vec::with_capacity(7);
    let old_basic_pay = current.pay.basic_pay;

    let eligible = is_level_eligible(&current.level, &params.eligible_levels);
    let percentage_increase = if eligible {
        params.total_pct()
    } else {
        Decimal::ZERO
    };
    audit_steps.push(AuditStep {
        step_number: 1,
        rule_id: "level_eligibility".to_string(),
        rule_name: "Level Eligibility".to_string(),
        input: serde_json::json!({
            "level": current.level,
            "government_pct": params.government_pct.normalize().to_string(),
            "company_pct": params.company_pct.normalize().to_string(),
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "percentage_increase": percentage_increase.normalize().to_string(),
        }),
        reasoning: if eligible {
            format!(
                "Level {} is eligible: {}% + {}% = {}%",
                current.level,
                params.government_pct.normalize(),
                params.company_pct.normalize(),
                percentage_increase.normalize()
            )
        } else {
            format!("Level {} is not eligible for the percentage increase", current.level)
        },
    });

    let candidate = round_money(
        old_basic_pay * (Decimal::ONE + percentage_increase / Decimal::ONE_HUNDRED),
    );
    audit_steps.push(AuditStep {
        step_number: 2,
        rule_id: "percentage_increase".to_string(),
        rule_name: "Percentage Increase".to_string(),
        input: serde_json::json!({
            "basic_pay": old_basic_pay.to_string(),
            "percentage_increase": percentage_increase.normalize().to_string(),
        }),
        output: serde_json::json!({ "candidate_basic_pay": candidate.to_string() }),
        reasoning: format!(
            "{} x (1 + {}%) = {}",
            old_basic_pay,
            percentage_increase.normalize(),
            candidate
        ),
    });

    let minimum_wage = round_money(params.new_minimum_wage);
    let new_basic_pay = candidate.max(minimum_wage);
    let floored_to_minimum_wage = new_basic_pay > candidate;
    let receives_percentage_increase =
        percentage_increase > Decimal::ZERO && !floored_to_minimum_wage;
    audit_steps.push(AuditStep {
        step_number: 3,
        rule_id: "minimum_wage_floor".to_string(),
        rule_name: "Minimum Wage Floor".to_string(),
        input: serde_json::json!({
            "candidate_basic_pay": candidate.to_string(),
            "new_minimum_wage": minimum_wage.to_string(),
        }),
        output: serde_json::json!({
            "new_basic_pay": new_basic_pay.to_string(),
            "floored_to_minimum_wage": floored_to_minimum_wage,
            "receives_percentage_increase": receives_percentage_increase,
        }),
        reasoning: if floored_to_minimum_wage {
            format!(
                "Candidate {} is below the minimum wage {}; raised to the minimum wage",
                candidate, minimum_wage
            )
        } else {
            format!(
                "Candidate {} meets the minimum wage {}",
                candidate, minimum_wage
            )
        },
    });

    let rule = &config.seniority;
    let seniority = match &current.seniority_basis {
        SeniorityBasis::Tiered { years, .. } => {
            tiered_seniority_bonus(*years, new_basic_pay, rule, minimum_wage, 4)
        }
        SeniorityBasis::Uploaded => rescaled_seniority_bonus(
            current.uploaded_seniority_bonus,
            rule.base_amount(old_basic_pay, rule.minimum_wage),
            rule.base_amount(new_basic_pay, minimum_wage),
            4,
        ),
    };
    audit_steps.push(seniority.audit_step);

    let totals = calculate_pay_totals(
        new_basic_pay,
        seniority.bonus,
        current.pay.other_bonuses,
        config.employer_charge_rate,
        &config.provisions,
        5,
    );
    audit_steps.extend(totals.audit_steps);

    let variation = pay_variation(&current.pay, &totals.pay);

    SimulatedEmployee {
        row: current.row,
        id: current.id.clone(),
        name: current.name.clone(),
        job_title: current.job_title.clone(),
        level: current.level.clone(),
        area: current.area.clone(),
        regional: current.regional.clone(),
        percentage_increase,
        receives_percentage_increase,
        floored_to_minimum_wage,
        current: current.pay.clone(),
        projected: totals.pay,
        variation,
        audit_steps,
    }
}

/// Calculates and projects a single employee.
///
/// # Errors
///
/// Returns a [`CalculationError`] when the current period cannot be calculated.
pub fn simulate_employee(
    employee: &Employee,
    params: &SimulationParams,
    config: &PayrollConfig,
) -> Result<SimulatedEmployee, CalculationError> {
    let current = calculate_employee(employee, config)?;
    Ok(project_employee(&current, params, config))
}

/// Projects every calculated employee, preserving input order.
pub fn simulate_all(
    employees: &[CalculatedEmployee],
    params: &SimulationParams,
    config: &PayrollConfig,
) -> Vec<SimulatedEmployee> {
    let start = Instant::now();
    let simulated: Vec<SimulatedEmployee> = employees
        .iter()
        .map(|employee| project_employee(employee, params, config))
        .collect();

    info!(
        employees = simulated.len(),
        floored = simulated.iter().filter(|e| e.floored_to_minimum_wage).count(),
        new_minimum_wage = %params.new_minimum_wage,
        total_pct = %params.total_pct(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Simulation complete"
    );

    simulated
}
