//! Current-period payroll calculation.
//!
//! Turns a validated [`Employee`] into a [`CalculatedEmployee`] with
//! total earned, employer charges, provisions and total cost.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::{PayrollConfig, ProvisionRule};
use crate::error::CalculationError;
use crate::models::{AuditStep, CalculatedEmployee, Employee, PayBreakdown, ProvisionLine};

use super::rounding::{MAX_CALCULABLE_AMOUNT, apply_rate, round_money};
use super::seniority::{tiered_seniority_bonus, uploaded_seniority_bonus};

/// Totals and the audit steps that produced them.
#[derive(Debug, Clone)]
pub struct PayTotalsResult {
    /// The computed pay breakdown.
    pub pay: PayBreakdown,
    /// Audit steps, numbered from the `first_step` passed in.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes total earned, employer charges, provisions and total cost.
///
/// Inputs are rounded to cents first; every derived total is a sum of
/// rounded parts.
pub fn calculate_pay_totals(
    basic_pay: Decimal,
    seniority_bonus: Decimal,
    other_bonuses: Decimal,
    employer_charge_rate: Decimal,
    provisions: &[ProvisionRule],
    first_step: u32,
) -> PayTotalsResult {
    let basic_pay = round_money(basic_pay);
    let seniority_bonus = round_money(seniority_bonus);
    let other_bonuses = round_money(other_bonuses);
    let mut step_number = first_step;
    let mut audit_steps = Vec::with_capacity(4);

    let total_earned = basic_pay + seniority_bonus + other_bonuses;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "total_earned".to_string(),
        rule_name: "Total Earned".to_string(),
        input: serde_json::json!({
            "basic_pay": basic_pay.to_string(),
            "seniority_bonus": seniority_bonus.to_string(),
            "other_bonuses": other_bonuses.to_string(),
        }),
        output: serde_json::json!({ "total_earned": total_earned.to_string() }),
        reasoning: format!(
            "{} + {} + {} = {}",
            basic_pay, seniority_bonus, other_bonuses, total_earned
        ),
    });
    step_number += 1;

    let employer_charges = apply_rate(total_earned, employer_charge_rate);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "employer_charges".to_string(),
        rule_name: "Employer Charges".to_string(),
        input: serde_json::json!({
            "total_earned": total_earned.to_string(),
            "rate": employer_charge_rate.normalize().to_string(),
        }),
        output: serde_json::json!({ "employer_charges": employer_charges.to_string() }),
        reasoning: format!(
            "{} x {}% = {}",
            total_earned,
            employer_charge_rate.normalize(),
            employer_charges
        ),
    });
    step_number += 1;

    let provision_lines: Vec<ProvisionLine> = provisions
        .iter()
        .map(|rule| ProvisionLine {
            code: rule.code.clone(),
            amount: apply_rate(total_earned, rule.rate),
        })
        .collect();
    let provisions_total = round_money(provision_lines.iter().map(|line| line.amount).sum());
    let provision_detail: Vec<String> = provisions
        .iter()
        .zip(&provision_lines)
        .map(|(rule, line)| format!("{} {}% = {}", rule.name, rule.rate.normalize(), line.amount))
        .collect();
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "provisions".to_string(),
        rule_name: "Provisions".to_string(),
        input: serde_json::json!({
            "total_earned": total_earned.to_string(),
            "rates": provisions
                .iter()
                .map(|rule| (rule.code.clone(), rule.rate.normalize().to_string()))
                .collect::<std::collections::BTreeMap<_, _>>(),
        }),
        output: serde_json::json!({
            "provisions": provisions_total.to_string(),
            "lines": provision_lines
                .iter()
                .map(|line| (line.code.clone(), line.amount.to_string()))
                .collect::<std::collections::BTreeMap<_, _>>(),
        }),
        reasoning: if provision_detail.is_empty() {
            "No provisions configured".to_string()
        } else {
            format!("{}; total {}", provision_detail.join(", "), provisions_total)
        },
    });
    step_number += 1;

    let total_cost = total_earned + employer_charges + provisions_total;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "total_cost".to_string(),
        rule_name: "Total Cost".to_string(),
        input: serde_json::json!({
            "total_earned": total_earned.to_string(),
            "employer_charges": employer_charges.to_string(),
            "provisions": provisions_total.to_string(),
        }),
        output: serde_json::json!({ "total_cost": total_cost.to_string() }),
        reasoning: format!(
            "{} + {} + {} = {}",
            total_earned, employer_charges, provisions_total, total_cost
        ),
    });

    PayTotalsResult {
        pay: PayBreakdown {
            basic_pay,
            seniority_bonus,
            other_bonuses,
            total_earned,
            employer_charges,
            provisions: provisions_total,
            provision_lines,
            total_cost,
        },
        audit_steps,
    }
}

/// Calculates the current-period totals for one employee.
///
/// # Errors
///
/// Returns a [`CalculationError`] when basic pay is missing or negative, or
/// when an amount exceeds [`MAX_CALCULABLE_AMOUNT`].
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_employee;
/// use payroll_engine::config::{PayrollConfig, SeniorityBase, SeniorityRule};
/// use payroll_engine::models::Employee;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = PayrollConfig {
///     employer_charge_rate: Decimal::from_str("17.21").unwrap(),
///     reference_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
///     seniority: SeniorityRule {
///         base: SeniorityBase::BasicPay,
///         minimum_wage: Decimal::from(2750),
///         tiers: vec![],
///     },
///     provisions: vec![],
/// };
///
/// let mut employee = Employee::new(0, "4455667", "N1");
/// employee.basic_pay = Some(Decimal::from(3000));
///
/// let result = calculate_employee(&employee, &config).unwrap();
/// assert_eq!(result.pay.employer_charges, Decimal::from_str("516.30").unwrap());
/// assert_eq!(result.pay.total_cost, Decimal::from_str("3516.30").unwrap());
/// ```
pub fn calculate_employee(
    employee: &Employee,
    config: &PayrollConfig,
) -> Result<CalculatedEmployee, CalculationError> {
    let basic_pay = employee.basic_pay.ok_or_else(|| CalculationError {
        employee_id: employee.id.clone(),
        row: employee.row,
        message: "basic pay is missing".to_string(),
    })?;
    if basic_pay < Decimal::ZERO {
        return Err(CalculationError {
            employee_id: employee.id.clone(),
            row: employee.row,
            message: format!("basic pay {} is negative", basic_pay),
        });
    }
    for (label, amount) in [
        ("basic pay", basic_pay),
        ("seniority bonus", employee.seniority_bonus),
        ("other bonuses", employee.other_bonuses),
    ] {
        if amount.abs() > MAX_CALCULABLE_AMOUNT {
            return Err(CalculationError {
                employee_id: employee.id.clone(),
                row: employee.row,
                message: format!(
                    "{} {} exceeds the calculable limit of {}",
                    label, amount, MAX_CALCULABLE_AMOUNT
                ),
            });
        }
    }

    let years_of_service = employee.years_of_service_at(config.reference_date);
    let seniority = match years_of_service {
        Some(years) => tiered_seniority_bonus(
            years,
            basic_pay,
            &config.seniority,
            config.seniority.minimum_wage,
            1,
        ),
        None => uploaded_seniority_bonus(employee.seniority_bonus, 1),
    };

    let totals = calculate_pay_totals(
        basic_pay,
        seniority.bonus,
        employee.other_bonuses,
        config.employer_charge_rate,
        &config.provisions,
        2,
    );

    let mut audit_steps = Vec::with_capacity(1 + totals.audit_steps.len());
    audit_steps.push(seniority.audit_step);
    audit_steps.extend(totals.audit_steps);

    Ok(CalculatedEmployee {
        row: employee.row,
        id: employee.id.clone(),
        name: employee.name.clone(),
        job_title: employee.job_title.clone(),
        level: employee.level.clone(),
        area: employee.area.clone(),
        regional: employee.regional.clone(),
        duplicate: employee.duplicate,
        years_of_service,
        uploaded_seniority_bonus: round_money(employee.seniority_bonus),
        seniority_basis: seniority.basis,
        pay: totals.pay,
        audit_steps,
    })
}

/// The outcome of calculating a batch of employees.
#[derive(Debug, Clone, Default)]
pub struct CalculationBatch {
    /// Successfully calculated employees, in input order.
    pub employees: Vec<CalculatedEmployee>,
    /// Employees that could not be calculated.
    pub failures: Vec<CalculationError>,
}

/// Calculates every employee, skipping and recording the ones that fail.
pub fn calculate_all(employees: &[Employee], config: &PayrollConfig) -> CalculationBatch {
    let mut batch = CalculationBatch {
        employees: Vec::with_capacity(employees.len()),
        failures: Vec::new(),
    };

    for employee in employees {
        match calculate_employee(employee, config) {
            Ok(calculated) => batch.employees.push(calculated),
            Err(error) => {
                warn!(
                    employee_id = %error.employee_id,
                    row = error.row,
                    error = %error.message,
                    "Skipping employee that could not be calculated"
                );
                batch.failures.push(error);
            }
        }
    }

    debug!(
        calculated = batch.employees.len(),
        failed = batch.failures.len(),
        reference_date = %config.reference_date,
        "Calculated current payroll"
    );

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SeniorityBase, SeniorityRule, SeniorityTier};
    use crate::models::SeniorityBasis;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> PayrollConfig {
        PayrollConfig {
            employer_charge_rate: dec("17.21"),
            reference_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            seniority: SeniorityRule {
                base: SeniorityBase::MinimumWageMultiple {
                    multiple: dec("3"),
                },
                minimum_wage: dec("2750"),
                tiers: vec![
                    SeniorityTier {
                        min_years: 2,
                        rate: dec("5"),
                    },
                    SeniorityTier {
                        min_years: 5,
                        rate: dec("11"),
                    },
                ],
            },
            provisions: vec![
                ProvisionRule {
                    code: "aguinaldo".to_string(),
                    name: "Aguinaldo".to_string(),
                    rate: dec("8.33"),
                },
                ProvisionRule {
                    code: "indemnizacion".to_string(),
                    name: "Indemnización".to_string(),
                    rate: dec("8.33"),
                },
            ],
        }
    }

    fn employee(pay: &str) -> Employee {
        let mut employee = Employee::new(0, "4455667", "N1");
        employee.basic_pay = Some(dec(pay));
        employee
    }

    #[test]
    fn test_totals_without_seniority() {
        let result = calculate_employee(&employee("3000"), &config()).unwrap();

        assert_eq!(result.pay.total_earned, dec("3000.00"));
        assert_eq!(result.pay.employer_charges, dec("516.30"));
        assert_eq!(result.pay.provision_lines[0].amount, dec("249.90"));
        assert_eq!(result.pay.provisions, dec("499.80"));
        assert_eq!(result.pay.total_cost, dec("4016.10"));
        assert_eq!(result.seniority_basis, SeniorityBasis::Uploaded);
    }

    #[test]
    fn test_uploaded_bonus_and_other_bonuses_are_earned() {
        let mut e = employee("3000");
        e.seniority_bonus = dec("412.50");
        e.other_bonuses = dec("150");
        let result = calculate_employee(&e, &config()).unwrap();

        assert_eq!(result.pay.seniority_bonus, dec("412.50"));
        assert_eq!(result.pay.total_earned, dec("3562.50"));
        assert_eq!(result.uploaded_seniority_bonus, dec("412.50"));
    }

    #[test]
    fn test_tiered_bonus_from_years() {
        let mut e = employee("3000");
        e.years_of_service = Some(6);
        e.seniority_bonus = dec("1");
        let result = calculate_employee(&e, &config()).unwrap();

        // 3 x 2750 x 11% = 907.50
        assert_eq!(result.pay.seniority_bonus, dec("907.50"));
        assert_eq!(result.years_of_service, Some(6));
        assert!(matches!(
            result.seniority_basis,
            SeniorityBasis::Tiered { years: 6, .. }
        ));
    }

    #[test]
    fn test_tiered_bonus_from_hire_date() {
        let mut e = employee("3000");
        e.hire_date = NaiveDate::from_ymd_opt(2022, 7, 1);
        let result = calculate_employee(&e, &config()).unwrap();

        // 2 completed years on 2025-06-30 -> 5%
        assert_eq!(result.years_of_service, Some(2));
        assert_eq!(result.pay.seniority_bonus, dec("412.50"));
    }

    #[test]
    fn test_audit_trail_is_sequential() {
        let result = calculate_employee(&employee("3000"), &config()).unwrap();

        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        let rules: Vec<&str> = result
            .audit_steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rules,
            vec![
                "seniority_bonus",
                "total_earned",
                "employer_charges",
                "provisions",
                "total_cost"
            ]
        );
        assert_eq!(
            result.audit_steps[2].output["employer_charges"]
                .as_str()
                .unwrap(),
            "516.30"
        );
    }

    #[test]
    fn test_missing_basic_pay_fails() {
        let mut e = employee("3000");
        e.basic_pay = None;
        let error = calculate_employee(&e, &config()).unwrap_err();

        assert_eq!(error.employee_id, "4455667");
        assert!(error.message.contains("missing"));
    }

    #[test]
    fn test_calculate_all_continues_after_failure() {
        let mut bad = employee("3000");
        bad.row = 1;
        bad.basic_pay = None;
        let mut second = employee("2800");
        second.row = 2;

        let batch = calculate_all(&[employee("3000"), bad, second], &config());

        assert_eq!(batch.employees.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].row, 1);
        assert_eq!(batch.employees[1].row, 2);
    }

    #[test]
    fn test_oversized_amount_is_a_failure_not_a_panic() {
        let mut huge = employee("50000000000000000000000000000");
        huge.row = 1;
        let mut huge_bonus = employee("3000");
        huge_bonus.row = 2;
        huge_bonus.other_bonuses = dec("1000000000000.01");

        let batch = calculate_all(&[employee("3000"), huge, huge_bonus], &config());

        assert_eq!(batch.employees.len(), 1);
        assert_eq!(batch.failures.len(), 2);
        assert!(batch.failures[0].message.contains("basic pay"));
        assert!(batch.failures[0].message.contains("calculable limit"));
        assert!(batch.failures[1].message.contains("other bonuses"));
    }

    #[test]
    fn test_amount_at_calculable_limit_is_calculated() {
        let result = calculate_employee(&employee("1000000000000"), &config()).unwrap();
        assert_eq!(result.pay.basic_pay, dec("1000000000000.00"));
        assert!(result.pay.total_cost > result.pay.total_earned);
    }

    #[test]
    fn test_no_provisions() {
        let result = calculate_pay_totals(
            dec("1000"),
            Decimal::ZERO,
            Decimal::ZERO,
            dec("17.21"),
            &[],
            1,
        );
        assert_eq!(result.pay.provisions, dec("0.00"));
        assert_eq!(result.pay.total_cost, dec("1172.10"));
        assert_eq!(result.audit_steps[2].reasoning, "No provisions configured");
    }
}
