//! Current-period calculation result models.
//!
//! This module contains the [`CalculatedEmployee`] type and the pieces it is
//! built from: the [`PayBreakdown`] of monetary totals and the [`AuditStep`]
//! trail recording how each figure was reached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a seniority bonus was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SeniorityBasis {
    /// Computed from the tier table.
    Tiered {
        /// Completed years of service.
        years: u32,
        /// Tier percentage applied.
        rate: Decimal,
        /// Amount the percentage was applied to.
        base: Decimal,
    },
    /// Seniority unknown; the uploaded amount was used.
    Uploaded,
}

/// One accrued provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionLine {
    /// Provision code (e.g., "aguinaldo").
    pub code: String,
    /// Accrued amount, rounded to cents.
    pub amount: Decimal,
}

/// The monetary totals for one employee in one period.
///
/// Every amount is rounded to two decimal places, and the derived totals
/// are sums of the rounded parts.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayBreakdown;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let pay = PayBreakdown {
///     basic_pay: Decimal::from_str("3000.00").unwrap(),
///     seniority_bonus: Decimal::from_str("150.00").unwrap(),
///     other_bonuses: Decimal::ZERO,
///     total_earned: Decimal::from_str("3150.00").unwrap(),
///     employer_charges: Decimal::from_str("542.12").unwrap(),
///     provisions: Decimal::ZERO,
///     provision_lines: vec![],
///     total_cost: Decimal::from_str("3692.12").unwrap(),
/// };
/// assert!(pay.total_cost >= pay.total_earned);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBreakdown {
    /// Basic pay.
    pub basic_pay: Decimal,
    /// Seniority bonus.
    pub seniority_bonus: Decimal,
    /// Other fixed bonuses.
    pub other_bonuses: Decimal,
    /// Basic pay + seniority bonus + other bonuses.
    pub total_earned: Decimal,
    /// Employer charges on total earned.
    pub employer_charges: Decimal,
    /// Sum of the provision lines.
    pub provisions: Decimal,
    /// Individual provisions.
    pub provision_lines: Vec<ProvisionLine>,
    /// Total earned + employer charges + provisions.
    pub total_cost: Decimal,
}

/// A single step in the audit trail recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// An employee with current-period totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedEmployee {
    /// The 0-based index of the source row.
    pub row: usize,
    /// Employee identifier.
    pub id: String,
    /// Full name.
    pub name: String,
    /// Job title.
    pub job_title: String,
    /// Job level code.
    pub level: String,
    /// Area or department.
    pub area: String,
    /// Regional unit.
    pub regional: String,
    /// Whether another record shares this identifier.
    pub duplicate: bool,
    /// Years of service used for the seniority tier, if known.
    pub years_of_service: Option<u32>,
    /// Seniority bonus as uploaded, kept for rescaling when years are unknown.
    pub uploaded_seniority_bonus: Decimal,
    /// How the seniority bonus was obtained.
    pub seniority_basis: SeniorityBasis,
    /// Current-period totals.
    pub pay: PayBreakdown,
    /// Audit trail of the calculation.
    pub audit_steps: Vec<AuditStep>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_seniority_basis_serialization() {
        let basis = SeniorityBasis::Tiered {
            years: 6,
            rate: dec("11"),
            base: dec("8250"),
        };
        let json = serde_json::to_string(&basis).unwrap();
        assert!(json.contains("\"source\":\"tiered\""));
        assert!(json.contains("\"years\":6"));

        let json = serde_json::to_string(&SeniorityBasis::Uploaded).unwrap();
        assert_eq!(json, "{\"source\":\"uploaded\"}");
    }

    #[test]
    fn test_pay_breakdown_serializes_amounts_as_strings() {
        let pay = PayBreakdown {
            basic_pay: dec("3000.00"),
            seniority_bonus: dec("0.00"),
            other_bonuses: dec("0.00"),
            total_earned: dec("3000.00"),
            employer_charges: dec("516.30"),
            provisions: dec("499.80"),
            provision_lines: vec![ProvisionLine {
                code: "aguinaldo".to_string(),
                amount: dec("249.90"),
            }],
            total_cost: dec("4016.10"),
        };

        let json = serde_json::to_string(&pay).unwrap();
        assert!(json.contains("\"employer_charges\":\"516.30\""));
        assert!(json.contains("\"code\":\"aguinaldo\""));
        assert!(json.contains("\"total_cost\":\"4016.10\""));
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "employer_charges".to_string(),
            rule_name: "Employer Charges".to_string(),
            input: serde_json::json!({"total_earned": "3000.00"}),
            output: serde_json::json!({"employer_charges": "516.30"}),
            reasoning: "$3000.00 x 17.21% = $516.30".to_string(),
        };

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":1"));
        assert!(json.contains("\"rule_id\":\"employer_charges\""));
    }
}
