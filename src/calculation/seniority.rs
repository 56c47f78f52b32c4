//! Seniority bonus calculation.
//!
//! The bonus is either derived from the tier table, when years of service
//! are known, or taken from the uploaded amount.

use rust_decimal::Decimal;

use crate::config::{SeniorityBase, SeniorityRule};
use crate::models::{AuditStep, SeniorityBasis};

use super::rounding::{apply_rate, round_money};

/// The result of a seniority bonus calculation.
#[derive(Debug, Clone)]
pub struct SeniorityResult {
    /// The bonus, rounded to cents.
    pub bonus: Decimal,
    /// How the bonus was obtained.
    pub basis: SeniorityBasis,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn base_description(rule: &SeniorityRule) -> String {
    match &rule.base {
        SeniorityBase::BasicPay => "basic pay".to_string(),
        SeniorityBase::MinimumWageMultiple { multiple } => {
            format!("{} x minimum wage", multiple.normalize())
        }
    }
}

/// Computes the seniority bonus from the tier table.
///
/// `minimum_wage` is the minimum wage the base is derived from when the
/// rule uses a minimum-wage multiple; it is ignored for a basic-pay base.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::tiered_seniority_bonus;
/// use payroll_engine::config::{SeniorityBase, SeniorityRule, SeniorityTier};
/// use rust_decimal::Decimal;
///
/// let rule = SeniorityRule {
///     base: SeniorityBase::MinimumWageMultiple { multiple: Decimal::from(3) },
///     minimum_wage: Decimal::from(2750),
///     tiers: vec![SeniorityTier { min_years: 2, rate: Decimal::from(5) }],
/// };
///
/// // 3 x 2750 x 5% = 412.50
/// let result = tiered_seniority_bonus(4, Decimal::from(3000), &rule, Decimal::from(2750), 1);
/// assert_eq!(result.bonus, Decimal::new(41250, 2));
/// ```
pub fn tiered_seniority_bonus(
    years: u32,
    basic_pay: Decimal,
    rule: &SeniorityRule,
    minimum_wage: Decimal,
    step_number: u32,
) -> SeniorityResult {
    let rate = rule.rate_for(years);
    let base = round_money(rule.base_amount(basic_pay, minimum_wage));
    let bonus = apply_rate(base, rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "seniority_bonus".to_string(),
        rule_name: "Seniority Bonus".to_string(),
        input: serde_json::json!({
            "years_of_service": years,
            "base_type": base_description(rule),
            "base": base.to_string(),
        }),
        output: serde_json::json!({
            "rate": rate.normalize().to_string(),
            "seniority_bonus": bonus.to_string(),
        }),
        reasoning: format!(
            "{} years of service: {} ({}) x {}% = {}",
            years,
            base_description(rule),
            base,
            rate.normalize(),
            bonus
        ),
    };

    SeniorityResult {
        bonus,
        basis: SeniorityBasis::Tiered { years, rate, base },
        audit_step,
    }
}

/// Carries the uploaded bonus forward when years of service are unknown.
pub fn uploaded_seniority_bonus(uploaded: Decimal, step_number: u32) -> SeniorityResult {
    let bonus = round_money(uploaded);

    let audit_step = AuditStep {
        step_number,
        rule_id: "seniority_bonus".to_string(),
        rule_name: "Seniority Bonus".to_string(),
        input: serde_json::json!({
            "years_of_service": null,
            "uploaded_seniority_bonus": uploaded.normalize().to_string(),
        }),
        output: serde_json::json!({
            "seniority_bonus": bonus.to_string(),
        }),
        reasoning: format!(
            "Years of service unknown; uploaded seniority bonus {} carried forward",
            bonus
        ),
    };

    SeniorityResult {
        bonus,
        basis: SeniorityBasis::Uploaded,
        audit_step,
    }
}

/// Rescales an uploaded bonus by the ratio of the new to the old base.
///
/// The bonus is left unchanged when the old base is zero.
pub fn rescaled_seniority_bonus(
    uploaded: Decimal,
    old_base: Decimal,
    new_base: Decimal,
    step_number: u32,
) -> SeniorityResult {
    let (bonus, reasoning) = if old_base.is_zero() {
        let bonus = round_money(uploaded);
        (
            bonus,
            format!(
                "Years of service unknown and current base is zero; uploaded bonus {} kept",
                bonus
            ),
        )
    } else {
        let bonus = round_money(uploaded * new_base / old_base);
        (
            bonus,
            format!(
                "Years of service unknown; uploaded bonus {} x ({} / {}) = {}",
                round_money(uploaded),
                new_base,
                old_base,
                bonus
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "seniority_bonus".to_string(),
        rule_name: "Seniority Bonus".to_string(),
        input: serde_json::json!({
            "years_of_service": null,
            "uploaded_seniority_bonus": uploaded.normalize().to_string(),
            "old_base": old_base.normalize().to_string(),
            "new_base": new_base.normalize().to_string(),
        }),
        output: serde_json::json!({
            "seniority_bonus": bonus.to_string(),
        }),
        reasoning,
    };

    SeniorityResult {
        bonus,
        basis: SeniorityBasis::Uploaded,
        audit_step,
    }
}
