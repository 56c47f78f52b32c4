//! Configuration types for payroll rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML rule-set files, plus the explicit
//! [`PayrollConfig`] value threaded into the calculator and simulator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{MAX_CALCULABLE_AMOUNT, MAX_RATE_PCT};
use crate::error::{EngineError, EngineResult};

/// Employer-charge rate applied when a rule set does not name one (17.21%).
pub const DEFAULT_EMPLOYER_CHARGE_RATE: Decimal = Decimal::from_parts(1721, 0, 0, false, 2);

fn default_employer_charge_rate() -> Decimal {
    DEFAULT_EMPLOYER_CHARGE_RATE
}

/// Largest monetary amount accepted in an uploaded row when a rule set does
/// not name one (one billion).
pub const DEFAULT_MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn default_max_amount() -> Decimal {
    DEFAULT_MAX_AMOUNT
}

/// Metadata identifying a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetMetadata {
    /// Jurisdiction code (e.g., "BO").
    pub jurisdiction: String,
    /// Human-readable name of the rule set.
    pub name: String,
    /// Version label of the rule set.
    pub version: String,
}

/// A job level accepted in uploaded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLevel {
    /// The level code as it appears in uploaded rows (e.g., "N3").
    pub code: String,
    /// A descriptive name for the level.
    pub name: String,
}

/// How records sharing an identifier are handled during validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every occurrence, flag them and report a warning.
    #[default]
    Flag,
    /// Keep the first occurrence and drop the later ones.
    KeepFirst,
    /// Drop every occurrence of a duplicated identifier.
    Reject,
}

/// Settings for the absence analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceSettings {
    /// Working days in one period, used as the absence-rate denominator.
    pub working_days_per_period: u32,
    /// Employees with more absence days than this are listed individually.
    pub high_absence_threshold_days: Decimal,
}

impl Default for AbsenceSettings {
    fn default() -> Self {
        Self {
            working_days_per_period: 30,
            high_absence_threshold_days: Decimal::from(5),
        }
    }
}

/// The value a seniority-bonus percentage is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeniorityBase {
    /// The employee's own basic pay.
    BasicPay,
    /// A fixed multiple of the minimum wage (e.g., three SMN).
    MinimumWageMultiple {
        /// How many minimum wages form the base.
        multiple: Decimal,
    },
}

/// One row of the seniority tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorityTier {
    /// Completed years of service from which this tier applies.
    pub min_years: u32,
    /// Bonus percentage applied to the base (e.g., 5 for 5%).
    pub rate: Decimal,
}

/// Tiered seniority-bonus rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeniorityRule {
    /// What the tier percentage is applied to.
    pub base: SeniorityBase,
    /// Minimum wage in force for this table.
    pub minimum_wage: Decimal,
    /// Tiers, sorted by `min_years` ascending.
    pub tiers: Vec<SeniorityTier>,
}

impl SeniorityRule {
    /// Returns the tier percentage for the given completed years of service.
    ///
    /// Below the first tier the rate is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::{SeniorityBase, SeniorityRule, SeniorityTier};
    /// use rust_decimal::Decimal;
    ///
    /// let rule = SeniorityRule {
    ///     base: SeniorityBase::BasicPay,
    ///     minimum_wage: Decimal::from(2500),
    ///     tiers: vec![
    ///         SeniorityTier { min_years: 2, rate: Decimal::from(5) },
    ///         SeniorityTier { min_years: 5, rate: Decimal::from(11) },
    ///     ],
    /// };
    /// assert_eq!(rule.rate_for(1), Decimal::ZERO);
    /// assert_eq!(rule.rate_for(4), Decimal::from(5));
    /// assert_eq!(rule.rate_for(30), Decimal::from(11));
    /// ```
    pub fn rate_for(&self, years: u32) -> Decimal {
        self.tiers
            .iter()
            .rfind(|tier| tier.min_years <= years)
            .map(|tier| tier.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the amount the tier percentage applies to.
    pub fn base_amount(&self, basic_pay: Decimal, minimum_wage: Decimal) -> Decimal {
        match &self.base {
            SeniorityBase::BasicPay => basic_pay,
            SeniorityBase::MinimumWageMultiple { multiple } => minimum_wage * multiple,
        }
    }
}

/// An accrued liability computed as a percentage of total earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRule {
    /// Short code (e.g., "aguinaldo").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Percentage of total earned accrued per period.
    pub rate: Decimal,
}

/// A formula table effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaTable {
    /// The date from which these formulas apply.
    pub effective_date: NaiveDate,
    /// Seniority-bonus rule.
    pub seniority: SeniorityRule,
    /// Provision rules.
    #[serde(default)]
    pub provisions: Vec<ProvisionRule>,
}

/// Top-level settings file structure (`ruleset.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetFile {
    /// Rule-set metadata.
    pub metadata: RuleSetMetadata,
    /// Employer-charge percentage of total earned.
    #[serde(default = "default_employer_charge_rate")]
    pub employer_charge_rate: Decimal,
    /// Duplicate identifier policy.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Largest pay or bonus amount accepted in an uploaded row.
    #[serde(default = "default_max_amount")]
    pub max_amount: Decimal,
    /// Absence analytics settings.
    #[serde(default)]
    pub absence: AbsenceSettings,
    /// Configured job levels.
    pub levels: Vec<JobLevel>,
}

/// The explicit calculation configuration for one run.
///
/// Built from a [`RuleSet`] for a reference date; the calculator and
/// simulator read nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    /// Employer-charge percentage of total earned.
    pub employer_charge_rate: Decimal,
    /// Date against which years of service are measured.
    pub reference_date: NaiveDate,
    /// Seniority-bonus rule.
    pub seniority: SeniorityRule,
    /// Provision rules.
    pub provisions: Vec<ProvisionRule>,
}

/// The complete rule set loaded from YAML files.
#[derive(Debug, Clone)]
pub struct RuleSet {
    metadata: RuleSetMetadata,
    employer_charge_rate: Decimal,
    duplicate_policy: DuplicatePolicy,
    max_amount: Decimal,
    absence: AbsenceSettings,
    levels: Vec<JobLevel>,
    /// Formula tables by effective date (sorted oldest first).
    tables: Vec<FormulaTable>,
}

impl RuleSet {
    /// Creates a new RuleSet from its settings file and formula tables.
    pub fn new(file: RuleSetFile, tables: Vec<FormulaTable>) -> Self {
        let mut sorted_tables = tables;
        sorted_tables.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        for table in &mut sorted_tables {
            table.seniority.tiers.sort_by_key(|tier| tier.min_years);
        }
        Self {
            metadata: file.metadata,
            employer_charge_rate: file.employer_charge_rate,
            duplicate_policy: file.duplicate_policy,
            max_amount: file.max_amount,
            absence: file.absence,
            levels: file.levels,
            tables: sorted_tables,
        }
    }

    /// Checks the rule set for values the engine cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.employer_charge_rate < Decimal::ZERO || self.employer_charge_rate > MAX_RATE_PCT {
            return Err(invalid(&format!(
                "employer_charge_rate must be between 0 and {}",
                MAX_RATE_PCT
            )));
        }
        if self.max_amount <= Decimal::ZERO || self.max_amount > MAX_CALCULABLE_AMOUNT {
            return Err(invalid(&format!(
                "max_amount must be positive and at most {}",
                MAX_CALCULABLE_AMOUNT
            )));
        }
        if self.levels.is_empty() {
            return Err(invalid("at least one job level is required"));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].iter().any(|l| l.code == level.code) {
                return Err(invalid(&format!("job level '{}' is declared twice", level.code)));
            }
        }
        if self.absence.working_days_per_period == 0 {
            return Err(invalid("working_days_per_period must be positive"));
        }
        if self.tables.is_empty() {
            return Err(invalid("no formula tables defined"));
        }
        for table in &self.tables {
            let seniority = &table.seniority;
            if seniority.minimum_wage <= Decimal::ZERO
                || seniority.minimum_wage > MAX_CALCULABLE_AMOUNT
            {
                return Err(invalid(&format!(
                    "table {}: minimum_wage must be positive and at most {}",
                    table.effective_date, MAX_CALCULABLE_AMOUNT
                )));
            }
            let out_of_range = |rate: Decimal| rate < Decimal::ZERO || rate > MAX_RATE_PCT;
            if let SeniorityBase::MinimumWageMultiple { multiple } = &seniority.base {
                if out_of_range(*multiple) {
                    return Err(invalid(&format!(
                        "table {}: seniority base multiple must be between 0 and {}",
                        table.effective_date, MAX_RATE_PCT
                    )));
                }
            }
            if seniority.tiers.iter().any(|t| out_of_range(t.rate)) {
                return Err(invalid(&format!(
                    "table {}: seniority rates must be between 0 and {}",
                    table.effective_date, MAX_RATE_PCT
                )));
            }
            if table.provisions.iter().any(|p| out_of_range(p.rate)) {
                return Err(invalid(&format!(
                    "table {}: provision rates must be between 0 and {}",
                    table.effective_date, MAX_RATE_PCT
                )));
            }
        }
        Ok(())
    }

    /// Returns the rule-set metadata.
    pub fn metadata(&self) -> &RuleSetMetadata {
        &self.metadata
    }

    /// Returns the employer-charge percentage.
    pub fn employer_charge_rate(&self) -> Decimal {
        self.employer_charge_rate
    }

    /// Returns the duplicate identifier policy.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Returns the largest amount accepted in an uploaded row.
    pub fn max_amount(&self) -> Decimal {
        self.max_amount
    }

    /// Returns the absence analytics settings.
    pub fn absence(&self) -> &AbsenceSettings {
        &self.absence
    }

    /// Returns the configured job levels.
    pub fn levels(&self) -> &[JobLevel] {
        &self.levels
    }

    /// Returns true if `code` is one of the configured job levels.
    pub fn has_level(&self, code: &str) -> bool {
        self.levels.iter().any(|level| level.code == code)
    }

    /// Returns all formula tables, oldest first.
    pub fn tables(&self) -> &[FormulaTable] {
        &self.tables
    }

    /// Returns the most recent formula table effective on or before `date`.
    pub fn rules_for(&self, date: NaiveDate) -> EngineResult<&FormulaTable> {
        self.tables
            .iter()
            .rfind(|table| table.effective_date <= date)
            .ok_or(EngineError::RulesNotFound { date })
    }

    /// Assembles the calculation configuration in force on `date`.
    pub fn payroll_config(&self, date: NaiveDate) -> EngineResult<PayrollConfig> {
        let table = self.rules_for(date)?;
        Ok(PayrollConfig {
            employer_charge_rate: self.employer_charge_rate,
            reference_date: date,
            seniority: table.seniority.clone(),
            provisions: table.provisions.clone(),
        })
    }
}

fn invalid(message: &str) -> EngineError {
    EngineError::InvalidConfig {
        message: message.to_string(),
    }
}
