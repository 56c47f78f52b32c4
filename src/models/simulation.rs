//! Simulation input and output models.
//!
//! This module contains the [`SimulationParams`] policy for a what-if run
//! and the immutable [`SimulatedEmployee`] records it produces.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{MAX_CALCULABLE_AMOUNT, MAX_RATE_PCT, MONEY_DP};
use crate::error::{EngineError, EngineResult};

use super::calculation_result::{AuditStep, PayBreakdown};

/// The level code that makes every level eligible.
pub const ALL_LEVELS: &str = "Todos";

/// The job levels eligible for the percentage increase.
///
/// Serialized as a list of level codes; a list containing `"Todos"` means
/// every level.
///
/// # Example
///
/// ```
/// use payroll_engine::models::EligibleLevels;
///
/// let levels: EligibleLevels = serde_json::from_str(r#"["N1", "N2"]"#).unwrap();
/// assert!(levels.contains("N1"));
/// assert!(!levels.contains("N5"));
///
/// let all: EligibleLevels = serde_json::from_str(r#"["Todos"]"#).unwrap();
/// assert!(all.contains("N5"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum EligibleLevels {
    /// Every level is eligible.
    All,
    /// Only the listed levels are eligible.
    Only(BTreeSet<String>),
}

impl EligibleLevels {
    /// Returns true if `level` is eligible.
    pub fn contains(&self, level: &str) -> bool {
        match self {
            EligibleLevels::All => true,
            EligibleLevels::Only(levels) => levels.contains(level.trim()),
        }
    }

    /// Builds an eligibility set from level codes.
    pub fn only<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from(levels.into_iter().map(Into::into).collect::<Vec<String>>())
    }
}

impl From<Vec<String>> for EligibleLevels {
    fn from(levels: Vec<String>) -> Self {
        if levels.iter().any(|level| level.trim() == ALL_LEVELS) {
            return EligibleLevels::All;
        }
        EligibleLevels::Only(levels.into_iter().map(|l| l.trim().to_string()).collect())
    }
}

impl From<EligibleLevels> for Vec<String> {
    fn from(levels: EligibleLevels) -> Self {
        match levels {
            EligibleLevels::All => vec![ALL_LEVELS.to_string()],
            EligibleLevels::Only(levels) => levels.into_iter().collect(),
        }
    }
}

/// The policy for one what-if simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// New statutory minimum wage; floor for every projected basic pay.
    pub new_minimum_wage: Decimal,
    /// Government-mandated increase, in percent.
    pub government_pct: Decimal,
    /// Additional company increase, in percent.
    pub company_pct: Decimal,
    /// Levels that receive the percentage increase.
    pub eligible_levels: EligibleLevels,
}

impl SimulationParams {
    /// Checks the parameters before a run starts.
    ///
    /// The minimum wage must be a positive amount in whole cents, so a
    /// floored basic pay equals it exactly.
    pub fn validate(&self) -> EngineResult<()> {
        if self.new_minimum_wage <= Decimal::ZERO {
            return Err(invalid_param("new_minimum_wage", "must be greater than zero"));
        }
        if self.new_minimum_wage.normalize().scale() > MONEY_DP {
            return Err(invalid_param(
                "new_minimum_wage",
                "must not have more than two decimal places",
            ));
        }
        if self.new_minimum_wage > MAX_CALCULABLE_AMOUNT {
            return Err(invalid_param(
                "new_minimum_wage",
                &format!("must not exceed {}", MAX_CALCULABLE_AMOUNT),
            ));
        }
        for (field, pct) in [
            ("government_pct", self.government_pct),
            ("company_pct", self.company_pct),
        ] {
            if pct < Decimal::ZERO {
                return Err(invalid_param(field, "must not be negative"));
            }
            if pct > MAX_RATE_PCT {
                return Err(invalid_param(field, &format!("must not exceed {}%", MAX_RATE_PCT)));
            }
        }
        Ok(())
    }

    /// The combined percentage granted to eligible levels.
    pub fn total_pct(&self) -> Decimal {
        self.government_pct + self.company_pct
    }
}

fn invalid_param(field: &str, message: &str) -> EngineError {
    EngineError::InvalidParams {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// The change of one amount between the current and projected period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Projected minus current.
    pub delta: Decimal,
    /// Delta as a percentage of the current value; zero when current is zero.
    pub pct: Decimal,
}

/// Variations of every amount in a [`PayBreakdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayVariation {
    /// Basic pay variation.
    pub basic_pay: Variation,
    /// Seniority bonus variation.
    pub seniority_bonus: Variation,
    /// Total earned variation.
    pub total_earned: Variation,
    /// Employer charges variation.
    pub employer_charges: Variation,
    /// Provisions variation.
    pub provisions: Variation,
    /// Total cost variation.
    pub total_cost: Variation,
}

/// The mechanism behind a projected raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncreaseMechanism {
    /// Raised by the government/company percentage.
    PercentageIncrease,
    /// Raised to the new minimum wage.
    MinimumWageFloor,
    /// Basic pay unchanged.
    Unchanged,
}

/// An employee projected under a [`SimulationParams`] policy.
///
/// Both the current and the projected totals are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedEmployee {
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
    /// Percentage applied to basic pay (zero when the level is not eligible).
    pub percentage_increase: Decimal,
    /// Raised by the percentage and not overridden by the floor.
    pub receives_percentage_increase: bool,
    /// Raised to the new minimum wage.
    pub floored_to_minimum_wage: bool,
    /// Current-period totals.
    pub current: PayBreakdown,
    /// Projected totals.
    pub projected: PayBreakdown,
    /// Projected minus current, per amount.
    pub variation: PayVariation,
    /// Audit trail of the projection.
    pub audit_steps: Vec<AuditStep>,
}

impl SimulatedEmployee {
    /// The change in total cost for this employee.
    pub fn delta_total_cost(&self) -> Decimal {
        self.variation.total_cost.delta
    }

    /// The mechanism behind this employee's raise.
    pub fn mechanism(&self) -> IncreaseMechanism {
        if self.floored_to_minimum_wage {
            IncreaseMechanism::MinimumWageFloor
        } else if self.receives_percentage_increase {
            IncreaseMechanism::PercentageIncrease
        } else {
            IncreaseMechanism::Unchanged
        }
    }
}
