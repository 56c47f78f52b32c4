//! Pay equity analytics: dispersion of basic pay per level and the gender
//! pay gap.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::calculation::{percentage_variation, round_money};
use crate::models::{Employee, Gender};

/// Basic pay dispersion within one job level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEquity {
    /// Job level code.
    pub level: String,
    /// Employees in the level.
    pub headcount: usize,
    /// Lowest basic pay.
    pub min: Decimal,
    /// Highest basic pay.
    pub max: Decimal,
    /// Mean basic pay.
    pub mean: Decimal,
    /// Median basic pay.
    pub median: Decimal,
    /// Highest over lowest basic pay; zero when the lowest is zero.
    pub max_min_ratio: Decimal,
    /// Population standard deviation over the mean, in percent.
    pub coefficient_of_variation: Decimal,
}

/// Mean basic pay by gender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderGap {
    /// Employees recorded as female.
    pub female_count: usize,
    /// Employees recorded as male.
    pub male_count: usize,
    /// Mean basic pay of female employees.
    pub mean_female: Option<Decimal>,
    /// Mean basic pay of male employees.
    pub mean_male: Option<Decimal>,
    /// `(mean_male - mean_female) / mean_male * 100`, when both groups exist.
    pub gap_pct: Option<Decimal>,
}

/// Equity analytics over a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquityReport {
    /// Per-level dispersion, ordered by level code.
    pub by_level: Vec<LevelEquity>,
    /// Gender pay gap.
    pub gender_gap: GenderGap,
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Median of sorted values.
fn median(sorted: &[Decimal]) -> Decimal {
    let n = sorted.len();
    match n {
        0 => Decimal::ZERO,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO,
    }
}

fn coefficient_of_variation(values: &[Decimal], mean: Decimal) -> Decimal {
    if mean.is_zero() || values.is_empty() {
        return Decimal::ZERO;
    }
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len());
    let std_dev = variance.sqrt().unwrap_or(Decimal::ZERO);
    round_money(std_dev / mean * Decimal::ONE_HUNDRED)
}

fn level_equity(level: &str, mut pays: Vec<Decimal>) -> LevelEquity {
    pays.sort();
    let min = pays.first().copied().unwrap_or(Decimal::ZERO);
    let max = pays.last().copied().unwrap_or(Decimal::ZERO);
    let raw_mean = mean(&pays);

    LevelEquity {
        level: level.to_string(),
        headcount: pays.len(),
        min,
        max,
        mean: round_money(raw_mean),
        median: round_money(median(&pays)),
        max_min_ratio: if min.is_zero() {
            Decimal::ZERO
        } else {
            round_money(max / min)
        },
        coefficient_of_variation: coefficient_of_variation(&pays, raw_mean),
    }
}

fn gender_gap(employees: &[Employee]) -> GenderGap {
    let pays_of = |gender: Gender| -> Vec<Decimal> {
        employees
            .iter()
            .filter(|e| e.gender == Some(gender))
            .filter_map(|e| e.basic_pay)
            .collect()
    };
    let female = pays_of(Gender::Female);
    let male = pays_of(Gender::Male);

    let mean_female = (!female.is_empty()).then(|| round_money(mean(&female)));
    let mean_male = (!male.is_empty()).then(|| round_money(mean(&male)));
    let gap_pct = match (mean_female, mean_male) {
        (Some(f), Some(m)) if !m.is_zero() => Some(percentage_variation(m - f, m)),
        _ => None,
    };

    GenderGap {
        female_count: female.len(),
        male_count: male.len(),
        mean_female,
        mean_male,
        gap_pct,
    }
}

/// Computes pay equity analytics over the employees' basic pay.
///
/// Employees without a basic pay are ignored.
pub fn equity_report(employees: &[Employee]) -> EquityReport {
    let mut by_level: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
    for employee in employees {
        if let Some(pay) = employee.basic_pay {
            by_level.entry(employee.level.as_str()).or_default().push(pay);
        }
    }

    EquityReport {
        by_level: by_level
            .into_iter()
            .map(|(level, pays)| level_equity(level, pays))
            .collect(),
        gender_gap: gender_gap(employees),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(level: &str, pay: &str, gender: Option<Gender>) -> Employee {
        let mut employee = Employee::new(0, "1", level);
        employee.basic_pay = Some(dec(pay));
        employee.gender = gender;
        employee
    }

    #[test]
    fn test_level_statistics() {
        let employees = vec![
            employee("N1", "3000", None),
            employee("N1", "4000", None),
            employee("N1", "5000", None),
            employee("N2", "6000", None),
        ];
        let report = equity_report(&employees);

        assert_eq!(report.by_level.len(), 2);
        let n1 = &report.by_level[0];
        assert_eq!(n1.level, "N1");
        assert_eq!(n1.headcount, 3);
        assert_eq!(n1.min, dec("3000"));
        assert_eq!(n1.max, dec("5000"));
        assert_eq!(n1.mean, dec("4000"));
        assert_eq!(n1.median, dec("4000"));
        assert_eq!(n1.max_min_ratio, dec("1.67"));
        // sqrt(2000000 / 3) = 816.50; / 4000 = 20.41%
        assert_eq!(n1.coefficient_of_variation, dec("20.41"));
    }

    #[test]
    fn test_even_median() {
        let employees = vec![employee("N1", "3000", None), employee("N1", "3500", None)];
        let report = equity_report(&employees);
        assert_eq!(report.by_level[0].median, dec("3250"));
    }

    #[test]
    fn test_single_employee_has_no_dispersion() {
        let report = equity_report(&[employee("N3", "4200", None)]);
        assert_eq!(report.by_level[0].coefficient_of_variation, Decimal::ZERO);
        assert_eq!(report.by_level[0].max_min_ratio, dec("1"));
    }

    #[test]
    fn test_zero_minimum_gives_zero_ratio() {
        let employees = vec![employee("N1", "0", None), employee("N1", "3000", None)];
        let report = equity_report(&employees);
        assert_eq!(report.by_level[0].max_min_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_gender_gap() {
        let employees = vec![
            employee("N1", "3600", Some(Gender::Female)),
            employee("N1", "4000", Some(Gender::Male)),
            employee("N1", "4000", None),
        ];
        let gap = equity_report(&employees).gender_gap;

        assert_eq!(gap.female_count, 1);
        assert_eq!(gap.male_count, 1);
        assert_eq!(gap.mean_female, Some(dec("3600")));
        assert_eq!(gap.gap_pct, Some(dec("10.00")));
    }

    #[test]
    fn test_gender_gap_needs_both_groups() {
        let gap = equity_report(&[employee("N1", "3600", Some(Gender::Female))]).gender_gap;
        assert_eq!(gap.gap_pct, None);
        assert_eq!(gap.mean_male, None);
    }
}
