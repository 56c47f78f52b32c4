//! Record validation.
//!
//! Checks normalized records for required fields, numeric sanity, level
//! membership and duplicate identifiers. Validation never fails: it
//! partitions the batch into valid records and a list of issues, and the
//! caller decides whether to proceed.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DuplicatePolicy, RuleSet};
use crate::error::ParseError;
use crate::models::Employee;
use crate::normalize::NormalizedBatch;

/// What a validation issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required field is blank.
    MissingRequiredField,
    /// A numeric or date cell could not be parsed.
    NonNumeric,
    /// Another record shares the identifier.
    DuplicateIdentifier,
    /// A pay amount is negative.
    NegativePay,
    /// An amount exceeds the rule set's maximum.
    AmountOutOfRange,
    /// The job level is not in the configured level set.
    UnknownLevel,
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The record is excluded from calculation.
    Error,
    /// The record is kept; the issue is informational.
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The 0-based index of the source row.
    pub row: usize,
    /// The field (canonical name or raw column) the issue concerns.
    pub field: String,
    /// Issue category.
    pub kind: IssueKind,
    /// Whether the record was excluded.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl From<ParseError> for ValidationIssue {
    fn from(error: ParseError) -> Self {
        ValidationIssue {
            row: error.row,
            field: error.column.clone(),
            kind: IssueKind::NonNumeric,
            severity: Severity::Error,
            message: error.to_string(),
        }
    }
}

/// The partition of a batch into valid records and issues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of rows handed to normalization.
    pub rows_received: usize,
    /// Records that may be calculated, in input order.
    pub valid: Vec<Employee>,
    /// Every issue found, ordered by row.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Number of rows excluded from calculation.
    pub fn rejected_count(&self) -> usize {
        self.rows_received - self.valid.len()
    }

    /// Returns true if any issue excluded a record.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Issues of a given kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }
}

/// Validates normalized records against a rule set.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    rules: &'a RuleSet,
    duplicate_policy: DuplicatePolicy,
}

impl<'a> Validator<'a> {
    /// Creates a validator using the rule set's duplicate policy.
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            duplicate_policy: rules.duplicate_policy(),
        }
    }

    /// Overrides the duplicate policy for this validator.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Validates a normalized batch.
    ///
    /// Parse errors from normalization become `NonNumeric` issues. Duplicate
    /// detection only considers records that passed every other check.
    pub fn validate(&self, batch: NormalizedBatch) -> ValidationReport {
        let mut issues: Vec<ValidationIssue> =
            batch.errors.into_iter().map(ValidationIssue::from).collect();

        let mut candidates = Vec::with_capacity(batch.employees.len());
        for employee in batch.employees {
            let record_issues = self.check_record(&employee);
            let rejected = record_issues.iter().any(|i| i.severity == Severity::Error);
            issues.extend(record_issues);
            if !rejected {
                candidates.push(employee);
            }
        }

        let valid = self.apply_duplicate_policy(candidates, &mut issues);

        issues.sort_by_key(|issue| issue.row);

        ValidationReport {
            rows_received: batch.rows_received,
            valid,
            issues,
        }
    }

    fn check_record(&self, employee: &Employee) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut error = |field: &str, kind: IssueKind, message: String| {
            issues.push(ValidationIssue {
                row: employee.row,
                field: field.to_string(),
                kind,
                severity: Severity::Error,
                message,
            });
        };

        if employee.id.is_empty() {
            error(
                "id",
                IssueKind::MissingRequiredField,
                "identifier is blank".to_string(),
            );
        }

        if employee.level.is_empty() {
            error(
                "level",
                IssueKind::MissingRequiredField,
                "job level is blank".to_string(),
            );
        } else if !self.rules.has_level(&employee.level) {
            error(
                "level",
                IssueKind::UnknownLevel,
                format!("job level '{}' is not configured", employee.level),
            );
        }

        if employee.basic_pay.is_none() {
            error(
                "basic_pay",
                IssueKind::MissingRequiredField,
                "basic pay is blank".to_string(),
            );
        }

        let max_amount = self.rules.max_amount();
        let amounts = employee
            .basic_pay
            .map(|pay| ("basic_pay", "basic pay", pay))
            .into_iter()
            .chain([
                ("seniority_bonus", "seniority_bonus", employee.seniority_bonus),
                ("other_bonuses", "other_bonuses", employee.other_bonuses),
                ("absence_days", "absence_days", employee.absence_days),
            ]);
        for (field, label, amount) in amounts {
            if amount < Decimal::ZERO {
                error(
                    field,
                    IssueKind::NegativePay,
                    format!("{} {} is negative", label, amount),
                );
            } else if amount > max_amount {
                error(
                    field,
                    IssueKind::AmountOutOfRange,
                    format!("{} {} exceeds the maximum of {}", label, amount, max_amount),
                );
            }
        }

        issues
    }

    fn apply_duplicate_policy(
        &self,
        candidates: Vec<Employee>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Vec<Employee> {
        let mut occurrences: HashMap<String, Vec<usize>> = HashMap::new();
        for employee in &candidates {
            occurrences
                .entry(employee.id.clone())
                .or_default()
                .push(employee.row);
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut valid = Vec::with_capacity(candidates.len());

        for mut employee in candidates {
            let rows = &occurrences[&employee.id];
            if rows.len() < 2 {
                valid.push(employee);
                continue;
            }

            let position = seen.entry(employee.id.clone()).or_insert(0);
            let first_row = rows[0];
            *position += 1;
            let other_rows: Vec<String> = rows
                .iter()
                .filter(|row| **row != employee.row)
                .map(|row| row.to_string())
                .collect();

            let (keep, severity) = match self.duplicate_policy {
                DuplicatePolicy::Flag => (true, Severity::Warning),
                DuplicatePolicy::KeepFirst if *position == 1 => (true, Severity::Warning),
                DuplicatePolicy::KeepFirst => (false, Severity::Error),
                DuplicatePolicy::Reject => (false, Severity::Error),
            };

            let message = match (self.duplicate_policy, keep) {
                (DuplicatePolicy::KeepFirst, false) => format!(
                    "identifier '{}' already used on row {}; record dropped",
                    employee.id, first_row
                ),
                (_, false) => format!(
                    "identifier '{}' also used on rows {}; all occurrences rejected",
                    employee.id,
                    other_rows.join(", ")
                ),
                (_, true) => format!(
                    "identifier '{}' also used on rows {}",
                    employee.id,
                    other_rows.join(", ")
                ),
            };

            issues.push(ValidationIssue {
                row: employee.row,
                field: "id".to_string(),
                kind: IssueKind::DuplicateIdentifier,
                severity,
                message,
            });

            if keep {
                employee.duplicate = true;
                valid.push(employee);
            }
        }

        valid
    }
}
