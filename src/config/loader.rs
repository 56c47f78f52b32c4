//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! rule sets from YAML files.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{FormulaTable, JobLevel, PayrollConfig, RuleSet, RuleSetFile};

/// Loads and provides access to a payroll rule set.
///
/// # Directory Structure
///
/// ```text
/// config/bolivia/
/// ├── ruleset.yaml        # Metadata, employer charges, levels, policies
/// └── rules/
///     ├── 2024-05-01.yaml # Formula table effective from this date
///     └── 2025-05-01.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("./config/bolivia").unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let config = loader.payroll_config(date).unwrap();
/// println!("Employer charges: {}%", config.employer_charge_rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: RuleSet,
}

impl ConfigLoader {
    /// Loads a rule set from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `ruleset.yaml` or the `rules/` directory is missing
    /// - Any file contains invalid YAML
    /// - The loaded values are inconsistent (`InvalidConfig`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<RuleSetFile>(&path.join("ruleset.yaml"))?;
        let tables = Self::load_tables(&path.join("rules"))?;

        let rules = RuleSet::new(settings, tables);
        rules.validate()?;

        tracing::debug!(
            jurisdiction = %rules.metadata().jurisdiction,
            version = %rules.metadata().version,
            tables = rules.tables().len(),
            "Loaded payroll rule set"
        );

        Ok(Self { rules })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all formula tables from the rules directory.
    fn load_tables(rules_dir: &Path) -> EngineResult<Vec<FormulaTable>> {
        let rules_dir_str = rules_dir.display().to_string();

        let entries = fs::read_dir(rules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rules_dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rules_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<FormulaTable>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rule files found)", rules_dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the loaded rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Consumes the loader, returning the rule set.
    pub fn into_rules(self) -> RuleSet {
        self.rules
    }

    /// Gets a job level by its code.
    pub fn get_level(&self, code: &str) -> Option<&JobLevel> {
        self.rules.levels().iter().find(|level| level.code == code)
    }

    /// Gets the calculation configuration in force on `date`.
    pub fn payroll_config(&self, date: NaiveDate) -> EngineResult<PayrollConfig> {
        self.rules.payroll_config(date)
    }
}
