//! Validation entry points.

use polars::prelude::DataFrame;
use tracing::debug;

use mapline_model::ValidationResult;

use crate::checks;
use crate::rules::{TableRules, rules_for};

/// Validates one mapped table for a target table name.
pub trait Validator: Send + Sync {
    fn validate(&self, df: &DataFrame, target_table: &str) -> ValidationResult;
}

/// Built-in validator: registered table rules followed by generic checks.
///
/// Tables without registered rules only get the generic checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rules that apply to `target_table`, if any are registered.
    pub fn rules(&self, target_table: &str) -> Option<&'static TableRules> {
        rules_for(target_table)
    }
}

impl Validator for RuleEngine {
    fn validate(&self, df: &DataFrame, target_table: &str) -> ValidationResult {
        if df.height() == 0 || df.width() == 0 {
            let mut result = ValidationResult::new(df.height(), 0);
            result.add_warning("DataFrame is empty");
            return result;
        }

        let mut result = ValidationResult::new(df.height(), df.width());
        if let Some(rules) = self.rules(target_table) {
            checks::run_table(rules, df, &mut result);
        }
        checks::run_generic(df, &mut result);

        debug!(
            table = %target_table,
            valid = result.valid,
            errors = result.error_count(),
            warnings = result.warning_count(),
            "validation complete"
        );
        result
    }
}
