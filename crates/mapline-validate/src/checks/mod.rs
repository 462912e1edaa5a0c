//! Validation check modules.
//!
//! Each module performs a specific type of validation check.

mod generic;
mod table;

pub use generic::MAX_VALUE_CHARS;

use polars::prelude::DataFrame;

use mapline_model::ValidationResult;

use crate::rules::TableRules;
use crate::util::CaseInsensitiveSet;

/// Run the checks registered for one target table.
pub fn run_table(rules: &TableRules, df: &DataFrame, result: &mut ValidationResult) {
    let columns = build_column_lookup(df);

    // 1. Required fields (presence + population)
    table::required(rules, df, &columns, result);

    // 2. Uniqueness
    for rule in rules.unique {
        table::unique(rule, df, &columns, result);
    }

    // 3. Closed value sets
    for rule in rules.allowed {
        table::allowed(rule, df, &columns, result);
    }

    // 4. Numeric bounds
    for rule in rules.ranges {
        table::range(rule, df, &columns, result);
    }
}

/// Run the checks every table gets.
pub fn run_generic(df: &DataFrame, result: &mut ValidationResult) {
    generic::empty_rows(df, result);
    generic::null_columns(df, result);
    generic::mixed_types(df, result);
    generic::long_values(df, result);
}

/// Build case-insensitive column name lookup.
fn build_column_lookup(df: &DataFrame) -> CaseInsensitiveSet {
    CaseInsensitiveSet::from_names(df.get_column_names_owned())
}
