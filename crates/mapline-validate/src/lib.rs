//! Validation of mapped partner tables.
//!
//! [`RuleEngine`] runs the rules registered for a target table (required
//! fields, uniqueness, closed value sets, numeric bounds) and then generic
//! checks that apply to any table. Missing or null required fields are
//! errors; everything else is a warning.

pub mod checks;
pub mod engine;
pub mod rules;
pub mod util;

pub use engine::{RuleEngine, Validator};
pub use rules::{
    AllowedValues, ORDER_STATUSES, PAYMENT_METHODS, RangeRule, TABLE_RULES, TableRules,
    UniqueRule, known_tables, rules_for,
};
pub use util::CaseInsensitiveSet;
