//! Shared utilities for mapline crates.
//!
//! This crate provides common utilities used across the workspace,
//! mostly Polars `AnyValue` conversions and column builders.

pub mod polars;

pub use polars::{
    any_is_null, any_to_f64, any_to_string, any_to_string_opt, format_numeric,
    parse_f64, parse_i64, string_column,
};
