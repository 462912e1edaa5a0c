//! Field mapping, type coercion, and row shaping.
//!
//! A located raw table goes through [`transform_sheet`]: every mapping
//! pulls its source column, runs the transformation chain, and coerces the
//! result to the target type; global transformations and filters then
//! shape the rows.

pub mod coerce;
pub mod dates;
pub mod error;
pub mod filters;
pub mod global;
pub mod mapper;
pub mod pipeline;
pub mod transformations;
pub mod values;

pub use coerce::{coerce_column, constant_column, to_bool};
pub use dates::{parse_temporal, parse_with_format};
pub use error::{Result, TransformError};
pub use filters::{apply_filters, value_matches};
pub use global::{apply_global_transformations, remove_duplicates, remove_empty_rows};
pub use mapper::{MappedTable, map_columns};
pub use pipeline::{TransformOutcome, transform_sheet};
pub use transformations::{apply_transformation, apply_transformations, to_number};
pub use values::{any_to_value, column_values, row_values};
