//! Core types for the mapline pipeline.
//!
//! Partner configurations are parsed from JSON with explicit, exhaustive
//! validation; every downstream crate consumes the typed model defined here.

pub mod config;
pub mod error;
mod fields;
pub mod lint;
pub mod processing;
pub mod specs;
pub mod validation;
pub mod value;

pub use config::{
    ColumnMapping, ColumnType, FieldFilter, FileFormat, PartnerConfig, SheetConfig, SourceConfig,
    normalize_partner_id,
};
pub use error::{ConfigValidationError, FieldError};
pub use processing::{FileReport, FileState, PartnerReport, RunReport, TableReport};
pub use specs::{FilterSpec, GlobalTransformation, TransformationSpec};
pub use validation::{ValidationIssue, ValidationResult};
pub use value::Value;
