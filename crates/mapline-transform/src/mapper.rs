//! Field mapping from raw source columns to canonical fields.

use polars::prelude::*;
use tracing::{debug, warn};

use mapline_model::ColumnMapping;

use crate::coerce::{coerce_column, constant_column};
use crate::error::{Result, TransformError};
use crate::transformations::apply_transformations;
use crate::values::column_values;

/// Output of [`map_columns`].
#[derive(Debug, Clone)]
pub struct MappedTable {
    pub frame: DataFrame,
    pub warnings: Vec<String>,
}

/// Builds the canonical table for one sheet.
///
/// The output holds exactly the mapped fields in mapping order. A field
/// mapped twice keeps its first position and the later mapping's values.
///
/// # Errors
///
/// [`TransformError::RequiredColumnMissing`] when a required source column
/// is absent and has no default.
pub fn map_columns(df: &DataFrame, mappings: &[ColumnMapping]) -> Result<MappedTable> {
    let height = df.height();
    let mut columns: Vec<Column> = Vec::with_capacity(mappings.len());
    let mut warnings = Vec::new();

    for mapping in mappings {
        let target = mapping.system_column.as_str();
        let column = match find_source_column(df, &mapping.source_column) {
            Some(source) => {
                let (values, step_warnings) = apply_transformations(
                    column_values(source),
                    &mapping.transformations,
                    target,
                );
                warnings.extend(step_warnings);
                coerce_column(
                    target,
                    &values,
                    mapping.column_type,
                    mapping.default_value.as_ref(),
                )?
            }
            None if mapping.required => match &mapping.default_value {
                Some(default) => {
                    warn!(
                        source_column = %mapping.source_column,
                        system_column = %target,
                        "required column missing, using default"
                    );
                    warnings.push(format!(
                        "Required column '{}' not found, using default value",
                        mapping.source_column
                    ));
                    constant_column(target, default, mapping.column_type, height)?
                }
                None => {
                    return Err(TransformError::RequiredColumnMissing {
                        source_column: mapping.source_column.clone(),
                        system_column: target.to_string(),
                    });
                }
            },
            None => {
                debug!(source_column = %mapping.source_column, "optional column absent");
                continue;
            }
        };

        if let Some(existing) = columns.iter_mut().find(|c| c.name().as_str() == target) {
            warnings.push(format!(
                "Duplicate target column '{target}': source '{}' replaces earlier mapping",
                mapping.source_column
            ));
            *existing = column;
        } else {
            columns.push(column);
        }
    }

    let frame = if columns.is_empty() {
        DataFrame::empty()
    } else {
        DataFrame::new(columns)?
    };
    Ok(MappedTable { frame, warnings })
}

/// Finds a source column by exact name, then by whitespace-collapsed name.
fn find_source_column<'a>(df: &'a DataFrame, source: &str) -> Option<&'a Column> {
    if let Ok(column) = df.column(source) {
        return Some(column);
    }
    let wanted = collapse_whitespace(source);
    df.get_columns()
        .iter()
        .find(|c| collapse_whitespace(c.name().as_str()) == wanted)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapline_model::{ColumnType, TransformationSpec, Value};

    fn mapping(source: &str, target: &str, column_type: ColumnType) -> ColumnMapping {
        ColumnMapping {
            source_column: source.to_string(),
            system_column: target.to_string(),
            column_type,
            required: true,
            default_value: None,
            transformations: Vec::new(),
        }
    }

    fn raw() -> DataFrame {
        df! {
            "Order ID" => ["A1", "A2"],
            "Qty" => ["2", "x"],
        }
        .unwrap()
    }

    #[test]
    fn maps_in_mapping_order() {
        let mappings = vec![
            mapping("Qty", "quantity", ColumnType::Integer),
            mapping("Order  ID", "order_id", ColumnType::String),
        ];
        let mapped = map_columns(&raw(), &mappings).unwrap();
        let names: Vec<&str> = mapped
            .frame
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["quantity", "order_id"]);
        let qty: Vec<Option<i64>> = mapped
            .frame
            .column("quantity")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(qty, vec![Some(2), Some(0)]);
        assert!(mapped.warnings.is_empty());
    }

    #[test]
    fn duplicate_targets_keep_first_position() {
        let mut second = mapping("Qty", "order_id", ColumnType::String);
        second.transformations = vec![TransformationSpec::Lowercase];
        let mappings = vec![mapping("Order ID", "order_id", ColumnType::String), second];
        let mapped = map_columns(&raw(), &mappings).unwrap();
        assert_eq!(mapped.frame.width(), 1);
        let values: Vec<Option<&str>> = mapped
            .frame
            .column("order_id")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some("2"), Some("x")]);
        assert_eq!(mapped.warnings.len(), 1);
    }

    #[test]
    fn required_default_fills_constant() {
        let mut status = mapping("Status", "order_status", ColumnType::String);
        status.default_value = Some(Value::Str("delivered".into()));
        let mapped = map_columns(&raw(), &[status]).unwrap();
        assert_eq!(mapped.frame.height(), 2);
        assert_eq!(
            mapped.warnings,
            vec!["Required column 'Status' not found, using default value".to_string()]
        );
    }
}
