//! Non-fatal checks on a loaded partner configuration.

use std::collections::BTreeSet;

use crate::config::PartnerConfig;
use crate::specs::TransformationSpec;

/// Fields every `orders` sheet is expected to map.
pub const ORDERS_EXPECTED_FIELDS: &[&str] = &["order_id", "order_date", "outlet_id"];

impl PartnerConfig {
    /// Business-rule warnings; a config with warnings still loads and runs.
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for sheet in &self.source_config.sheets_config {
            let mut seen = BTreeSet::new();
            for mapping in &sheet.column_mappings {
                if !seen.insert(mapping.system_column.as_str()) {
                    warnings.push(format!(
                        "Duplicate system column '{}' in sheet '{}'",
                        mapping.system_column, sheet.sheet_name
                    ));
                }
            }
            if sheet.target_table == "orders" {
                for field in ORDERS_EXPECTED_FIELDS {
                    if !seen.contains(field) {
                        warnings.push(format!(
                            "Required field '{field}' not mapped in orders table (sheet '{}')",
                            sheet.sheet_name
                        ));
                    }
                }
            }
            for mapping in &sheet.column_mappings {
                let has_date_format = mapping
                    .transformations
                    .iter()
                    .any(|t| matches!(t, TransformationSpec::DateFormat { .. }));
                if mapping.column_type.is_temporal() && !has_date_format {
                    warnings.push(format!(
                        "Date/datetime column '{}' has no date_format transformation",
                        mapping.system_column
                    ));
                }
            }
            for mapping in &sheet.column_mappings {
                for spec in &mapping.transformations {
                    if let TransformationSpec::Unrecognized { tag } = spec {
                        warnings.push(format!(
                            "Unknown transformation type '{tag}' on column '{}'",
                            mapping.system_column
                        ));
                    }
                }
            }
        }
        warnings
    }
}
