//! Partner configuration model.
//!
//! A [`PartnerConfig`] is parsed from raw JSON by [`PartnerConfig::from_json`],
//! which walks the whole document and reports every violated field path at
//! once. Derived values (the data start row) are computed here so downstream
//! code never needs to re-derive them.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::error::{ConfigValidationError, ErrorCollector};
use crate::fields::{
    Object, as_object, child, index, optional_array, optional_bool, optional_int, optional_string,
    required_string, string_list,
};
use crate::specs::{FilterSpec, GlobalTransformation, TransformationSpec};
use crate::value::Value;

/// Physical layout of partner files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Spreadsheet workbooks.
    Excel,
    /// Delimited text.
    Csv,
    /// Structured text (JSON records).
    Json,
}

impl FileFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "excel" => Some(FileFormat::Excel),
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Excel => "excel",
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
        }
    }
}

/// Target type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Decimal,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Boolean,
}

impl ColumnType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "string" => Some(ColumnType::String),
            "integer" => Some(ColumnType::Integer),
            "float" => Some(ColumnType::Float),
            "decimal" => Some(ColumnType::Decimal),
            "date" => Some(ColumnType::Date),
            "datetime" => Some(ColumnType::DateTime),
            "boolean" => Some(ColumnType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Boolean => "boolean",
        }
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }
}

const COLUMN_TYPE_NAMES: &str = "string, integer, float, decimal, date, datetime, boolean";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMapping {
    pub source_column: String,
    pub system_column: String,
    pub column_type: ColumnType,
    pub required: bool,
    pub default_value: Option<Value>,
    pub transformations: Vec<TransformationSpec>,
}

/// A filter bound to the field it tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub spec: FilterSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetConfig {
    /// Sheet name for workbooks; file name or stem for text files.
    pub sheet_name: String,
    pub target_table: String,
    /// 1-based row holding the header.
    pub headers_row: usize,
    /// 1-based first data row; always greater than `headers_row`.
    pub data_start_row: usize,
    /// 1-based rows excluded from the data region.
    pub skip_rows: Vec<usize>,
    /// When set, the header row is located by content instead of position.
    pub header_columns: Option<Vec<String>>,
    pub column_mappings: Vec<ColumnMapping>,
    pub filters: Vec<FieldFilter>,
}

impl SheetConfig {
    /// Layout for files with no explicit sheet config: header on row 1.
    pub fn default_layout(sheet_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            target_table: String::new(),
            headers_row: 1,
            data_start_row: 2,
            skip_rows: Vec::new(),
            header_columns: None,
            column_mappings: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// True when this config names the given sheet, file name, or file stem.
    pub fn matches_name(&self, name: &str) -> bool {
        let wanted = self.sheet_name.trim();
        if wanted == name {
            return true;
        }
        let stem = std::path::Path::new(wanted)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(wanted);
        stem == name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceConfig {
    pub file_format: FileFormat,
    /// Encoding label for text formats, e.g. `utf-8` or `windows-1252`.
    pub encoding: String,
    pub sheets_config: Vec<SheetConfig>,
    pub global_transformations: Vec<GlobalTransformation>,
}

impl SourceConfig {
    /// First sheet config whose name matches `name`.
    pub fn sheet_for(&self, name: &str) -> Option<&SheetConfig> {
        self.sheets_config.iter().find(|s| s.matches_name(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerConfig {
    /// Lowercase identifier; ASCII alphanumerics, `-` and `_` only.
    pub partner_id: String,
    pub partner_name: String,
    pub template_id: String,
    pub description: Option<String>,
    pub version: String,
    pub metadata: Map<String, Json>,
    pub source_config: SourceConfig,
}

impl PartnerConfig {
    /// Parse and validate a partner configuration document.
    ///
    /// # Errors
    ///
    /// Returns every violated field path when the document is invalid.
    pub fn from_json(value: &Json) -> Result<Self, ConfigValidationError> {
        let mut errors = ErrorCollector::default();
        let parsed = parse_partner(value, &mut errors);
        errors.finish_parsed(parsed)
    }

    /// Parse from JSON text; syntax errors are reported as a single field error.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigValidationError> {
        let value: Json = serde_json::from_str(text).map_err(|err| ConfigValidationError {
            errors: vec![crate::error::FieldError {
                path: String::new(),
                message: format!("malformed JSON: {err}"),
            }],
        })?;
        Self::from_json(&value)
    }

    /// All target tables referenced by this partner, in config order, deduplicated.
    pub fn target_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for sheet in &self.source_config.sheets_config {
            if !tables.contains(&sheet.target_table.as_str()) {
                tables.push(&sheet.target_table);
            }
        }
        tables
    }
}

/// Normalizes a partner id or reports why it is invalid.
pub fn normalize_partner_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("must not be empty".into());
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(
            "must contain only alphanumeric characters, hyphens, and underscores".into(),
        );
    }
    Ok(trimmed.to_ascii_lowercase())
}

fn parse_partner(value: &Json, errors: &mut ErrorCollector) -> Option<PartnerConfig> {
    let obj = as_object(value, "", errors)?;
    let partner_id = required_string(obj, "partner_id", "", errors).and_then(|raw| {
        normalize_partner_id(&raw)
            .map_err(|message| errors.push("partner_id", message))
            .ok()
    });
    let partner_name = required_string(obj, "partner_name", "", errors);
    let template_id = required_string(obj, "template_id", "", errors);
    let description = optional_string(obj, "description", "", errors);
    let version = optional_string(obj, "version", "", errors).unwrap_or_else(|| "1.0".into());
    let metadata = match obj.get("metadata") {
        None | Some(Json::Null) => Map::new(),
        Some(Json::Object(map)) => map.clone(),
        Some(_) => {
            errors.push("metadata", "must be an object");
            Map::new()
        }
    };
    let source_config = match obj.get("source_config") {
        None | Some(Json::Null) => {
            errors.push("source_config", "is required");
            None
        }
        Some(source) => parse_source(source, "source_config", errors),
    };
    Some(PartnerConfig {
        partner_id: partner_id?,
        partner_name: partner_name?,
        template_id: template_id?,
        description,
        version,
        metadata,
        source_config: source_config?,
    })
}

fn parse_source(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<SourceConfig> {
    let obj = as_object(value, path, errors)?;
    let file_format = required_string(obj, "file_format", path, errors).and_then(|raw| {
        let parsed = FileFormat::parse(&raw);
        if parsed.is_none() {
            errors.push(
                child(path, "file_format"),
                format!("unknown file format '{raw}' (expected excel, csv, or json)"),
            );
        }
        parsed
    });
    let encoding = optional_string(obj, "encoding", path, errors).unwrap_or_else(|| "utf-8".into());
    if encoding_rs::Encoding::for_label(encoding.trim().as_bytes()).is_none() {
        errors.push(
            child(path, "encoding"),
            format!("unknown encoding '{encoding}'"),
        );
    }

    let sheets_path = child(path, "sheets_config");
    let sheets = match obj.get("sheets_config") {
        Some(Json::Array(items)) if !items.is_empty() => {
            let mut sheets = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                if let Some(sheet) = parse_sheet(item, &index(&sheets_path, idx), errors) {
                    sheets.push(sheet);
                }
            }
            Some(sheets)
        }
        Some(Json::Array(_)) => {
            errors.push(&sheets_path, "must contain at least one sheet");
            None
        }
        None | Some(Json::Null) => {
            errors.push(&sheets_path, "is required");
            None
        }
        Some(_) => {
            errors.push(&sheets_path, "must be a list");
            None
        }
    };

    let globals_path = child(path, "global_transformations");
    let global_transformations = optional_array(obj, "global_transformations", path, errors)
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            GlobalTransformation::parse(item, &index(&globals_path, idx), errors)
        })
        .collect();

    Some(SourceConfig {
        file_format: file_format?,
        encoding,
        sheets_config: sheets?,
        global_transformations,
    })
}

fn parse_sheet(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<SheetConfig> {
    let obj = as_object(value, path, errors)?;
    let sheet_name = required_string(obj, "sheet_name", path, errors);
    let target_table = required_string(obj, "target_table", path, errors);
    let headers_row = row_number(obj, "headers_row", path, errors).unwrap_or(1);
    let data_start_row = match row_number(obj, "data_start_row", path, errors) {
        Some(row) if row <= headers_row => {
            errors.push(
                child(path, "data_start_row"),
                format!("must be greater than headers_row ({headers_row})"),
            );
            row
        }
        Some(row) => row,
        None => headers_row + 1,
    };

    let skip_path = child(path, "skip_rows");
    let mut skip_rows = Vec::new();
    for (idx, item) in optional_array(obj, "skip_rows", path, errors)
        .iter()
        .enumerate()
    {
        match item.as_u64().and_then(|v| usize::try_from(v).ok()) {
            Some(row) if row >= 1 => skip_rows.push(row),
            _ => errors.push(index(&skip_path, idx), "must be a positive row number"),
        }
    }
    skip_rows.sort_unstable();
    skip_rows.dedup();

    let header_columns = string_list(obj, "header_columns", path, errors);
    if header_columns.as_ref().is_some_and(Vec::is_empty) {
        errors.push(child(path, "header_columns"), "must not be empty when set");
    }

    let mappings_path = child(path, "column_mappings");
    let column_mappings = match obj.get("column_mappings") {
        Some(Json::Array(items)) if !items.is_empty() => {
            let mut mappings = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                if let Some(mapping) = parse_mapping(item, &index(&mappings_path, idx), errors) {
                    mappings.push(mapping);
                }
            }
            Some(mappings)
        }
        Some(Json::Array(_)) => {
            errors.push(&mappings_path, "must contain at least one mapping");
            None
        }
        None | Some(Json::Null) => {
            errors.push(&mappings_path, "is required");
            None
        }
        Some(_) => {
            errors.push(&mappings_path, "must be a list");
            None
        }
    };

    let filters_path = child(path, "filters");
    let mut filters = Vec::new();
    match obj.get("filters") {
        None | Some(Json::Null) => {}
        Some(Json::Object(map)) => {
            for (field, spec) in map {
                if let Some(spec) = FilterSpec::parse(spec, &child(&filters_path, field), errors) {
                    filters.push(FieldFilter {
                        field: field.clone(),
                        spec,
                    });
                }
            }
        }
        Some(_) => errors.push(&filters_path, "must be an object keyed by field name"),
    }

    Some(SheetConfig {
        sheet_name: sheet_name?,
        target_table: target_table?,
        headers_row,
        data_start_row,
        skip_rows,
        header_columns,
        column_mappings: column_mappings?,
        filters,
    })
}

fn row_number(obj: &Object, key: &str, path: &str, errors: &mut ErrorCollector) -> Option<usize> {
    let raw = optional_int(obj, key, path, errors)?;
    match usize::try_from(raw) {
        Ok(row) if row >= 1 => Some(row),
        _ => {
            errors.push(child(path, key), "must be a 1-based row number");
            None
        }
    }
}

fn parse_mapping(value: &Json, path: &str, errors: &mut ErrorCollector) -> Option<ColumnMapping> {
    let obj = as_object(value, path, errors)?;
    let source_column = required_string(obj, "source_column", path, errors);
    let system_column = required_string(obj, "system_column", path, errors);
    let column_type = required_string(obj, "column_type", path, errors).and_then(|raw| {
        let parsed = ColumnType::parse(&raw);
        if parsed.is_none() {
            errors.push(
                child(path, "column_type"),
                format!("unknown column type '{raw}' (expected one of {COLUMN_TYPE_NAMES})"),
            );
        }
        parsed
    });
    let required = optional_bool(obj, "required", path, true, errors);
    let default_value = match obj.get("default_value") {
        None | Some(Json::Null) => None,
        Some(raw) => match Value::from_json(raw) {
            Some(v) => Some(v),
            None => {
                errors.push(child(path, "default_value"), "must be a scalar");
                None
            }
        },
    };
    let transforms_path = child(path, "transformations");
    let transformations = optional_array(obj, "transformations", path, errors)
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            TransformationSpec::parse(item, &index(&transforms_path, idx), errors)
        })
        .collect();

    Some(ColumnMapping {
        source_column: source_column?,
        system_column: system_column?,
        column_type: column_type?,
        required,
        default_value,
        transformations,
    })
}
