use std::path::Path;

use mapline_common::format_numeric;
use serde_json::Value as Json;

use mapline_model::SourceConfig;

use super::{FormatReader, NamedTable, ReadOutcome, file_stem, read_bytes};
use crate::error::{IngestError, Result};
use crate::layout::build_frame;
use crate::readers::decode_text;

/// Reader for JSON record files.
///
/// Accepts a top-level array of objects or an object whose `records` (or
/// `data`) member is such an array. Columns appear in first-seen key order.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRecordsReader;

impl FormatReader for JsonRecordsReader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn read(&self, path: &Path, source: &SourceConfig) -> Result<ReadOutcome> {
        let bytes = read_bytes(path)?;
        let text = decode_text(path, &bytes, &source.encoding)?;
        let parse_error = |message: String| IngestError::JsonParse {
            path: path.to_path_buf(),
            message,
        };
        let document: Json = serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?;
        let records = match &document {
            Json::Array(items) => items,
            Json::Object(obj) => match obj.get("records").or_else(|| obj.get("data")) {
                Some(Json::Array(items)) => items,
                _ => {
                    return Err(parse_error(
                        "expected an array of records or a 'records' array".into(),
                    ));
                }
            },
            _ => return Err(parse_error("expected an array of records".into())),
        };

        let mut headers: Vec<String> = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let Json::Object(fields) = record else {
                return Err(parse_error(format!("record {idx} is not an object")));
            };
            for key in fields.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
        let rows: Vec<Vec<String>> = records
            .iter()
            .filter_map(Json::as_object)
            .map(|fields| {
                headers
                    .iter()
                    .map(|h| fields.get(h).map(json_to_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        let frame = build_frame(headers, rows)?;
        Ok(ReadOutcome {
            tables: vec![NamedTable {
                name: file_stem(path),
                frame,
            }],
            failures: Vec::new(),
        })
    }
}

fn json_to_cell(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(format_numeric).unwrap_or_else(|| n.to_string()),
        },
        other => other.to_string(),
    }
}
