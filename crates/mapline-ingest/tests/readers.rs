//! Integration tests for format readers and discovery.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use mapline_ingest::{FormatDispatcher, IngestError, discover_partner_files, list_data_files};
use mapline_model::PartnerConfig;
use polars::prelude::DataFrame;
use serde_json::json;
use tempfile::TempDir;

fn csv_config(sheet: serde_json::Value) -> PartnerConfig {
    PartnerConfig::from_json(&json!({
        "partner_id": "acme",
        "partner_name": "Acme",
        "template_id": "t",
        "source_config": {
            "file_format": "csv",
            "sheets_config": [sheet]
        }
    }))
    .unwrap()
}

fn orders_sheet() -> serde_json::Value {
    json!({
        "sheet_name": "orders.csv",
        "target_table": "orders",
        "column_mappings": [
            {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
        ]
    })
}

fn write(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn reads_semicolon_csv_keyed_by_stem() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "orders.csv",
        b"Order ID;Amount\nA1;10\n;\nA2; 20 \n",
    );
    let config = csv_config(orders_sheet());

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();

    assert_eq!(outcome.tables.len(), 1);
    let table = &outcome.tables[0];
    assert_eq!(table.name, "orders");
    assert_eq!(table.frame.height(), 2);
    assert_eq!(
        strings(&table.frame, "Amount"),
        vec![Some("10".to_string()), Some("20".to_string())]
    );
}

#[test]
fn banner_rows_with_configured_header_row() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "orders.csv",
        b"Acme weekly export,\nGenerated 2024-01-07,\nOrder ID,Amount\nA1,10\nTOTAL,10\n",
    );
    let config = csv_config(json!({
        "sheet_name": "orders",
        "target_table": "orders",
        "headers_row": 3,
        "skip_rows": [5],
        "column_mappings": [
            {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
        ]
    }));

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();
    let frame = &outcome.tables[0].frame;
    assert_eq!(strings(frame, "Order ID"), vec![Some("A1".to_string())]);
}

#[test]
fn blank_line_before_header_keeps_configured_header_row() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "orders.csv",
        b"Weekly report\n\nOrder ID,Status\nA1,delivered\nA2,pending\n",
    );
    let config = csv_config(json!({
        "sheet_name": "orders",
        "target_table": "orders",
        "headers_row": 3,
        "column_mappings": [
            {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
        ]
    }));

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();
    let frame = &outcome.tables[0].frame;
    assert_eq!(
        strings(frame, "Order ID"),
        vec![Some("A1".to_string()), Some("A2".to_string())]
    );
    assert_eq!(
        strings(frame, "Status"),
        vec![Some("delivered".to_string()), Some("pending".to_string())]
    );
}

#[test]
fn header_columns_locate_drifting_header() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "orders.csv",
        b"Report,,\n,,\n\"Order\nID\",Order  Date,Amount\nA1,2024-01-02,10\n",
    );
    let config = csv_config(json!({
        "sheet_name": "orders",
        "target_table": "orders",
        "header_columns": ["Order ID", "Order Date", "Amount"],
        "column_mappings": [
            {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
        ]
    }));

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();
    let frame = &outcome.tables[0].frame;
    assert_eq!(frame.height(), 1);
    assert_eq!(strings(frame, "Order Date"), vec![Some("2024-01-02".to_string())]);
}

#[test]
fn header_columns_without_match_fail() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "orders.csv", b"a,b\n1,2\n");
    let config = csv_config(json!({
        "sheet_name": "orders",
        "target_table": "orders",
        "header_columns": ["Order ID"],
        "column_mappings": [
            {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
        ]
    }));

    let err = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap_err();
    assert!(matches!(err, IngestError::HeaderNotFound { .. }));
}

#[test]
fn latin1_csv_is_decoded_with_configured_encoding() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "orders.csv", b"Order ID,Outlet\nA1,Caf\xe9\n");
    let mut config = csv_config(orders_sheet());
    config.source_config.encoding = "latin1".into();

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();
    assert_eq!(
        strings(&outcome.tables[0].frame, "Outlet"),
        vec![Some("Café".to_string())]
    );
}

#[test]
fn json_records_keep_first_seen_key_order() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "payments.json",
        br#"{"records": [{"id": "P1", "amount": 12.5}, {"id": "P2", "method": "upi"}]}"#,
    );
    let config = csv_config(orders_sheet());

    let outcome = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap();
    let frame = &outcome.tables[0].frame;
    let names: Vec<String> = frame
        .get_column_names_owned()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["id", "amount", "method"]);
    assert_eq!(
        strings(frame, "method"),
        vec![None, Some("upi".to_string())]
    );
}

#[test]
fn unsupported_extension_is_a_file_error() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "orders.pdf", b"%PDF");
    let config = csv_config(orders_sheet());
    let err = FormatDispatcher::default()
        .read(&path, &config.source_config)
        .unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn discovery_is_case_insensitive_and_sorted() {
    let root = TempDir::new().unwrap();
    let partner = root.path().join("Swiggy");
    fs::create_dir(&partner).unwrap();
    write(&partner, "b.csv", b"x\n");
    write(&partner, "a.xlsx", b"");
    write(&partner, ".DS_Store", b"");
    fs::create_dir(partner.join("archive")).unwrap();

    let files = discover_partner_files(root.path(), "swiggy").unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.xlsx", "b.csv"]);

    let err = discover_partner_files(root.path(), "zomato").unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    assert!(list_data_files(&root.path().join("missing")).is_err());
}

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn inline_cell(reference: &str, text: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

fn worksheet(rows: &[(usize, Vec<String>)]) -> String {
    let body: String = rows
        .iter()
        .map(|(number, cells)| format!(r#"<row r="{number}">{}</row>"#, cells.concat()))
        .collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{SPREADSHEET_NS}"><sheetData>{body}</sheetData></worksheet>"#)
}

/// Builds an .xlsx with an `Orders` sheet (banner, blank row, header on
/// row 3, a total row on 5, date-styled cells) and a plain `Payments` sheet.
fn orders_workbook() -> Vec<u8> {
    let orders = worksheet(&[
        (1, vec![inline_cell("A1", "Weekly export")]),
        (
            3,
            vec![
                inline_cell("A3", "Order ID"),
                inline_cell("B3", "Order Date"),
                inline_cell("C3", "Amount"),
            ],
        ),
        (
            4,
            vec![
                inline_cell("A4", "A1"),
                r#"<c r="B4" s="1"><v>45292</v></c>"#.to_string(),
                r#"<c r="C4"><v>10.5</v></c>"#.to_string(),
            ],
        ),
        (
            5,
            vec![
                inline_cell("A5", "TOTAL"),
                r#"<c r="C5"><v>17.5</v></c>"#.to_string(),
            ],
        ),
        (
            6,
            vec![
                inline_cell("A6", "A2"),
                r#"<c r="B6" s="1"><v>45293.5</v></c>"#.to_string(),
                r#"<c r="C6"><v>7</v></c>"#.to_string(),
            ],
        ),
    ]);
    let payments = worksheet(&[
        (1, vec![inline_cell("A1", "Payment ID"), inline_cell("B1", "Amount")]),
        (2, vec![inline_cell("A2", "P1"), r#"<c r="B2"><v>5</v></c>"#.to_string()]),
    ]);
    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{SPREADSHEET_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Orders" sheetId="1" r:id="rId1"/><sheet name="Payments" sheetId="2" r:id="rId2"/></sheets></workbook>"#),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/styles.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{SPREADSHEET_NS}"><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#),
        ),
        ("xl/worksheets/sheet1.xml", orders),
        ("xl/worksheets/sheet2.xml", payments),
    ];

    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

fn workbook_config() -> PartnerConfig {
    PartnerConfig::from_json(&json!({
        "partner_id": "acme",
        "partner_name": "Acme",
        "template_id": "t",
        "source_config": {
            "file_format": "excel",
            "sheets_config": [
                {
                    "sheet_name": "orders",
                    "target_table": "orders",
                    "headers_row": 3,
                    "data_start_row": 4,
                    "skip_rows": [5],
                    "column_mappings": [
                        {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"}
                    ]
                },
                {
                    "sheet_name": "Refunds",
                    "target_table": "refunds",
                    "column_mappings": [
                        {"source_column": "Refund ID", "system_column": "refund_id", "column_type": "string"}
                    ]
                },
                {
                    "sheet_name": "Payments",
                    "target_table": "payments",
                    "column_mappings": [
                        {"source_column": "Payment ID", "system_column": "payment_id", "column_type": "string"}
                    ]
                }
            ]
        }
    }))
    .unwrap()
}

#[test]
fn workbook_sheets_apply_layout_and_report_missing_sheets() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "weekly.xlsx", &orders_workbook());

    let outcome = FormatDispatcher::default()
        .read(&path, &workbook_config().source_config)
        .unwrap();

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].sheet, "Refunds");
    assert!(matches!(
        outcome.failures[0].error,
        IngestError::SheetNotFound { .. }
    ));

    let names: Vec<&str> = outcome.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "Payments"]);

    let orders = &outcome.tables[0].frame;
    assert_eq!(
        strings(orders, "Order ID"),
        vec![Some("A1".to_string()), Some("A2".to_string())]
    );
    assert_eq!(
        strings(orders, "Order Date"),
        vec![
            Some("2024-01-01".to_string()),
            Some("2024-01-02 12:00:00".to_string())
        ]
    );
    assert_eq!(
        strings(orders, "Amount"),
        vec![Some("10.5".to_string()), Some("7".to_string())]
    );

    let payments = &outcome.tables[1].frame;
    assert_eq!(strings(payments, "Payment ID"), vec![Some("P1".to_string())]);
    assert_eq!(strings(payments, "Amount"), vec![Some("5".to_string())]);
}

#[test]
fn corrupt_workbook_is_a_file_error() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "weekly.xlsx", b"not a zip archive");
    let err = FormatDispatcher::default()
        .read(&path, &workbook_config().source_config)
        .unwrap_err();
    assert!(matches!(err, IngestError::Workbook { .. }));
}
