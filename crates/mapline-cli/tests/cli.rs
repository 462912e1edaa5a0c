use std::fs;
use std::path::Path;

use clap::Parser;
use mapline_cli::cli::{Cli, Command};
use mapline_cli::commands::{
    run_formats, run_list_partners, run_parse_all, run_parse_partner, run_validate_config,
};
use mapline_cli::settings::AppConfig;
use mapline_cli::summary::{file_table, partner_table};
use tempfile::TempDir;

const CONFIG: &str = r#"{
  "partner_id": "zomato",
  "partner_name": "Zomato",
  "template_id": "food_delivery",
  "source_config": {
    "file_format": "csv",
    "sheets_config": [{
      "sheet_name": "orders",
      "target_table": "orders",
      "column_mappings": [
        {"source_column": "Order ID", "system_column": "order_id", "column_type": "string"},
        {"source_column": "Date", "system_column": "order_date", "column_type": "date"},
        {"source_column": "Status", "system_column": "order_status", "column_type": "string",
         "transformations": [{"type": "lowercase"}]},
        {"source_column": "Outlet", "system_column": "outlet_id", "column_type": "string"},
        {"source_column": "Amount", "system_column": "total_amount", "column_type": "decimal"}
      ]
    }]
  }
}"#;

fn workspace() -> TempDir {
    let root = TempDir::new().unwrap();
    let configs = root.path().join("configs");
    fs::create_dir_all(&configs).unwrap();
    fs::create_dir_all(root.path().join("data").join("zomato")).unwrap();
    fs::write(configs.join("zomato.json"), CONFIG).unwrap();
    fs::write(configs.join("broken.json"), r#"{"partner_id": "broken"}"#).unwrap();
    fs::write(
        root.path().join("data").join("zomato").join("orders.csv"),
        "Order ID,Date,Status,Outlet,Amount\nZ1,2024-02-01,Delivered,OUT-9,100\nZ2,2024-02-02,Pending,OUT-9,55.5\n",
    )
    .unwrap();
    root
}

fn app_config(root: &Path, extra: &[&str]) -> AppConfig {
    let configs = root.join("configs");
    let data = root.join("data");
    let output = root.join("output");
    let mut args = vec![
        "mapline",
        "--configs-dir",
        configs.to_str().unwrap(),
        "--data-dir",
        data.to_str().unwrap(),
        "--output-dir",
        output.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    args.push("parse-all");
    let cli = Cli::try_parse_from(args).unwrap();
    AppConfig::from_args(&cli.settings).unwrap()
}

fn cell_texts(table: &comfy_table::Table) -> Vec<Vec<String>> {
    table
        .row_iter()
        .map(|row| row.cell_iter().map(|cell| cell.content()).collect())
        .collect()
}

#[test]
fn flags_map_onto_run_options() {
    let root = TempDir::new().unwrap();
    let config = app_config(
        root.path(),
        &[
            "--dry-run",
            "--batch-size",
            "25",
            "--max-workers",
            "2",
            "--no-validation",
        ],
    );
    assert!(config.options.dry_run);
    assert_eq!(config.options.batch_size, 25);
    assert_eq!(config.options.max_workers, 2);
    assert!(!config.options.enable_validation);
    assert!(!config.options.tolerate_invalid);
}

#[test]
fn zero_batch_size_is_rejected() {
    let cli = Cli::try_parse_from(["mapline", "--batch-size", "0", "formats"]).unwrap();
    let err = AppConfig::from_args(&cli.settings).unwrap_err();
    assert!(err.to_string().contains("--batch-size"));
}

#[test]
fn subcommands_parse() {
    let cli = Cli::try_parse_from(["mapline", "parse-partner", "--partner-id", "swiggy"]).unwrap();
    assert!(matches!(cli.command, Command::ParsePartner(ref a) if a.partner_id == "swiggy"));

    let cli = Cli::try_parse_from(["mapline", "validate-config", "--file", "x.json"]).unwrap();
    assert!(matches!(cli.command, Command::ValidateConfig(ref a) if a.file.is_some()));

    assert!(
        Cli::try_parse_from([
            "mapline",
            "validate-config",
            "--file",
            "x.json",
            "--partner-id",
            "a"
        ])
        .is_err()
    );
}

#[test]
fn validate_config_reports_each_partner() {
    let root = workspace();
    let config = app_config(root.path(), &[]);

    let checks = run_validate_config(&config, None, None).unwrap();
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].name, "broken");
    assert!(!checks[0].valid);
    assert!(checks[0].errors.iter().any(|e| e.starts_with("partner_name")));
    assert_eq!(checks[1].name, "zomato");
    assert!(checks[1].valid);

    let missing = run_validate_config(&config, Some("nobody"), None).unwrap();
    assert!(!missing[0].valid);
    assert!(missing[0].errors[0].contains("not found"));
}

#[test]
fn list_partners_skips_invalid_configurations() {
    let root = workspace();
    let partners = run_list_partners(&app_config(root.path(), &[])).unwrap();
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0].partner_id, "zomato");
    assert_eq!(partners[0].file_format, "csv");
    assert_eq!(partners[0].target_tables, vec!["orders".to_string()]);
}

#[test]
fn parse_partner_writes_output_csv() {
    let root = workspace();
    let config = app_config(root.path(), &[]);

    let report = run_parse_partner(&config, "zomato").unwrap();
    assert!(!report.has_errors(), "{:?}", report.partners[0].errors);
    assert_eq!(report.total_records(), 2);

    let written = fs::read_to_string(root.path().join("output").join("orders.csv")).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("order_id,order_date,order_status,outlet_id,total_amount")
    );
    assert_eq!(lines.count(), 2);

    let files = cell_texts(&file_table(&report.partners[0]));
    assert_eq!(files[0][0], "orders.csv");
    assert_eq!(files[0][1], "accepted");
    assert_eq!(files[0][2], "orders");
}

#[test]
fn parse_all_dry_run_stores_nothing() {
    let root = workspace();
    let config = app_config(root.path(), &["--dry-run"]);

    let report = run_parse_all(&config).unwrap();
    assert!(report.dry_run);
    assert!(!root.path().join("output").exists());

    let rows = cell_texts(&partner_table(&report));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "broken");
    assert_eq!(rows[0][1], "failed");
    assert_eq!(rows[1][0], "zomato");
    assert_eq!(rows[1][1], "ok");
    assert_eq!(rows[1][3], "2");
    assert_eq!(rows[2][0], "TOTAL");
    assert_eq!(rows[2][2], "1");
}

#[test]
fn formats_lists_every_reader() {
    let formats = run_formats();
    insta::assert_json_snapshot!(formats, @r#"
    [
      {
        "reader": "spreadsheet",
        "extensions": [
          ".xlsx",
          ".xlsm",
          ".xlsb",
          ".xls",
          ".ods"
        ]
      },
      {
        "reader": "delimited",
        "extensions": [
          ".csv",
          ".tsv",
          ".txt"
        ]
      },
      {
        "reader": "json",
        "extensions": [
          ".json"
        ]
      }
    ]
    "#);
}
