mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;

use common::{TestWorkspace, fixture_path};

fn chart_ingest() -> Command {
    Command::cargo_bin("chart-ingest").expect("binary exists")
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("stdout is JSON")
}

#[test]
fn inspect_lists_fields_and_preview_rows() {
    let sales = fixture_path("sales.csv");
    chart_ingest()
        .args(["inspect", "-i", sales.to_str().unwrap(), "--rows", "2"])
        .assert()
        .success()
        .stdout(contains("5 row(s), 4 field(s), decoded as csv"))
        .stdout(contains("revenue  numeric"))
        .stdout(contains("North"))
        .stdout(contains("West").not());
}

#[test]
fn chart_writes_requested_kinds_to_output_file() {
    let workspace = TestWorkspace::new();
    let sales = fixture_path("sales.csv");
    let output = workspace.path().join("charts.json");
    chart_ingest()
        .args([
            "chart",
            "-i",
            sales.to_str().unwrap(),
            "--kind",
            "bar",
            "--kind",
            "waterfall",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let charts: Value = serde_json::from_str(&workspace.read("charts.json")).expect("parse charts");
    let object = charts.as_object().expect("chart map");
    assert_eq!(object.keys().collect::<Vec<_>>(), vec!["bar", "waterfall"]);
    assert_eq!(charts["bar"][0]["name"], "North");
    assert_eq!(charts["bar"][0]["value"], 120);
    assert_eq!(charts["bar"][0]["value2"], 80);
    assert_eq!(charts["bar"][0]["units"], 12);
    assert_eq!(charts["waterfall"][1]["start"], 120.0);
    assert_eq!(charts["waterfall"][1]["end"], 215.5);
}

#[test]
fn chart_defaults_to_settings_preference() {
    let workspace = TestWorkspace::new();
    let settings = workspace.write("dashboard.yml", "chart_type: pie\n");
    let inventory = fixture_path("inventory.json");
    let assert = chart_ingest()
        .args([
            "chart",
            "-i",
            inventory.to_str().unwrap(),
            "--settings",
            settings.to_str().unwrap(),
        ])
        .assert()
        .success();
    let charts = stdout_json(&assert);
    assert_eq!(charts.as_object().map(|map| map.len()), Some(1));
    assert_eq!(charts["pie"].as_array().map(Vec::len), Some(3));
    assert_eq!(charts["pie"][2]["name"], "C-300");
}

#[test]
fn kpi_reports_rounded_average() {
    let sales = fixture_path("sales.csv");
    chart_ingest()
        .args(["kpi", "-i", sales.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Total Records  5"))
        .stdout(contains("Average Value  71"))
        .stdout(contains("Max Value      140"))
        .stdout(contains("Data Points    3"));

    let assert = chart_ingest()
        .args(["kpi", "-i", sales.to_str().unwrap(), "--json"])
        .assert()
        .success();
    let kpis = stdout_json(&assert);
    assert_eq!(kpis["record_count"], 5);
    assert_eq!(kpis["average_value"], 71);
}

#[test]
fn kpi_on_header_only_file_reports_unavailable_average() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("headers.csv", "name,value\n");
    chart_ingest()
        .args(["kpi", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Average Value  n/a"));
}

#[test]
fn frequency_counts_selected_columns() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "orders.csv",
        "status,amount\nshipped,10\npending,4\nshipped,7\n",
    );
    chart_ingest()
        .args(["frequency", "-i", input.to_str().unwrap(), "-C", "status"])
        .assert()
        .success()
        .stdout(contains("status  shipped  2      66.67%"))
        .stdout(contains("status  pending  1      33.33%"))
        .stdout(contains("amount").not());
}

#[test]
fn frequency_rejects_unknown_column() {
    let sales = fixture_path("sales.csv");
    chart_ingest()
        .args(["frequency", "-i", sales.to_str().unwrap(), "-C", "missing"])
        .assert()
        .failure()
        .stderr(contains("Field 'missing' not found"));
}

#[test]
fn export_reserializes_table_as_csv() {
    let inventory = fixture_path("inventory.json");
    chart_ingest()
        .args([
            "export",
            "-i",
            inventory.to_str().unwrap(),
            "--export-format",
            "csv",
        ])
        .assert()
        .success()
        .stdout("sku,stock,price\nA-100,40,2.5\nB-200,12,10\nC-300,0,7.25\n");
}

#[test]
fn export_reads_stdin_with_explicit_format() {
    let assert = chart_ingest()
        .args(["export", "-i", "-", "--format", "tsv"])
        .write_stdin("city\tpopulation\nOslo\t709000\n")
        .assert()
        .success();
    let rows = stdout_json(&assert);
    assert_eq!(rows, serde_json::json!([{"city": "Oslo", "population": 709000}]));
}

#[test]
fn project_embeds_settings_and_timestamp() {
    let workspace = TestWorkspace::new();
    let settings = workspace.write("dashboard.yml", "theme: dark\nshow_grid: false\n");
    let output = workspace.path().join("project.json");
    let regions = fixture_path("regions.xml");
    chart_ingest()
        .args([
            "project",
            "-i",
            regions.to_str().unwrap(),
            "--settings",
            settings.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let project: Value = serde_json::from_str(&workspace.read("project.json")).expect("parse");
    assert_eq!(project["data"][1]["name"], "South");
    assert_eq!(project["data"][1]["@code"], "S");
    assert_eq!(project["settings"]["theme"], "dark");
    assert_eq!(project["settings"]["show_grid"], false);
    assert_eq!(project["settings"]["show_legend"], true);
    let timestamp = project["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
}

#[test]
fn unsupported_extension_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("setup.exe", "MZ");
    chart_ingest()
        .args(["inspect", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("unsupported file format 'exe'"));
}

#[test]
fn empty_file_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("empty.csv", "");
    chart_ingest()
        .args(["chart", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("file is empty"));
}

#[test]
fn size_cap_is_enforced() {
    let sales = fixture_path("sales.csv");
    chart_ingest()
        .args(["inspect", "-i", sales.to_str().unwrap(), "--max-bytes", "16"])
        .assert()
        .failure()
        .stderr(contains("exceeds the 16 byte limit"));
}

#[test]
fn malformed_json_fails() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("broken.json", "[{\"a\": 1,,}]");
    chart_ingest()
        .args(["inspect", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("invalid JSON"));
}
