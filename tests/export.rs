mod common;

use std::fs;

use chart_ingest::{
    decode::DecodeOptions,
    export::{ExportFormat, export},
    format::FormatKind,
    pipeline::load_path,
};
use common::{fixture_path, table_from};

#[test]
fn csv_export_decodes_back_to_the_same_table() {
    let dataset = load_path(&fixture_path("sales.csv"), None, &DecodeOptions::default())
        .expect("load sales");
    let exported = export(&dataset.table, ExportFormat::Csv).expect("export csv");
    assert_eq!(table_from(&exported, FormatKind::Csv), dataset.table);
}

#[test]
fn json_export_decodes_back_to_the_same_table() {
    let dataset = load_path(&fixture_path("regions.xml"), None, &DecodeOptions::default())
        .expect("load regions");
    let exported = export(&dataset.table, ExportFormat::Json).expect("export json");
    assert_eq!(table_from(&exported, FormatKind::Json), dataset.table);
}

#[test]
fn awkward_text_survives_csv_export() {
    let source = r#"[
        {"city": "Austin, TX", "note": "line one\nline two", "score": 3},
        {"city": "The \"Town\" Inn", "note": "", "score": 4.5}
    ]"#;
    let table = table_from(source, FormatKind::Json);
    let exported = export(&table, ExportFormat::Csv).expect("export csv");
    assert_eq!(table_from(&exported, FormatKind::Csv), table);
}

#[test]
fn coerced_defaults_are_exported_as_zero() {
    let raw = fs::read_to_string(fixture_path("sales.csv")).expect("read fixture");
    let table = table_from(&raw, FormatKind::Csv);
    let exported = export(&table, ExportFormat::Csv).expect("export csv");
    let lines = exported.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "region,revenue,cost,units");
    assert_eq!(lines[3], "East,0,45,7");
    assert_eq!(lines[5], "Central,0,30,4");
}
