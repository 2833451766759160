mod common;

use chart_ingest::{
    data::Value,
    format::FormatKind,
    schema::FieldKind,
    shape::{self, ChartKind},
};
use common::table_from;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Line {
    Data(String, i32),
    Blank,
    Whitespace,
    EmptyCells,
}

fn line_strategy() -> impl Strategy<Value = Line> {
    prop_oneof![
        4 => ("[A-Za-z][A-Za-z0-9 ]{0,8}", -10_000i32..10_000)
            .prop_map(|(label, value)| Line::Data(label, value)),
        1 => Just(Line::Blank),
        1 => Just(Line::Whitespace),
        1 => Just(Line::EmptyCells),
    ]
}

fn render_csv(lines: &[Line]) -> String {
    let mut csv = String::from("name,value\n");
    for line in lines {
        match line {
            Line::Data(label, value) => csv.push_str(&format!("{label},{value}\n")),
            Line::Blank => csv.push('\n'),
            Line::Whitespace => csv.push_str("   \n"),
            Line::EmptyCells => csv.push_str(", \n"),
        }
    }
    csv
}

fn numeric_csv_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        ("[a-z]{1,6}", -1_000.0f64..1_000.0, proptest::option::of(-50i32..50)),
        1..20,
    )
    .prop_map(|rows| {
        let mut csv = String::from("label,amount,delta\n");
        for (label, amount, delta) in rows {
            let delta = delta.map(|d| d.to_string()).unwrap_or_default();
            csv.push_str(&format!("{label},{amount},{delta}\n"));
        }
        csv
    })
}

proptest! {
    #[test]
    fn delimited_row_count_skips_blank_and_empty_lines(
        lines in proptest::collection::vec(line_strategy(), 0..30)
    ) {
        let expected = lines.iter().filter(|line| matches!(line, Line::Data(..))).count();
        let table = table_from(&render_csv(&lines), FormatKind::Csv);
        prop_assert_eq!(table.row_count(), expected);
    }

    #[test]
    fn waterfall_steps_chain_from_zero(csv in numeric_csv_strategy()) {
        let table = table_from(&csv, FormatKind::Csv);
        let steps = shape::waterfall(&table);
        prop_assert!(steps.len() <= 6);
        prop_assert_eq!(steps.len(), table.row_count().min(6));
        for (idx, step) in steps.iter().enumerate() {
            if idx == 0 {
                prop_assert_eq!(step.start, 0.0);
            } else {
                prop_assert_eq!(step.start, steps[idx - 1].end);
            }
            prop_assert!((step.end - (step.start + step.value)).abs() < 1e-9);
            prop_assert_eq!(step.cumulative, step.end);
        }
    }

    #[test]
    fn shaping_is_idempotent(csv in numeric_csv_strategy()) {
        let table = table_from(&csv, FormatKind::Csv);
        for kind in ChartKind::ALL {
            prop_assert_eq!(shape::shape(&table, kind), shape::shape(&table, kind));
            prop_assert!(shape::shape(&table, kind).len() <= kind.window());
        }
    }

    #[test]
    fn cells_match_their_field_kind(csv in numeric_csv_strategy()) {
        let table = table_from(&csv, FormatKind::Csv);
        for row in table.rows() {
            for (field, cell) in table.fields().iter().zip(row.cells()) {
                match field.kind {
                    FieldKind::Numeric => prop_assert!(matches!(cell, Value::Number(_))),
                    FieldKind::Categorical => prop_assert!(matches!(cell, Value::Text(_))),
                }
            }
        }
    }
}
