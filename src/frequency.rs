use std::collections::HashMap;

use anyhow::{Result, anyhow};
use itertools::Itertools;
use serde::Serialize;

use crate::schema::CanonicalTable;

const EMPTY_LABEL: &str = "<empty>";

/// Distinct-value count for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    pub field: String,
    pub distinct: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub field: String,
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

impl FrequencyRow {
    pub fn render(&self) -> Vec<String> {
        vec![
            self.field.clone(),
            self.value.clone(),
            self.count.to_string(),
            format!("{:.2}%", self.percent),
        ]
    }
}

/// Distinct-value counts for every field, in column order.
pub fn cardinality(table: &CanonicalTable) -> Vec<Cardinality> {
    table
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| Cardinality {
            field: field.name.clone(),
            distinct: table
                .rows()
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|value| value.as_display())
                .unique()
                .count(),
        })
        .collect()
}

/// Resolves field names to column indices; an empty list selects every field.
pub fn resolve_fields(table: &CanonicalTable, names: &[String]) -> Result<Vec<usize>> {
    if names.is_empty() {
        return Ok((0..table.fields().len()).collect());
    }
    names
        .iter()
        .map(|name| {
            table
                .field_index(name)
                .ok_or_else(|| anyhow!("Field '{name}' not found in table"))
        })
        .collect()
}

/// Value counts for the given columns, most frequent first (ties by value).
/// `top == 0` keeps every distinct value.
pub fn frequencies(table: &CanonicalTable, columns: &[usize], top: usize) -> Vec<FrequencyRow> {
    let total = table.row_count();
    if total == 0 {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for &column in columns {
        let Some(field) = table.fields().get(column) else {
            continue;
        };
        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in table.rows() {
            let value = row
                .get(column)
                .map(|v| v.as_display())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| EMPTY_LABEL.to_string());
            *counts.entry(value).or_insert(0) += 1;
        }
        let mut items = counts.into_iter().collect::<Vec<_>>();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        rows.extend(items.into_iter().map(|(value, count)| FrequencyRow {
            field: field.name.clone(),
            value,
            count,
            percent: (count as f64 / total as f64) * 100.0,
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode::decode_str, format::FormatKind, schema::infer};

    fn table() -> CanonicalTable {
        let csv = "status,amount\nshipped,1\npending,2\nshipped,3\n,4\n";
        infer(&decode_str(csv, FormatKind::Csv).unwrap())
    }

    #[test]
    fn frequencies_sort_by_count_then_value() {
        let t = table();
        let rows = frequencies(&t, &[0], 0);
        let values = rows.iter().map(|r| r.value.as_str()).collect::<Vec<_>>();
        assert_eq!(values, vec!["shipped", "<empty>", "pending"]);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].render()[3], "50.00%");
    }

    #[test]
    fn top_limits_rows_per_field() {
        let t = table();
        assert_eq!(frequencies(&t, &[0, 1], 1).len(), 2);
    }

    #[test]
    fn cardinality_counts_distinct_cells() {
        let t = table();
        let counts = cardinality(&t);
        assert_eq!(counts[0].distinct, 3);
        assert_eq!(counts[1].distinct, 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let t = table();
        assert!(resolve_fields(&t, &["missing".to_string()]).is_err());
        assert_eq!(resolve_fields(&t, &[]).unwrap(), vec![0, 1]);
    }
}
