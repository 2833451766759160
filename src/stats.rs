//! KPI aggregates for the dashboard header cards.

use log::warn;
use serde::Serialize;

use crate::{schema::CanonicalTable, shape};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub record_count: usize,
    /// Mean of the `value` projection over the generic chart window, rounded.
    /// `None` when the window is empty.
    pub average_value: Option<i64>,
    pub max_value: Option<f64>,
    pub numeric_field_count: usize,
}

impl Kpis {
    pub fn window_is_empty(&self) -> bool {
        self.average_value.is_none()
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        let missing = || "n/a".to_string();
        vec![
            vec!["Total Records".to_string(), self.record_count.to_string()],
            vec![
                "Average Value".to_string(),
                self.average_value.map_or_else(missing, |v| v.to_string()),
            ],
            vec![
                "Max Value".to_string(),
                self.max_value
                    .map_or_else(missing, crate::data::format_number),
            ],
            vec![
                "Data Points".to_string(),
                self.numeric_field_count.to_string(),
            ],
        ]
    }
}

pub fn aggregate(table: &CanonicalTable) -> Kpis {
    let window = shape::value_window(table);
    let (average_value, max_value) = if window.is_empty() {
        warn!("No rows available for KPI averages; reporting them as unavailable");
        (None, None)
    } else {
        let sum: f64 = window.iter().sum();
        let mean = sum / window.len() as f64;
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (Some(round_half_up(mean)), Some(max))
    };
    Kpis {
        record_count: table.row_count(),
        average_value,
        max_value,
        numeric_field_count: table.numeric_field_count(),
    }
}

/// Rounds halves toward positive infinity (`2.5 → 3`, `-2.5 → -2`).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
