//! Presentation settings and project files.
//!
//! Settings are plain values handed to whoever renders the charts; nothing
//! here is process-wide. They load from YAML and missing keys take defaults:
//!
//! ```yaml
//! theme: dark
//! chart_type: bar
//! show_grid: true
//! show_legend: false
//! export_format: csv
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{export::ExportFormat, schema::CanonicalTable, shape::ChartKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Default chart selection. `Auto` renders every chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum ChartPreference {
    #[default]
    Auto,
    Bar,
    Line,
    Pie,
    Area,
}

impl ChartPreference {
    pub fn charts(&self) -> Vec<ChartKind> {
        match self {
            ChartPreference::Auto => ChartKind::ALL.to_vec(),
            ChartPreference::Bar => vec![ChartKind::Bar],
            ChartPreference::Line => vec![ChartKind::Line],
            ChartPreference::Pie => vec![ChartKind::Pie],
            ChartPreference::Area => vec![ChartKind::Area],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub theme: Theme,
    pub chart_type: ChartPreference,
    pub show_grid: bool,
    pub show_legend: bool,
    pub export_format: ExportFormat,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            chart_type: ChartPreference::Auto,
            show_grid: true,
            show_legend: true,
            export_format: ExportFormat::Json,
        }
    }
}

impl DashboardSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening settings file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing settings file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Writing settings file {path:?}"))
    }
}

/// A saved dashboard: the table rows, the settings, and when it was saved.
#[derive(Debug, Serialize)]
pub struct Project<'a> {
    pub data: crate::schema::RowsView<'a>,
    pub settings: &'a DashboardSettings,
    pub timestamp: String,
}

impl<'a> Project<'a> {
    pub fn new(table: &'a CanonicalTable, settings: &'a DashboardSettings, saved_at: DateTime<Utc>) -> Self {
        Self {
            data: table.records(),
            settings,
            timestamp: saved_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Serializing project")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_keys_take_defaults() {
        let settings = DashboardSettings::from_yaml("theme: dark\nshow_legend: false\n").unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(!settings.show_legend);
        assert!(settings.show_grid);
        assert_eq!(settings.chart_type, ChartPreference::Auto);
        assert_eq!(DashboardSettings::from_yaml("").unwrap(), DashboardSettings::default());
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(DashboardSettings::from_yaml("theme: neon\n").is_err());
    }

    #[test]
    fn settings_round_trip_through_yaml() {
        let settings = DashboardSettings {
            theme: Theme::Auto,
            chart_type: ChartPreference::Pie,
            show_grid: false,
            show_legend: true,
            export_format: ExportFormat::Csv,
        };
        let yaml = settings.to_yaml().unwrap();
        assert_eq!(DashboardSettings::from_yaml(&yaml).unwrap(), settings);
    }

    #[test]
    fn chart_preference_expands_auto() {
        assert_eq!(ChartPreference::Auto.charts().len(), ChartKind::ALL.len());
        assert_eq!(ChartPreference::Pie.charts(), vec![ChartKind::Pie]);
    }

    #[test]
    fn project_embeds_rows_settings_and_timestamp() {
        let table = crate::schema::infer(
            &crate::decode::decode_str("name,value\nA,1\n", crate::format::FormatKind::Csv).unwrap(),
        );
        let settings = DashboardSettings::default();
        let saved_at = Utc.with_ymd_and_hms(2024, 5, 6, 14, 30, 0).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&Project::new(&table, &settings, saved_at).to_json().unwrap()).unwrap();
        assert_eq!(json["data"][0]["name"], "A");
        assert_eq!(json["settings"]["theme"], "light");
        assert_eq!(json["settings"]["chart_type"], "auto");
        assert_eq!(json["timestamp"], "2024-05-06T14:30:00.000Z");
    }
}
