use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    export::ExportFormat, format::FormatKind, io_utils::DEFAULT_MAX_BYTES, shape::ChartKind,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn uploaded data files into chart-ready series", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a file and show the inferred fields and the first rows
    Inspect(InspectArgs),
    /// Shape the decoded table into chart records (JSON)
    Chart(ChartArgs),
    /// Print the dashboard KPI aggregates
    Kpi(KpiArgs),
    /// Produce value frequency counts per field
    Frequency(FrequencyArgs),
    /// Re-serialize the decoded table as CSV or JSON
    Export(ExportArgs),
    /// Save the table and presentation settings as a project document
    Project(ProjectArgs),
}

/// Options shared by every subcommand that reads an upload.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file (`-` for stdin, which requires --format)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Decode as this format instead of going by the file extension
    #[arg(long, value_parser = parse_format)]
    pub format: Option<FormatKind>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Reject inputs larger than this many bytes
    #[arg(long = "max-bytes", default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: u64,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Number of rows to preview
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Chart to shape; repeat for several. Defaults to the settings' chart type
    #[arg(short = 'k', long = "kind", value_enum, action = clap::ArgAction::Append)]
    pub kinds: Vec<ChartKind>,
    /// YAML file with presentation settings
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct KpiArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Emit the aggregates as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Fields to count (all fields when omitted)
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
    /// Keep only the N most frequent values per field (0 keeps all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Output format; defaults to the settings' export format
    #[arg(long = "export-format", value_enum)]
    pub export_format: Option<ExportFormat>,
    /// YAML file with presentation settings
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// YAML file with presentation settings
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_format(value: &str) -> Result<FormatKind, String> {
    value.parse::<FormatKind>().map_err(|err| err.to_string())
}
