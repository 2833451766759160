pub mod cli;
pub mod data;
pub mod decode;
pub mod error;
pub mod export;
pub mod format;
pub mod frequency;
pub mod io_utils;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod settings;
pub mod shape;
pub mod stats;
pub mod table;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    decode::DecodeOptions,
    pipeline::Dataset,
    settings::{DashboardSettings, Project},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("chart_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect(args) => handle_inspect(&args),
        Commands::Chart(args) => handle_chart(&args),
        Commands::Kpi(args) => handle_kpi(&args),
        Commands::Frequency(args) => handle_frequency(&args),
        Commands::Export(args) => handle_export(&args),
        Commands::Project(args) => handle_project(&args),
    }
}

fn load_dataset(args: &InputArgs) -> Result<Dataset> {
    let options = DecodeOptions {
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        max_bytes: args.max_bytes,
    };
    debug!(
        "Decoding {:?} (format override: {:?}, encoding: {})",
        args.input,
        args.format,
        options.encoding.name()
    );
    pipeline::load_path(&args.input, args.format, &options)
        .with_context(|| format!("Decoding {:?}", args.input))
}

fn load_settings(path: Option<&Path>) -> Result<DashboardSettings> {
    match path {
        Some(path) => DashboardSettings::load(path),
        None => Ok(DashboardSettings::default()),
    }
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    println!(
        "{}: {} row(s), {} field(s), decoded as {}",
        dataset.source,
        dataset.table.row_count(),
        dataset.table.fields().len(),
        dataset.format
    );
    println!();
    print!("{}", table::render_fields(&dataset.table, &dataset.report));
    if args.rows > 0 && !dataset.table.is_empty() {
        println!();
        print!("{}", table::render_preview(&dataset.table, args.rows));
    }
    Ok(())
}

fn handle_chart(args: &cli::ChartArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    let kinds = if args.kinds.is_empty() {
        load_settings(args.settings.as_deref())?.chart_type.charts()
    } else {
        args.kinds.clone()
    };
    let charts = dataset.charts(&kinds);
    let json = serde_json::to_string_pretty(&charts).context("Serializing chart records")?;
    io_utils::write_output(args.output.as_deref(), &json)?;
    info!(
        "Shaped {} chart(s) from {}",
        kinds.len(),
        dataset.source
    );
    Ok(())
}

fn handle_kpi(args: &cli::KpiArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    let kpis = dataset.kpis();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&kpis)?);
    } else {
        let headers = vec!["metric".to_string(), "value".to_string()];
        table::print_table(&headers, &kpis.render_rows());
    }
    Ok(())
}

fn handle_frequency(args: &cli::FrequencyArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    let columns = frequency::resolve_fields(&dataset.table, &args.columns)?;
    let rows = frequency::frequencies(&dataset.table, &columns, args.top);
    let headers = ["field", "value", "count", "percent"]
        .map(String::from)
        .to_vec();
    let rendered = rows.iter().map(|row| row.render()).collect::<Vec<_>>();
    table::print_table(&headers, &rendered);
    info!(
        "Counted {} distinct value(s) across {} field(s)",
        rows.len(),
        columns.len()
    );
    Ok(())
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    let format = match args.export_format {
        Some(format) => format,
        None => load_settings(args.settings.as_deref())?.export_format,
    };
    let contents = export::export(&dataset.table, format)
        .with_context(|| format!("Exporting {} as {}", dataset.source, format.extension()))?;
    io_utils::write_output(args.output.as_deref(), &contents)?;
    info!(
        "Exported {} row(s) from {} as {}",
        dataset.table.row_count(),
        dataset.source,
        format.extension()
    );
    Ok(())
}

fn handle_project(args: &cli::ProjectArgs) -> Result<()> {
    let dataset = load_dataset(&args.source)?;
    let settings = load_settings(args.settings.as_deref())?;
    let project = Project::new(&dataset.table, &settings, Utc::now());
    io_utils::write_output(args.output.as_deref(), &project.to_json()?)?;
    info!(
        "Saved project with {} row(s) at {}",
        dataset.table.row_count(),
        project.timestamp
    );
    Ok(())
}
