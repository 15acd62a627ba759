use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use banda_core::{clean_sources, CleanedTables, CleanerConfig, CleaningReport};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::Table as TextTable;
use polars::prelude::{CsvWriter, SerWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Banda tsunami dataset cleaner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load samples, params and outputs, and drop duplicated or invalid runs
    Clean(CleanArgs),
    /// Print the effective configuration as TOML
    ShowConfig(ConfigArgs),
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Sampled parameters table (overrides the config)
    #[arg(long)]
    samples: Option<PathBuf>,
    /// Model input parameters table (overrides the config)
    #[arg(long)]
    params: Option<PathBuf>,
    /// Simulation output table (overrides the config)
    #[arg(long)]
    output: Option<PathBuf>,
    /// How to print the cleaning report
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,
    /// Also write the cleaned tables as CSV into this directory
    #[arg(long)]
    write_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Clean(args) => handle_clean(args),
        Command::ShowConfig(args) => handle_show_config(args),
    }
}

fn load_config(args: &ConfigArgs) -> Result<CleanerConfig> {
    match &args.config {
        Some(path) => CleanerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CleanerConfig::default()),
    }
}

fn effective_config(args: &CleanArgs) -> Result<CleanerConfig> {
    let mut config = load_config(&args.config)?;
    if let Some(path) = &args.samples {
        config.sources.samples = path.clone();
    }
    if let Some(path) = &args.params {
        config.sources.params = path.clone();
    }
    if let Some(path) = &args.output {
        config.sources.output = path.clone();
    }
    Ok(config)
}

fn handle_clean(args: CleanArgs) -> Result<()> {
    let config = effective_config(&args)?;

    let cleaned = clean_sources(&config.sources, &config.columns)
        .context("failed to clean simulation tables")?;

    match args.format {
        ReportFormat::Table => println!("{}", render_report(&cleaned.report)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&cleaned.report)?),
    }

    if let Some(dir) = &args.write_dir {
        write_tables(&cleaned, dir)?;
        info!(dir = %dir.display(), "Wrote cleaned tables");
    }

    Ok(())
}

fn handle_show_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn render_report(report: &CleaningReport) -> TextTable {
    let mut table = TextTable::new();
    table.set_header(vec!["step", "rows"]);
    table.add_row(vec!["loaded".to_string(), report.loaded_rows.to_string()]);
    table.add_row(vec![
        "duplicate params dropped".to_string(),
        report.duplicate_rows_dropped.to_string(),
    ]);
    table.add_row(vec![
        "negative arrival dropped".to_string(),
        report.negative_arrival_rows_dropped.to_string(),
    ]);
    table.add_row(vec!["dropped".to_string(), report.rows_dropped().to_string()]);
    table.add_row(vec!["retained".to_string(), report.retained_rows.to_string()]);
    table
}

/// Writes each table with its surviving row labels as the leading unnamed
/// column, the same layout the inputs are read with.
fn write_tables(cleaned: &CleanedTables, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let outputs = [
        ("cleaned_samples.csv", &cleaned.samples),
        ("cleaned_params.csv", &cleaned.params),
        ("cleaned_output.csv", &cleaned.output),
    ];

    for (file_name, table) in outputs {
        let path = dir.join(file_name);
        let mut frame = table.to_indexed_frame("")?;
        let mut file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
