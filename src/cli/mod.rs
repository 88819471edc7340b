//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! loading, analysis and rendering.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DEFAULT_BINS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about = "Sales history & forecast dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (the default).
    Tui(TuiArgs),
    /// Print summary tables and an ASCII plot of the selected window.
    Report(ReportArgs),
    /// Write the render-data bundle as JSON, and optionally the window as CSV.
    Export(ExportArgs),
    /// Render the five panels to SVG files.
    Render(RenderArgs),
}

/// Where the input files live and which range to select.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Directory containing the three input CSVs (env: SALESDASH_DATA_DIR).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the transaction file path.
    #[arg(long)]
    pub transactions: Option<PathBuf>,

    /// Override the daily actuals file path.
    #[arg(long)]
    pub daily: Option<PathBuf>,

    /// Override the forecast file path.
    #[arg(long)]
    pub forecast: Option<PathBuf>,

    /// Range start (YYYY-MM-DD). Defaults to the earliest actual date.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD). Defaults to the latest forecast date.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Histogram bin count.
    #[arg(long, default_value_t = DEFAULT_BINS)]
    pub bins: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Log file (the terminal is owned by the UI).
    #[arg(long, default_value = "salesdash.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// ASCII plot width.
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height.
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Skip the ASCII plot.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output path for the JSON bundle.
    #[arg(long)]
    pub out: PathBuf,

    /// Also write the selected window as CSV.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output directory for the SVG pages.
    #[arg(long, default_value = "dashboard")]
    pub out: PathBuf,

    /// Page width in pixels.
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Page height in pixels.
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}
