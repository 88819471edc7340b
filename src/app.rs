//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - resolves the input files and the requested range
//! - hands the report to the chosen front-end

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DataArgs, ExportArgs, RenderArgs, ReportArgs, TuiArgs};
use crate::domain::{DashboardConfig, DataFiles};
use crate::error::AppError;
use crate::logging::LogTarget;

pub mod pipeline;

/// Environment variable naming the default input directory.
pub const DATA_DIR_ENV: &str = "SALESDASH_DATA_DIR";

/// Entry point for the `salesdash` binary.
pub fn run() -> Result<(), AppError> {
    // `salesdash` and `salesdash --start ...` behave like `salesdash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Render(args) => handle_render(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::logging::init(&LogTarget::File(args.log_file.clone()))?;
    let config = config_from_args(&args.data);
    crate::tui::run(config)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    crate::logging::init(&LogTarget::Stderr)?;
    let config = config_from_args(&args.data);
    let datasets = pipeline::load(&config)?;
    let report = pipeline::build_report(&datasets, &config)?;

    println!("{}", crate::report::format_run_summary(&datasets, &report));
    println!("{}", crate::report::format_monthly_table(&report));
    println!("{}", crate::report::format_category_table(&report));

    if !args.no_plot {
        let plot = crate::plot::render_ascii_plot(&report.window, args.width, args.height);
        println!("{plot}");
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    crate::logging::init(&LogTarget::Stderr)?;
    let config = config_from_args(&args.data);
    let datasets = pipeline::load(&config)?;
    let report = pipeline::build_report(&datasets, &config)?;

    crate::io::export::write_report_json(&args.out, &report)?;
    if let Some(path) = &args.csv {
        crate::io::export::write_window_csv(path, &report.window)?;
    }
    Ok(())
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    crate::logging::init(&LogTarget::Stderr)?;
    let config = config_from_args(&args.data);
    let datasets = pipeline::load(&config)?;
    let report = pipeline::build_report(&datasets, &config)?;

    let written = crate::charts::svg::write_svg_pages(&report, &args.out, (args.width, args.height))?;
    info!(count = written.len(), dir = %args.out.display(), "rendered dashboard pages");
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

/// Resolve CLI arguments (and `.env` / `SALESDASH_DATA_DIR`) into a config.
pub fn config_from_args(args: &DataArgs) -> DashboardConfig {
    dotenvy::dotenv().ok();
    let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    resolve_config(args, env_dir)
}

/// Precedence: per-file flag, then `--data-dir`, then the env directory, then `.`.
fn resolve_config(args: &DataArgs, env_dir: Option<PathBuf>) -> DashboardConfig {
    let dir = args
        .data_dir
        .clone()
        .or(env_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let defaults = DataFiles::in_dir(Path::new(&dir));

    DashboardConfig {
        files: DataFiles {
            transactions: args.transactions.clone().unwrap_or(defaults.transactions),
            daily: args.daily.clone().unwrap_or(defaults.daily),
            forecast: args.forecast.clone().unwrap_or(defaults.forecast),
        },
        start: args.start,
        end: args.end,
        bins: args.bins,
    }
}

/// Rewrite argv so `salesdash` defaults to `salesdash tui`.
///
/// Rules:
/// - `salesdash`                     -> `salesdash tui`
/// - `salesdash --start 2024-01-01`  -> `salesdash tui --start 2024-01-01`
/// - `salesdash --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "export" | "render");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_BINS;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn data_args() -> DataArgs {
        DataArgs {
            data_dir: None,
            transactions: None,
            daily: None,
            forecast: None,
            start: None,
            end: None,
            bins: DEFAULT_BINS,
        }
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["salesdash"])), argv(&["salesdash", "tui"]));
    }

    #[test]
    fn leading_flags_are_tui_flags() {
        assert_eq!(
            rewrite_args(argv(&["salesdash", "--start", "2024-01-01"])),
            argv(&["salesdash", "tui", "--start", "2024-01-01"]),
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        for args in [
            argv(&["salesdash", "report"]),
            argv(&["salesdash", "render", "--out", "x"]),
            argv(&["salesdash", "--help"]),
            argv(&["salesdash", "-V"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn files_default_to_the_current_directory() {
        let config = resolve_config(&data_args(), None);
        assert_eq!(config.files.transactions, PathBuf::from("./superstore_sales.csv"));
        assert_eq!(config.files.daily, PathBuf::from("./daily_sales.csv"));
        assert_eq!(config.files.forecast, PathBuf::from("./forecasted_sales.csv"));
    }

    #[test]
    fn data_dir_flag_beats_env_and_file_flags_beat_both() {
        let mut args = data_args();
        args.data_dir = Some(PathBuf::from("flag"));
        args.forecast = Some(PathBuf::from("other/f.csv"));

        let config = resolve_config(&args, Some(PathBuf::from("env")));
        assert_eq!(config.files.transactions, PathBuf::from("flag/superstore_sales.csv"));
        assert_eq!(config.files.forecast, PathBuf::from("other/f.csv"));

        let config = resolve_config(&data_args(), Some(PathBuf::from("env")));
        assert_eq!(config.files.daily, PathBuf::from("env/daily_sales.csv"));
    }
}
