//! Static SVG page output: one file per panel, in page order.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::app::pipeline::DashboardReport;
use crate::charts::{Theme, draw_panel};
use crate::domain::Panel;
use crate::error::AppError;

/// Write all five panels under `dir`, creating it if needed.
pub fn write_svg_pages(report: &DashboardReport, dir: &Path, size: (u32, u32)) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::input(format!("Failed to create output directory '{}': {e}", dir.display())))?;

    let theme = Theme::page();
    let mut written = Vec::with_capacity(Panel::ALL.len());
    for panel in Panel::ALL {
        let path = dir.join(format!("{}.svg", panel.file_stem()));
        write_svg_panel(report, panel, &path, size, &theme)?;
        written.push(path);
    }
    Ok(written)
}

fn write_svg_panel(
    report: &DashboardReport,
    panel: Panel,
    path: &Path,
    size: (u32, u32),
    theme: &Theme,
) -> Result<(), AppError> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_panel(&root, panel, report, theme)
        .map_err(|e| AppError::runtime(format!("Failed to draw '{}': {e}", panel.title())))?;
    root.present()
        .map_err(|e| AppError::runtime(format!("Failed to write SVG '{}': {e}", path.display())))?;
    info!(path = %path.display(), panel = panel.title(), "wrote svg panel");
    Ok(())
}
