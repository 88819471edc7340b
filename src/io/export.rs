//! Export the render bundle to JSON and the filtered window to CSV.
//!
//! Both exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::app::pipeline::{DashboardReport, WindowPanels};
use crate::error::AppError;

/// Write the whole report as pretty JSON.
pub fn write_report_json(path: &Path, report: &DashboardReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| AppError::input(format!("Failed to write report JSON: {e}")))?;

    info!(path = %path.display(), "wrote report json");
    Ok(())
}

/// Write the selected window as CSV, outer-joined on date.
///
/// Columns: `ds,y,yhat,yhat_lower,yhat_upper`. Missing sides are left empty.
pub fn write_window_csv(path: &Path, window: &WindowPanels) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    write_window_csv_to(&mut out, window)?;
    out.flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), "wrote window csv");
    Ok(())
}

#[derive(Default)]
struct JoinedRow {
    y: Option<f64>,
    forecast: Option<(f64, f64, f64)>,
}

fn write_window_csv_to<W: Write>(out: &mut W, window: &WindowPanels) -> Result<(), AppError> {
    let mut rows: BTreeMap<NaiveDate, JoinedRow> = BTreeMap::new();
    for p in &window.actual {
        rows.entry(p.date).or_default().y = Some(p.sales);
    }
    for p in &window.forecast {
        rows.entry(p.date).or_default().forecast = Some((p.yhat, p.yhat_lower, p.yhat_upper));
    }

    writeln!(out, "ds,y,yhat,yhat_lower,yhat_upper")
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for (date, row) in rows {
        let y = row.y.map(|v| format!("{v:.4}")).unwrap_or_default();
        let (yhat, lo, hi) = match row.forecast {
            Some((yhat, lo, hi)) => (format!("{yhat:.4}"), format!("{lo:.4}"), format!("{hi:.4}")),
            None => Default::default(),
        };
        writeln!(out, "{date},{y},{yhat},{lo},{hi}")
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_report;
    use crate::app::pipeline::tests::{d, sample_config, sample_datasets};

    #[test]
    fn window_csv_outer_joins_on_date() {
        let config = sample_config(Some(d(2024, 1, 1)), Some(d(2024, 3, 1)));
        let report = build_report(&sample_datasets(), &config).unwrap();

        let mut buf = Vec::new();
        write_window_csv_to(&mut buf, &report.window).unwrap();
        let txt = String::from_utf8(buf).unwrap();

        let expected = concat!(
            "ds,y,yhat,yhat_lower,yhat_upper\n",
            "2024-01-01,100.0000,120.0000,100.0000,140.0000\n",
            "2024-01-02,150.0000,140.0000,120.0000,160.0000\n",
            "2024-02-01,200.0000,190.0000,170.0000,210.0000\n",
            "2024-03-01,,210.0000,180.0000,240.0000\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn report_json_carries_every_panel() {
        let report = build_report(&sample_datasets(), &sample_config(None, None)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["window"]["band"].is_array());
        assert_eq!(value["overview"]["monthly_average"][0]["label"], "2024-01");
        assert_eq!(value["bounds"]["start"], "2024-01-01");
        assert!(value["band_violations"].as_array().unwrap().is_empty());
    }
}
