//! Formatted terminal output for the `report` command.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (golden tests below)

use crate::app::pipeline::DashboardReport;
use crate::analysis::{BoxStats, date_bounds};
use crate::io::ingest::Datasets;
use crate::report::WindowTotals;

/// Dataset sizes, the selected window and its totals.
pub fn format_run_summary(datasets: &Datasets, report: &DashboardReport) -> String {
    let mut out = String::new();

    out.push_str("=== salesdash - Sales History & Forecast ===\n");
    out.push_str(&format!(
        "Transactions: n={} | categories={}\n",
        datasets.transactions.len(),
        report.overview.profit_by_category.len(),
    ));
    out.push_str(&format!("Actuals: n={}{}\n", datasets.actuals.len(), span(date_bounds(&datasets.actuals))));
    out.push_str(&format!("Forecast: n={}{}\n", datasets.forecast.len(), span(date_bounds(&datasets.forecast))));
    out.push_str(&format!("Range: {} (bounds: {})\n", report.window.range, report.bounds));

    let totals = WindowTotals::of(&report.window);
    out.push_str(&format!(
        "Window: actual n={} total={:.2} | forecast n={} total={:.2} [{:.2}, {:.2}]\n",
        totals.actual_days,
        totals.actual_sales,
        totals.forecast_days,
        totals.forecast_sales,
        totals.forecast_lower,
        totals.forecast_upper,
    ));

    if report.band_violations.is_empty() {
        out.push_str("Band violations: none\n");
    } else {
        let shown: Vec<String> = report.band_violations.iter().take(5).map(|d| d.to_string()).collect();
        let more = report.band_violations.len().saturating_sub(shown.len());
        out.push_str(&format!(
            "Band violations: {} ({}{})\n",
            report.band_violations.len(),
            shown.join(", "),
            if more > 0 { format!(", +{more} more") } else { String::new() },
        ));
    }

    out
}

/// Monthly average sales table.
pub fn format_monthly_table(report: &DashboardReport) -> String {
    let mut out = String::new();
    out.push_str("Monthly average sales:\n");
    if report.overview.monthly_average.is_empty() {
        out.push_str("  (no transactions)\n");
        return out;
    }
    out.push_str(&format!("  {:<8} {:>12} {:>6}\n", "month", "avg_sales", "n"));
    for m in &report.overview.monthly_average {
        out.push_str(&format!("  {:<8} {:>12.2} {:>6}\n", m.label, m.mean_sales, m.count));
    }
    out
}

/// Per-category profit box statistics.
pub fn format_category_table(report: &DashboardReport) -> String {
    let mut out = String::new();
    out.push_str("Profit by category:\n");
    if report.overview.profit_by_category.is_empty() {
        out.push_str("  (no transactions)\n");
        return out;
    }
    let width = report
        .overview
        .profit_by_category
        .iter()
        .map(|b| b.category.len())
        .max()
        .unwrap_or(8)
        .max(8);
    out.push_str(&format!(
        "  {:<width$} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "category", "n", "low", "q1", "median", "q3", "high", "outliers",
    ));
    for b in &report.overview.profit_by_category {
        out.push_str(&category_row(b, width));
    }
    out
}

fn category_row(b: &BoxStats, width: usize) -> String {
    format!(
        "  {:<width$} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>8}\n",
        b.category,
        b.count,
        b.lower_whisker,
        b.q1,
        b.median,
        b.q3,
        b.upper_whisker,
        b.outliers.len(),
    )
}

fn span(bounds: Option<(chrono::NaiveDate, chrono::NaiveDate)>) -> String {
    match bounds {
        Some((lo, hi)) => format!(" | ds=[{lo}, {hi}]"),
        None => String::new(),
    }
}
