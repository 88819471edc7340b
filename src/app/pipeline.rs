//! Shared "report pipeline" logic used by the TUI, the text report and the exporters.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> resolve range -> filter -> band -> aggregate
//!
//! The front-ends then focus on presentation (widgets vs text vs files).

use serde::Serialize;
use tracing::debug;

use chrono::NaiveDate;

use crate::analysis::{self, BoxStats, Histogram};
use crate::domain::{DashboardConfig, DateRange, ForecastPoint, MonthlyAverage, SalesPoint};
use crate::error::AppError;
use crate::io::ingest::{self, Datasets};

/// Panels 1 and 2: everything that depends on the selected range.
#[derive(Debug, Clone, Serialize)]
pub struct WindowPanels {
    pub range: DateRange,
    pub actual: Vec<SalesPoint>,
    pub forecast: Vec<ForecastPoint>,
    /// Closed band polygon: upper bound forward, lower bound reversed.
    pub band: Vec<(NaiveDate, f64)>,
}

/// Panels 3 to 5: computed over the full, unfiltered transactions.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewPanels {
    pub sales_histogram: Histogram,
    pub profit_histogram: Histogram,
    pub profit_by_category: Vec<BoxStats>,
    pub monthly_average: Vec<MonthlyAverage>,
}

/// The render-data bundle for one dashboard state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Selectable bounds: `[min(actual dates), max(forecast dates)]`.
    pub bounds: DateRange,
    pub window: WindowPanels,
    pub overview: OverviewPanels,
    pub band_violations: Vec<NaiveDate>,
}

impl DashboardReport {
    /// Re-select the date range, reusing the full-dataset panels.
    pub fn with_range(&self, datasets: &Datasets, range: DateRange) -> Result<Self, AppError> {
        Ok(Self {
            bounds: self.bounds,
            window: build_window(datasets, range)?,
            overview: self.overview.clone(),
            band_violations: self.band_violations.clone(),
        })
    }
}

/// Load the three input files named by the config.
pub fn load(config: &DashboardConfig) -> Result<Datasets, AppError> {
    ingest::load_datasets(&config.files)
}

/// Resolve an optional start/end pair against the selectable bounds.
///
/// Missing ends default to the bounds; given ends are clamped into them.
/// An inverted pair is rejected.
pub fn resolve_range(
    bounds: DateRange,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, AppError> {
    let start = bounds.clamp(start.unwrap_or(bounds.start()));
    let end = bounds.clamp(end.unwrap_or(bounds.end()));
    DateRange::new(start, end)
}

/// Filter both series to `range` and build the band for the forecast window.
pub fn build_window(datasets: &Datasets, range: DateRange) -> Result<WindowPanels, AppError> {
    let actual = analysis::filter_range(&datasets.actuals, range);
    let forecast = analysis::filter_range(&datasets.forecast, range);
    let band = analysis::confidence_band(&forecast)?;
    debug!(
        start = %range.start(),
        end = %range.end(),
        actual = actual.len(),
        forecast = forecast.len(),
        "filtered window"
    );
    Ok(WindowPanels {
        range,
        actual,
        forecast,
        band,
    })
}

pub fn build_overview(datasets: &Datasets, bins: usize) -> OverviewPanels {
    let sales: Vec<f64> = datasets.transactions.iter().map(|t| t.sales).collect();
    let profit: Vec<f64> = datasets.transactions.iter().map(|t| t.profit).collect();
    OverviewPanels {
        sales_histogram: analysis::histogram(&sales, bins),
        profit_histogram: analysis::histogram(&profit, bins),
        profit_by_category: analysis::profit_by_category(&datasets.transactions),
        monthly_average: analysis::monthly_average(&datasets.transactions),
    }
}

/// Build the full report for the config's requested range.
pub fn build_report(datasets: &Datasets, config: &DashboardConfig) -> Result<DashboardReport, AppError> {
    let bounds = analysis::selectable_range(&datasets.actuals, &datasets.forecast)?;
    let range = resolve_range(bounds, config.start, config.end)?;
    Ok(DashboardReport {
        bounds,
        window: build_window(datasets, range)?,
        overview: build_overview(datasets, config.bins),
        band_violations: datasets.band_violations.clone(),
    })
}
