//! Shared domain types.
//!
//! These types are intentionally kept as plain, serializable values so they can be:
//!
//! - loaded once and passed by reference into the filter/aggregate functions
//! - exported to JSON/CSV
//! - rendered by either the TUI or the SVG page writer

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Anything that sits on the date axis.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// One historical order line from the transactional file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
    pub category: String,
}

impl Dated for Transaction {
    fn date(&self) -> NaiveDate {
        self.order_date
    }
}

/// Observed total sales for one day (`ds`, `y`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub date: NaiveDate,
    pub sales: f64,
}

impl Dated for SalesPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Predicted sales for one day with its confidence bounds.
///
/// Expected to satisfy `yhat_lower <= yhat <= yhat_upper`, but values are kept
/// exactly as read; see [`ForecastPoint::band_is_ordered`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    pub fn band_is_ordered(&self) -> bool {
        self.yhat_lower <= self.yhat && self.yhat <= self.yhat_upper
    }
}

impl Dated for ForecastPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Inclusive `[start, end]` date interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::input(format!(
                "Invalid date range: start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Pull `date` into this range.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }

    /// Number of calendar days covered (inclusive).
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Mean sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`.
    pub label: String,
    pub mean_sales: f64,
    /// Number of transactions that fell into this month.
    pub count: usize,
}

impl MonthlyAverage {
    pub fn key_of(date: NaiveDate) -> (i32, u32) {
        (date.year(), date.month())
    }

    pub fn label_for(year: i32, month: u32) -> String {
        format!("{year:04}-{month:02}")
    }
}

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub transactions: PathBuf,
    pub daily: PathBuf,
    pub forecast: PathBuf,
}

impl DataFiles {
    pub const TRANSACTIONS_FILE: &'static str = "superstore_sales.csv";
    pub const DAILY_FILE: &'static str = "daily_sales.csv";
    pub const FORECAST_FILE: &'static str = "forecasted_sales.csv";

    /// Default file names under `dir`.
    pub fn in_dir(dir: &std::path::Path) -> Self {
        Self {
            transactions: dir.join(Self::TRANSACTIONS_FILE),
            daily: dir.join(Self::DAILY_FILE),
            forecast: dir.join(Self::FORECAST_FILE),
        }
    }
}

/// Default histogram bin count (the dashboard's `nbins`).
pub const DEFAULT_BINS: usize = 30;

/// Fully-resolved configuration for one dashboard run.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub files: DataFiles,
    /// Requested range start; `None` means the earliest actual date.
    pub start: Option<NaiveDate>,
    /// Requested range end; `None` means the latest forecast date.
    pub end: Option<NaiveDate>,
    pub bins: usize,
}

/// The five dashboard panels, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    ActualVsForecast,
    SalesTrend,
    Distributions,
    ProfitByCategory,
    MonthlyAverage,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::ActualVsForecast,
        Panel::SalesTrend,
        Panel::Distributions,
        Panel::ProfitByCategory,
        Panel::MonthlyAverage,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::ActualVsForecast => "Actual vs Forecasted Daily Sales",
            Panel::SalesTrend => "Historical Sales Over Time",
            Panel::Distributions => "Distribution of Sales and Profit",
            Panel::ProfitByCategory => "Profit Outliers by Category",
            Panel::MonthlyAverage => "Monthly Average Sales",
        }
    }

    /// File stem used by the SVG page writer.
    pub fn file_stem(self) -> &'static str {
        match self {
            Panel::ActualVsForecast => "1_actual_vs_forecast",
            Panel::SalesTrend => "2_sales_trend",
            Panel::Distributions => "3_distributions",
            Panel::ProfitByCategory => "4_profit_by_category",
            Panel::MonthlyAverage => "5_monthly_average",
        }
    }
}
