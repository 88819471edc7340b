//! Reporting utilities: window totals and formatted terminal output.

use serde::Serialize;

use crate::app::pipeline::WindowPanels;

pub mod format;

pub use format::{format_category_table, format_monthly_table, format_run_summary};

/// Sums over the selected window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTotals {
    pub actual_days: usize,
    pub actual_sales: f64,
    pub forecast_days: usize,
    pub forecast_sales: f64,
    pub forecast_lower: f64,
    pub forecast_upper: f64,
}

impl WindowTotals {
    pub fn of(window: &WindowPanels) -> Self {
        Self {
            actual_days: window.actual.len(),
            actual_sales: window.actual.iter().map(|p| p.sales).sum(),
            forecast_days: window.forecast.len(),
            forecast_sales: window.forecast.iter().map(|p| p.yhat).sum(),
            forecast_lower: window.forecast.iter().map(|p| p.yhat_lower).sum(),
            forecast_upper: window.forecast.iter().map(|p| p.yhat_upper).sum(),
        }
    }
}
