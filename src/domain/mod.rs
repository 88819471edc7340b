//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the three input record types (`Transaction`, `SalesPoint`, `ForecastPoint`)
//! - the user-selected `DateRange`
//! - derived values (`MonthlyAverage`) and run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
