//! The dashboard's computational core.
//!
//! - date-range filtering (`filter`)
//! - monthly average sales (`monthly`)
//! - confidence-band polygons (`band`)
//! - histogram and box statistics (`stats`)

pub mod band;
pub mod filter;
pub mod monthly;
pub mod stats;

pub use band::{band_polygon, confidence_band};
pub use filter::{date_bounds, filter_range, selectable_range};
pub use monthly::monthly_average;
pub use stats::{BoxStats, Histogram, HistogramBin, box_stats, histogram, profit_by_category};
