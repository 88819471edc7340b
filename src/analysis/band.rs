//! Confidence-band polygon construction.

use chrono::NaiveDate;

use crate::domain::ForecastPoint;
use crate::error::AppError;

/// Build the closed band polygon for a forecast window.
///
/// The path runs forward along `yhat_upper`, then backward along `yhat_lower`.
pub fn confidence_band(window: &[ForecastPoint]) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let upper: Vec<(NaiveDate, f64)> = window.iter().map(|p| (p.date, p.yhat_upper)).collect();
    let lower: Vec<(NaiveDate, f64)> = window.iter().map(|p| (p.date, p.yhat_lower)).collect();
    band_polygon(&upper, &lower)
}

/// Join an upper and a lower bound curve into one polygon of length `2 × n`.
///
/// Both curves must have the same length and the same date at every index.
pub fn band_polygon(
    upper: &[(NaiveDate, f64)],
    lower: &[(NaiveDate, f64)],
) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    if upper.len() != lower.len() {
        return Err(AppError::runtime(format!(
            "Confidence band bounds differ in length (upper={}, lower={}).",
            upper.len(),
            lower.len()
        )));
    }
    if let Some((u, l)) = upper.iter().zip(lower).find(|(u, l)| u.0 != l.0) {
        return Err(AppError::runtime(format!(
            "Confidence band bounds are misaligned: upper at {} pairs with lower at {}.",
            u.0, l.0
        )));
    }

    let mut polygon = Vec::with_capacity(upper.len() * 2);
    polygon.extend_from_slice(upper);
    polygon.extend(lower.iter().rev().copied());
    Ok(polygon)
}
