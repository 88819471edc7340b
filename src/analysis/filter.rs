//! Date-range filtering of dated series.

use chrono::NaiveDate;

use crate::domain::{DateRange, Dated, ForecastPoint, SalesPoint};
use crate::error::AppError;

/// Keep the points whose date lies within `range` (inclusive), preserving order.
pub fn filter_range<T: Dated + Clone>(points: &[T], range: DateRange) -> Vec<T> {
    points
        .iter()
        .filter(|p| range.contains(p.date()))
        .cloned()
        .collect()
}

/// Earliest and latest date of a series, or `None` when it is empty.
pub fn date_bounds<T: Dated>(points: &[T]) -> Option<(NaiveDate, NaiveDate)> {
    let mut iter = points.iter().map(Dated::date);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// The selectable range: `[min(actual dates), max(forecast dates)]`.
pub fn selectable_range(actuals: &[SalesPoint], forecast: &[ForecastPoint]) -> Result<DateRange, AppError> {
    let (start, _) = date_bounds(actuals)
        .ok_or_else(|| AppError::data("Daily sales file has no rows; cannot derive a date range."))?;
    let (_, end) = date_bounds(forecast)
        .ok_or_else(|| AppError::data("Forecast file has no rows; cannot derive a date range."))?;
    DateRange::new(start, end).map_err(|_| {
        AppError::data(format!(
            "Earliest actual date {start} is after the latest forecast date {end}."
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn actuals() -> Vec<SalesPoint> {
        vec![
            SalesPoint { date: d(2024, 1, 1), sales: 100.0 },
            SalesPoint { date: d(2024, 1, 2), sales: 150.0 },
            SalesPoint { date: d(2024, 2, 1), sales: 200.0 },
        ]
    }

    #[test]
    fn january_window_keeps_first_two_points() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let out = filter_range(&actuals(), range);
        assert_eq!(out, actuals()[..2].to_vec());
    }

    #[test]
    fn full_range_is_identity() {
        let series = actuals();
        let (lo, hi) = date_bounds(&series).unwrap();
        let out = filter_range(&series, DateRange::new(lo, hi).unwrap());
        assert_eq!(out, series);
    }

    #[test]
    fn wider_range_returns_everything() {
        let range = DateRange::new(d(2000, 1, 1), d(2100, 1, 1)).unwrap();
        assert_eq!(filter_range(&actuals(), range).len(), 3);
    }

    #[test]
    fn single_day_returns_exactly_one_point() {
        let range = DateRange::new(d(2024, 1, 2), d(2024, 1, 2)).unwrap();
        let out = filter_range(&actuals(), range);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, d(2024, 1, 2));
    }

    #[test]
    fn gap_between_points_returns_empty() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 1, 20)).unwrap();
        assert!(filter_range(&actuals(), range).is_empty());
    }

    #[test]
    fn output_is_an_ordered_subsequence_within_range() {
        // Deliberately unsorted input: order must be preserved, not re-sorted.
        let series = vec![
            SalesPoint { date: d(2024, 3, 5), sales: 1.0 },
            SalesPoint { date: d(2024, 1, 5), sales: 2.0 },
            SalesPoint { date: d(2024, 2, 5), sales: 3.0 },
            SalesPoint { date: d(2024, 4, 5), sales: 4.0 },
            SalesPoint { date: d(2024, 2, 20), sales: 5.0 },
        ];
        let range = DateRange::new(d(2024, 2, 1), d(2024, 3, 31)).unwrap();
        let out = filter_range(&series, range);

        let sales: Vec<f64> = out.iter().map(|p| p.sales).collect();
        assert_eq!(sales, vec![1.0, 3.0, 5.0]);
        assert!(out.iter().all(|p| range.contains(p.date)));
    }

    #[test]
    fn selectable_range_spans_actual_start_to_forecast_end() {
        let forecast = vec![
            ForecastPoint { date: d(2024, 1, 15), yhat: 1.0, yhat_lower: 0.0, yhat_upper: 2.0 },
            ForecastPoint { date: d(2024, 3, 31), yhat: 1.0, yhat_lower: 0.0, yhat_upper: 2.0 },
        ];
        let range = selectable_range(&actuals(), &forecast).unwrap();
        assert_eq!(range.start(), d(2024, 1, 1));
        assert_eq!(range.end(), d(2024, 3, 31));
    }

    #[test]
    fn selectable_range_needs_both_series() {
        let err = selectable_range(&actuals(), &[]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
