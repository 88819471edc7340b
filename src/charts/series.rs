//! Axis mapping and tick-label helpers shared by every panel.
//!
//! Dates are plotted as `f64` day numbers (days since the Common Era) so all
//! panels use the same `RangedCoordf64` coordinate type.

use chrono::{Datelike, NaiveDate};

use crate::domain::MonthlyAverage;

pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn date_from_day_number(v: f64) -> Option<NaiveDate> {
    if !v.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
}

pub fn date_label(v: f64) -> String {
    date_from_day_number(v).map(|d| d.to_string()).unwrap_or_default()
}

/// Compact value labels: `1.2k`, `-350`, `0.75`.
pub fn value_label(v: f64) -> String {
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else if a >= 10.0 || a == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Label for integer positions on a categorical axis; blank between them.
pub fn category_label(names: &[&str], v: f64) -> String {
    index_at(v, names.len())
        .map(|i| names[i].to_string())
        .unwrap_or_default()
}

pub fn month_label(months: &[MonthlyAverage], v: f64) -> String {
    index_at(v, months.len())
        .map(|i| months[i].label.clone())
        .unwrap_or_default()
}

fn index_at(v: f64, len: usize) -> Option<usize> {
    let r = v.round();
    if (v - r).abs() > 1e-6 || r < 0.0 {
        return None;
    }
    let i = r as usize;
    (i < len).then_some(i)
}

/// Padded `(min, max)` of the finite values, `(0, 1)` when there are none.
pub fn value_bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi <= lo {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_numbers_round_trip_to_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_label(day_number(d)), "2024-02-29");
        assert_eq!(date_label(day_number(d) + 0.3), "2024-02-29");
        assert_eq!(date_label(f64::NAN), "");
    }

    #[test]
    fn value_labels_are_compact() {
        assert_eq!(value_label(1500.0), "1.5k");
        assert_eq!(value_label(-350.0), "-350");
        assert_eq!(value_label(0.75), "0.75");
        assert_eq!(value_label(2_500_000.0), "2.5M");
        assert_eq!(value_label(0.0), "0");
    }

    #[test]
    fn category_labels_only_at_integer_ticks() {
        let names = ["Furniture", "Technology"];
        assert_eq!(category_label(&names, 0.0), "Furniture");
        assert_eq!(category_label(&names, 1.0), "Technology");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 2.0), "");
        assert_eq!(category_label(&names, -1.0), "");
    }

    #[test]
    fn value_bounds_pad_and_fallback() {
        let (lo, hi) = value_bounds([100.0, 200.0]);
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
        assert_eq!(value_bounds(Vec::<f64>::new()), (0.0, 1.0));
        assert_eq!(value_bounds([5.0, 5.0]), (4.0, 6.0));
        assert_eq!(value_bounds([f64::NAN]), (0.0, 1.0));
    }
}
