//! Distribution statistics for the histogram and box-plot panels.
//!
//! Plotters draws primitives only, so binning and quartiles are computed here.

use serde::Serialize;

use crate::domain::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.bins.first()?.lower, self.bins.last()?.upper))
    }
}

/// Equal-width histogram over `[min, max]` of the finite values.
///
/// The maximum falls into the last bin. A constant series produces a single
/// bin of width 1 centred on the value.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((min, max)) = min_max(&finite) else {
        return Histogram { bins: Vec::new() };
    };

    if max <= min {
        return Histogram {
            bins: vec![HistogramBin {
                lower: min - 0.5,
                upper: min + 0.5,
                count: finite.len(),
            }],
        };
    }

    let n = bins.max(1);
    let width = (max - min) / n as f64;
    let mut counts = vec![0usize; n];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(n - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == n { max } else { min + (i + 1) as f64 * width },
            count,
        })
        .collect();
    Histogram { bins }
}

/// Five-number summary plus outliers for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub category: String,
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 × IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 × IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Box statistics of `values`, or `None` when there are no finite values.
pub fn box_stats(category: &str, values: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let within = |v: &f64| *v >= lo_fence && *v <= hi_fence;
    let lower_whisker = sorted.iter().copied().find(within).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(within).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxStats {
        category: category.to_string(),
        count: sorted.len(),
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Profit box statistics per category, in order of first appearance.
pub fn profit_by_category(transactions: &[Transaction]) -> Vec<BoxStats> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for t in transactions {
        match groups.iter_mut().find(|(name, _)| *name == t.category) {
            Some((_, values)) => values.push(t.profit),
            None => groups.push((t.category.as_str(), vec![t.profit])),
        }
    }
    groups
        .into_iter()
        .filter_map(|(name, values)| box_stats(name, &values))
        .collect()
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn histogram_counts_cover_every_value() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 1.7).collect();
        let h = histogram(&values, 30);
        assert_eq!(h.bins.len(), 30);
        assert_eq!(h.total(), values.len());
        let (lo, hi) = h.range().unwrap();
        assert!((lo - 0.0).abs() < 1e-12);
        assert!((hi - 99.0 * 1.7).abs() < 1e-9);
    }

    #[test]
    fn histogram_puts_the_maximum_in_the_last_bin() {
        let h = histogram(&[0.0, 5.0, 10.0], 2);
        assert_eq!(h.bins[0].count, 1);
        assert_eq!(h.bins[1].count, 2);
    }

    #[test]
    fn constant_series_gets_one_centred_bin() {
        let h = histogram(&[4.0, 4.0, 4.0], 30);
        assert_eq!(h.bins, vec![HistogramBin { lower: 3.5, upper: 4.5, count: 3 }]);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(&[], 30).bins.is_empty());
        assert!(histogram(&[f64::NAN], 30).bins.is_empty());
    }

    #[test]
    fn box_stats_flag_points_beyond_the_fences() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let b = box_stats("Technology", &values).unwrap();
        assert!((b.q1 - 3.25).abs() < 1e-12);
        assert!((b.median - 5.5).abs() < 1e-12);
        assert!((b.q3 - 7.75).abs() < 1e-12);
        assert!((b.lower_whisker - 1.0).abs() < 1e-12);
        assert!((b.upper_whisker - 9.0).abs() < 1e-12);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.count, 10);
    }

    #[test]
    fn single_value_box_collapses() {
        let b = box_stats("x", &[2.5]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (2.5, 2.5, 2.5));
        assert!(b.outliers.is_empty());
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let date = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        let tx = |category: &str, profit: f64| Transaction {
            order_date: date,
            sales: 1.0,
            profit,
            category: category.to_string(),
        };
        let rows = vec![
            tx("Furniture", 10.0),
            tx("Office Supplies", -2.0),
            tx("Furniture", 30.0),
            tx("Technology", 5.0),
        ];
        let stats = profit_by_category(&rows);
        let names: Vec<&str> = stats.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, vec!["Furniture", "Office Supplies", "Technology"]);
        assert_eq!(stats[0].count, 2);
        assert!((stats[0].median - 20.0).abs() < 1e-12);
    }
}
