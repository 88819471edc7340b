//! Monthly average-sales aggregation.

use std::collections::BTreeMap;

use crate::domain::{MonthlyAverage, Transaction};

/// Group transactions by `(year, month)` of the order date and average sales.
///
/// The output is ordered chronologically; an empty input yields an empty series.
pub fn monthly_average(transactions: &[Transaction]) -> Vec<MonthlyAverage> {
    let mut groups: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for t in transactions {
        let entry = groups.entry(MonthlyAverage::key_of(t.order_date)).or_insert((0.0, 0));
        entry.0 += t.sales;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((year, month), (sum, count))| MonthlyAverage {
            year,
            month,
            label: MonthlyAverage::label_for(year, month),
            mean_sales: sum / count as f64,
            count,
        })
        .collect()
}
