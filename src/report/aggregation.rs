//! Aggregation helpers for report metrics and charts.
//!
//! These operate on the rows returned by [crate::report::transactions_for_period]
//! and feed the summary metrics, the pie chart, and the bar chart.

use std::collections::HashMap;

use crate::transaction::Transaction;

/// Sums the amounts of `transactions`.
///
/// Returns 0.0 for an empty slice, the expected outcome for a period with no
/// activity.
pub fn total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Sums transaction amounts per category.
///
/// The category set is exactly the distinct categories present in
/// `transactions`. Entries are sorted by label so charts and legends render
/// stably.
pub fn category_totals(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.as_ref()).or_insert(0.0) += transaction.amount;
    }

    let mut sorted: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, sum)| (category.to_owned(), sum))
        .collect();
    sorted.sort_by(|(a, _), (b, _)| a.cmp(b));

    sorted
}
