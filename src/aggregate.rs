use indexmap::IndexMap;

use crate::coerce::CleanedRow;

/// Sum each row's y under its x label, in first-seen label order.
///
/// Returns `None` when there is nothing worth drawing: no labels at all, or
/// every sum is exactly zero.
pub fn aggregate_by_label(rows: &[CleanedRow<'_>]) -> Option<(Vec<String>, Vec<f64>)> {
    let mut sums: IndexMap<String, f64> = IndexMap::new();
    for row in rows {
        *sums.entry(row.x.to_label()).or_insert(0.0) += row.y;
    }

    if sums.is_empty() || sums.values().all(|&v| v == 0.0) {
        return None;
    }

    Some(sums.into_iter().unzip())
}
