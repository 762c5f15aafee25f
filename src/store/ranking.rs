//! Ordering of catalog records.

use crate::store::models::CatalogRecord;

/// Sorts records by savings, largest first. Equal savings keep capture order.
pub fn rank_by_savings(records: &mut [CatalogRecord]) {
    records.sort_by(|a, b| b.savings.total_cmp(&a.savings));
}
