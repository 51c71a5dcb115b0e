//! SAP expense map: posted amounts keyed by order number and month
//!
//! Keys are `"{order}-{year_month}"`. Two month encodings exist in the wild:
//! hyphenated ("4500012345-2025-01") from the current export and compact
//! ("4500012345-202501") from older ones. Lookups try the hyphenated form
//! first and fall back to compact; a miss on both degrades to zero.

use std::collections::HashMap;
use tracing::warn;

/// Posted expense amounts, keyed `"{order}-{year_month}"`
pub type ExpenseMap = HashMap<String, f64>;

/// Build the hyphenated expense key ("4500012345-2025-01")
pub fn expense_key(order_num: &str, year_month: &str) -> String {
    format!("{}-{}", order_num, year_month)
}

/// Monthly posted expense for a device and year-month bucket.
///
/// Tries the hyphenated key, then the compact one; a double miss is logged
/// and reported as 0.0, never an error.
pub fn monthly_expense(map: &ExpenseMap, order_num: &str, year_month: &str) -> f64 {
    let key_dash = expense_key(order_num, year_month);
    if let Some(amount) = map.get(&key_dash) {
        return *amount;
    }

    let key_compact = format!("{}-{}", order_num, year_month.replace('-', ""));
    if let Some(amount) = map.get(&key_compact) {
        return *amount;
    }

    warn!(%key_dash, %key_compact, "no SAP posting found for expense key");
    0.0
}
