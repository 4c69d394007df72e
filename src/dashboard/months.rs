//! Month-bucket normalization for trend charts.
//!
//! The month axis is always the trailing N calendar months ending at the
//! injected `today`, regardless of any date filter applied to the data
//! behind it. Missing months are filled with a caller-supplied default.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One calendar-month slot of a zero-filled series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket<V> {
    pub month: String,
    pub value: V,
}

/// Render the `YYYY-MM` key for a calendar month.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Expand a sparse `YYYY-MM`-keyed series into exactly `window_months`
/// contiguous ascending buckets ending at `today`'s month inclusive.
pub fn fill<V: Copy>(
    sparse: &BTreeMap<String, V>,
    window_months: u32,
    default_value: V,
    today: NaiveDate,
) -> Vec<MonthBucket<V>> {
    let anchor = today.year() * 12 + today.month() as i32 - 1;

    (0..window_months)
        .rev()
        .map(|offset| {
            let index = anchor - offset as i32;
            let key = month_key(index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
            let value = sparse.get(&key).copied().unwrap_or(default_value);
            MonthBucket { month: key, value }
        })
        .collect()
}
