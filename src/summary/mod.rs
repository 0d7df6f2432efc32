//! Per-category aggregation of transactions.
//!
//! The summary is a pure function of the current category and transaction
//! snapshots: it holds no state between calls and is simply recomputed
//! whenever either set changes. That is O(transactions) per change, which
//! is fine at personal-finance volumes.

use std::collections::HashMap;

use time::{OffsetDateTime, Time};

use crate::{
    category::{Category, CategoryName, Color, IconKey},
    transaction::{Transaction, TransactionKind},
};

mod live;

pub use live::{SummaryFeed, watch_summary};

/// Time window restricting which transactions count toward a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeWindow {
    /// Every transaction regardless of date.
    AllTime,
    /// Transactions with `start <= createdAt < end`.
    Between {
        /// Inclusive lower bound.
        start: OffsetDateTime,
        /// Exclusive upper bound.
        end: OffsetDateTime,
    },
}

impl TimeWindow {
    /// The window covering the current calendar month so far: from midnight
    /// on the first of `now`'s month up to, but not including, `now`.
    pub fn current_month(now: OffsetDateTime) -> Self {
        let start = now
            .replace_day(1)
            .expect("every month has a first day")
            .replace_time(Time::MIDNIGHT);

        Self::Between { start, end: now }
    }

    /// Whether `instant` falls inside this window.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        match self {
            TimeWindow::AllTime => true,
            TimeWindow::Between { start, end } => *start <= instant && instant < *end,
        }
    }
}

/// One card in the category summary view.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    /// The category's name.
    pub label: CategoryName,
    /// Sum of the matching transaction amounts, zero when none match.
    pub amount: f64,
    /// The category's card color.
    pub color: Color,
    /// The category's card icon.
    pub icon: IconKey,
}

/// Total the matching transaction amounts per known category.
///
/// Produces one entry per category, in the order given, with a zero total
/// for categories no transaction matched. Transactions that are
/// uncategorized, or whose category name matches no known category, are
/// excluded rather than synthesized into a phantom bucket.
pub fn summarize(
    categories: &[Category],
    transactions: &[Transaction],
    kind: TransactionKind,
    window: TimeWindow,
) -> Vec<CategorySummary> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        if transaction.kind != kind || !window.contains(transaction.created_at) {
            continue;
        }

        let Some(category) = &transaction.category else {
            continue;
        };

        *totals.entry(category.as_ref()).or_insert(0.0) += transaction.amount.as_f64();
    }

    categories
        .iter()
        .map(|category| CategorySummary {
            label: category.name.clone(),
            amount: totals.get(category.name.as_ref()).copied().unwrap_or(0.0),
            color: category.color.clone(),
            icon: category.icon.clone(),
        })
        .collect()
}

#[cfg(test)]
mod window_tests {
    use time::macros::datetime;

    use super::TimeWindow;

    #[test]
    fn current_month_starts_at_midnight_on_the_first() {
        let now = datetime!(2024-03-20 15:30 UTC);

        let window = TimeWindow::current_month(now);

        assert!(window.contains(datetime!(2024-03-01 00:00 UTC)));
        assert!(window.contains(datetime!(2024-03-19 23:59 UTC)));
        assert!(!window.contains(datetime!(2024-02-29 23:59 UTC)));
        // The upper bound is exclusive.
        assert!(!window.contains(now));
    }

    #[test]
    fn all_time_contains_everything() {
        assert!(TimeWindow::AllTime.contains(datetime!(1970-01-01 00:00 UTC)));
        assert!(TimeWindow::AllTime.contains(datetime!(2999-12-31 23:59 UTC)));
    }
}
