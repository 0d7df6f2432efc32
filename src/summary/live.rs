//! Live summary projection driven by store subscriptions.
//!
//! The feed subscribes to the category and transaction collections and
//! re-derives the whole summary from the latest snapshots on every
//! notification, preserving the pure-function contract of
//! [summarize](super::summarize). Nothing is maintained incrementally.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::{
    category::Category,
    scope::AccountScope,
    store::{Document, DocumentStore},
    transaction::{Transaction, TransactionKind},
};

use super::{CategorySummary, TimeWindow, summarize};

/// A continuously re-derived category summary.
///
/// Dropping the feed unsubscribes from both collections.
pub struct SummaryFeed<S: DocumentStore> {
    receiver: watch::Receiver<Vec<CategorySummary>>,
    _categories: S::Subscription,
    _transactions: S::Subscription,
}

impl<S: DocumentStore> SummaryFeed<S> {
    /// The most recently derived summary.
    pub fn current(&self) -> Vec<CategorySummary> {
        self.receiver.borrow().clone()
    }

    /// Waits until a new summary has been published.
    ///
    /// Follows `tokio::sync::watch` semantics: completes once a summary has
    /// been published since the previous call to this method. Reading with
    /// [SummaryFeed::current] does not mark a value as seen.
    pub async fn changed(&mut self) {
        // The senders live inside the subscriptions this feed owns, so the
        // channel cannot close while `self` exists.
        let _ = self.receiver.changed().await;
    }
}

#[derive(Default)]
struct FeedState {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

/// Subscribe to both collections of `scope` and keep a summary of `kind`
/// within `window` up to date.
///
/// The initial snapshots are delivered before this returns, so the feed's
/// first value already reflects the current store contents. Subscription
/// errors are logged and the last good summary is kept.
pub fn watch_summary<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    kind: TransactionKind,
    window: TimeWindow,
) -> SummaryFeed<S> {
    let state = Arc::new(Mutex::new(FeedState::default()));
    let (sender, receiver) = watch::channel(Vec::new());
    let sender = Arc::new(sender);

    let categories_subscription = store.subscribe(&scope.categories(), {
        let state = Arc::clone(&state);
        let sender = Arc::clone(&sender);
        Box::new(move |snapshot| match snapshot {
            Ok(documents) => {
                let categories = decode_categories(&documents);
                rederive(&state, &sender, kind, window, |feed_state| {
                    feed_state.categories = categories;
                });
            }
            Err(error) => tracing::error!("category snapshot stream failed: {error}"),
        })
    });

    let transactions_subscription = store.subscribe(&scope.transactions(), {
        let state = Arc::clone(&state);
        let sender = Arc::clone(&sender);
        Box::new(move |snapshot| match snapshot {
            Ok(documents) => {
                let transactions = decode_transactions(&documents);
                rederive(&state, &sender, kind, window, |feed_state| {
                    feed_state.transactions = transactions;
                });
            }
            Err(error) => tracing::error!("transaction snapshot stream failed: {error}"),
        })
    });

    SummaryFeed {
        receiver,
        _categories: categories_subscription,
        _transactions: transactions_subscription,
    }
}

/// Apply `update` to the shared snapshot state, then recompute and publish
/// the summary.
fn rederive(
    state: &Mutex<FeedState>,
    sender: &watch::Sender<Vec<CategorySummary>>,
    kind: TransactionKind,
    window: TimeWindow,
    update: impl FnOnce(&mut FeedState),
) {
    let Ok(mut feed_state) = state.lock() else {
        // A poisoned state means a previous listener panicked; keep the
        // last good summary.
        return;
    };

    update(&mut feed_state);
    let summary = summarize(&feed_state.categories, &feed_state.transactions, kind, window);
    drop(feed_state);

    let _ = sender.send(summary);
}

fn decode_categories(documents: &[Document]) -> Vec<Category> {
    let mut categories: Vec<Category> = documents
        .iter()
        .filter_map(|document| match Category::from_document(document) {
            Ok(category) => Some(category),
            Err(error) => {
                tracing::error!("skipping malformed category document: {error}");
                None
            }
        })
        .collect();

    categories.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
    categories
}

fn decode_transactions(documents: &[Document]) -> Vec<Transaction> {
    documents
        .iter()
        .filter_map(|document| match Transaction::from_document(document) {
            Ok(transaction) => Some(transaction),
            Err(error) => {
                tracing::error!("skipping malformed transaction document: {error}");
                None
            }
        })
        .collect()
}
