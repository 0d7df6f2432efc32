//! Create, read, edit, and delete operations for transactions.
//!
//! The category link on a transaction is deliberately not editable here; it
//! is rewritten only by the category cascades.

use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Error,
    category::CategoryName,
    scope::AccountScope,
    store::{DocumentStore, Fields, Filter, WriteBatch},
};

use super::domain::{Amount, Transaction, TransactionId, TransactionKind};

/// The data needed to record a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Name of the category to link, or `None` for uncategorized.
    pub category: Option<CategoryName>,
    /// How much money changed hands.
    pub amount: Amount,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl NewTransaction {
    /// An uncategorized transaction recorded now.
    ///
    /// The recording time is truncated to whole seconds, matching the
    /// stored encoding.
    pub fn new(amount: Amount, kind: TransactionKind) -> Self {
        Self {
            category: None,
            amount,
            kind,
            created_at: OffsetDateTime::now_utc()
                .replace_nanosecond(0)
                .expect("zero nanoseconds is valid"),
        }
    }

    /// Link the transaction to the named category.
    pub fn with_category(mut self, category: CategoryName) -> Self {
        self.category = Some(category);
        self
    }
}

/// Record a transaction and return it with its store-assigned ID.
///
/// # Errors
///
/// Returns [Error::UnknownCategory] when a category name is given that does
/// not match any existing category, before anything is written.
pub async fn create_transaction<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    new_transaction: NewTransaction,
) -> Result<Transaction, Error> {
    if let Some(name) = &new_transaction.category {
        let matching = store
            .query(&scope.categories(), &Filter::field_eq("name", name.as_ref()))
            .await?;

        if matching.is_empty() {
            return Err(Error::UnknownCategory(name.to_string()));
        }
    }

    let fields = Transaction::fields(
        new_transaction.category.as_ref(),
        new_transaction.amount,
        new_transaction.kind,
        new_transaction.created_at,
    )?;

    let id = store.create(&scope.transactions(), fields).await?;
    tracing::debug!(%id, amount = %new_transaction.amount, "created transaction");

    Ok(Transaction {
        id,
        category: new_transaction.category,
        amount: new_transaction.amount,
        kind: new_transaction.kind,
        created_at: new_transaction.created_at,
    })
}

/// Retrieve all transactions, newest first.
pub async fn get_all_transactions<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = store
        .query(&scope.transactions(), &Filter::All)
        .await?
        .iter()
        .map(Transaction::from_document)
        .collect::<Result<Vec<_>, _>>()?;

    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(transactions)
}

/// Retrieve the transactions recorded between `start` and `end` inclusive,
/// newest first.
pub async fn get_transactions_between<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<Transaction>, Error> {
    let filter = Filter::field_between(
        "createdAt",
        start.unix_timestamp(),
        end.unix_timestamp(),
    );

    let mut transactions = store
        .query(&scope.transactions(), &filter)
        .await?
        .iter()
        .map(Transaction::from_document)
        .collect::<Result<Vec<_>, _>>()?;

    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(transactions)
}

/// The directly editable fields of a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionUpdate {
    /// The new amount.
    pub amount: Amount,
    /// The new kind.
    pub kind: TransactionKind,
    /// The new recording time.
    pub created_at: OffsetDateTime,
}

/// Overwrite a transaction's editable fields.
///
/// # Errors
///
/// Returns [Error::UpdateMissingTransaction] if no transaction has the
/// given ID.
pub async fn update_transaction<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    transaction_id: &TransactionId,
    update: TransactionUpdate,
) -> Result<(), Error> {
    let mut fields = Fields::new();
    fields.insert("amount".to_string(), Value::from(update.amount.as_f64()));
    fields.insert("type".to_string(), serde_json::to_value(update.kind)?);
    fields.insert(
        "createdAt".to_string(),
        Value::from(update.created_at.unix_timestamp()),
    );

    let mut batch = WriteBatch::new();
    batch.update(scope.transactions().doc(transaction_id), fields);

    store.batch_write(batch).await.map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        other => other,
    })
}

/// Delete a transaction by ID.
///
/// # Errors
///
/// Returns [Error::DeleteMissingTransaction] if no transaction has the
/// given ID.
pub async fn delete_transaction<S: DocumentStore>(
    store: &S,
    scope: &AccountScope,
    transaction_id: &TransactionId,
) -> Result<(), Error> {
    let mut batch = WriteBatch::new();
    batch.delete(scope.transactions().doc(transaction_id));

    store.batch_write(batch).await.map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        other => other,
    })
}
