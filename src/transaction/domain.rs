//! Core transaction domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Error,
    category::CategoryName,
    store::{Document, DocumentId, Fields},
};

/// A validated, strictly positive transaction amount.
///
/// Direction (money in or out) is carried by [TransactionKind], not the
/// sign of the amount.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount(f64);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is not finite or not
    /// strictly positive.
    pub fn new(value: f64) -> Result<Self, Error> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidAmount(value))
        }
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that the value is finite and positive.
    pub fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    /// The amount as a float.
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a transaction adds money to the account or draws from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// Store identifier for a transaction.
pub type TransactionId = DocumentId;

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The store-assigned ID of the transaction document.
    pub id: TransactionId,
    /// The linked category's name at the time of linkage, or `None` for an
    /// uncategorized transaction. Rewritten only by the category cascades.
    pub category: Option<CategoryName>,
    /// How much money changed hands.
    pub amount: Amount,
    /// Whether this is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// Stored field layout of a transaction document.
#[derive(Serialize, Deserialize)]
struct TransactionRecord {
    #[serde(default)]
    category: Option<CategoryName>,
    amount: Amount,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(rename = "createdAt", with = "time::serde::timestamp")]
    created_at: OffsetDateTime,
}

impl Transaction {
    /// Decode a transaction from its stored document.
    ///
    /// # Errors
    ///
    /// Returns [Error::MalformedDocument] when required fields are missing
    /// or hold the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, Error> {
        let record: TransactionRecord =
            serde_json::from_value(Value::Object(document.fields.clone())).map_err(|error| {
                Error::MalformedDocument(document.id.to_string(), error.to_string())
            })?;

        Ok(Self {
            id: document.id.clone(),
            category: record.category,
            amount: record.amount,
            kind: record.kind,
            created_at: record.created_at,
        })
    }

    /// Encode the stored fields for a transaction document. The category
    /// field is always written, as `null` for uncategorized transactions.
    pub(crate) fn fields(
        category: Option<&CategoryName>,
        amount: Amount,
        kind: TransactionKind,
        created_at: OffsetDateTime,
    ) -> Result<Fields, Error> {
        let record = TransactionRecord {
            category: category.cloned(),
            amount,
            kind,
            created_at,
        };

        match serde_json::to_value(record)? {
            Value::Object(fields) => Ok(fields),
            other => Err(Error::JsonSerializationError(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}


#[cfg(test)]
mod document_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        category::CategoryName,
        store::{Document, DocumentId},
    };

    use super::{Amount, Transaction, TransactionKind};

    #[test]
    fn transaction_round_trips_through_document_fields() {
        let category = CategoryName::new_unchecked("Food");
        let created_at = datetime!(2024-01-15 12:00 UTC);

        let fields = Transaction::fields(
            Some(&category),
            Amount::new_unchecked(20.0),
            TransactionKind::Expense,
            created_at,
        )
        .unwrap();
        let document = Document {
            id: DocumentId::new("t1"),
            fields,
        };
        let transaction = Transaction::from_document(&document).unwrap();

        assert_eq!(transaction.category, Some(category));
        assert_eq!(transaction.amount.as_f64(), 20.0);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.created_at, created_at);
    }

    #[test]
    fn kind_serializes_as_lowercase_type_field() {
        let fields = Transaction::fields(
            None,
            Amount::new_unchecked(5.0),
            TransactionKind::Income,
            datetime!(2024-01-15 12:00 UTC),
        )
        .unwrap();

        assert_eq!(fields["type"], json!("income"));
        // Uncategorized transactions carry an explicit null.
        assert_eq!(fields["category"], json!(null));
    }

    #[test]
    fn null_category_decodes_as_none() {
        let document = Document {
            id: DocumentId::new("t1"),
            fields: json!({
                "category": null,
                "amount": 5.0,
                "type": "expense",
                "createdAt": 1_700_000_000,
            })
            .as_object()
            .unwrap()
            .clone(),
        };

        let transaction = Transaction::from_document(&document).unwrap();

        assert_eq!(transaction.category, None);
    }
}
