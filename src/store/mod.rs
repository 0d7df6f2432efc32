//! The narrow document-store interface the application is written against.
//!
//! The backing service owns durability, authentication, and change
//! notification; this module only defines the shape the rest of the crate
//! consumes: point-in-time queries, document creation, atomic multi-document
//! batches, and push-based snapshot subscriptions.

use std::fmt::{self, Display};

use serde_json::{Map, Value};

use crate::Error;

pub mod memory;

/// The field map of a single document, keyed by field name.
pub type Fields = Map<String, Value>;

/// Path to a collection of documents, e.g. `users/alice/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Wrap a collection path string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path to the document with `id` inside this collection.
    pub fn doc(&self, id: &DocumentId) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.clone(),
        }
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, backend-assigned identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a document ID string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified path to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    /// The collection the document lives in.
    pub collection: CollectionPath,
    /// The document's ID within that collection.
    pub id: DocumentId,
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A document as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The document's ID within its collection.
    pub id: DocumentId,
    /// The document's stored fields.
    pub fields: Fields,
}

/// Server-side filter applied to [DocumentStore::query].
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Documents whose field equals the value. A missing field compares
    /// equal to `null`.
    FieldEq {
        /// Name of the field to compare.
        field: String,
        /// Value the field must equal.
        value: Value,
    },
    /// Documents whose numeric field lies in the inclusive range
    /// `[start, end]`. Documents without the field never match.
    FieldBetween {
        /// Name of the field to compare.
        field: String,
        /// Inclusive lower bound.
        start: Value,
        /// Inclusive upper bound.
        end: Value,
    },
}

impl Filter {
    /// Filter on field equality.
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Filter on an inclusive numeric field range.
    pub fn field_between(
        field: impl Into<String>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Self::FieldBetween {
            field: field.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether a document with the given fields passes this filter.
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::All => true,
            Filter::FieldEq { field, value } => {
                fields.get(field).unwrap_or(&Value::Null) == value
            }
            Filter::FieldBetween { field, start, end } => {
                let (Some(value), Some(start), Some(end)) = (
                    fields.get(field).and_then(Value::as_f64),
                    start.as_f64(),
                    end.as_f64(),
                ) else {
                    return false;
                };

                start <= value && value <= end
            }
        }
    }
}

/// One staged write in a [WriteBatch].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Merge `fields` into an existing document, overwriting the named
    /// fields and leaving the rest untouched.
    Update {
        /// The document to update.
        path: DocumentPath,
        /// The fields to overwrite.
        fields: Fields,
    },
    /// Remove an existing document.
    Delete {
        /// The document to remove.
        path: DocumentPath,
    },
}

/// An ordered list of writes committed as a single atomic unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a field-merge update of the document at `path`.
    pub fn update(&mut self, path: DocumentPath, fields: Fields) {
        self.ops.push(WriteOp::Update { path, fields });
    }

    /// Stage deletion of the document at `path`.
    pub fn delete(&mut self, path: DocumentPath) {
        self.ops.push(WriteOp::Delete { path });
    }

    /// The staged writes, in the order they were added.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// The number of staged writes.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch has no staged writes.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Payload delivered to subscription listeners: the full collection
/// contents, or the error that interrupted the snapshot stream.
pub type Snapshot = Result<Vec<Document>, Error>;

/// Callback invoked with the initial snapshot when a subscription is
/// registered, and with a fresh snapshot after every commit that touches the
/// subscribed collection.
pub type SnapshotListener = Box<dyn Fn(Snapshot) + Send + Sync>;

/// Read/write access to a document backend.
///
/// Implementations must commit [WriteBatch]es atomically: either every
/// staged write is applied, or the commit fails and none are. Subscriptions
/// are read-only observers and must never mutate the store.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Handle that keeps a subscription registered. Dropping it detaches the
    /// listener; no notifications are delivered afterwards.
    type Subscription;

    /// Point-in-time read of the documents in `collection` that pass
    /// `filter`.
    async fn query(
        &self,
        collection: &CollectionPath,
        filter: &Filter,
    ) -> Result<Vec<Document>, Error>;

    /// Insert a new document with a backend-generated ID.
    async fn create(&self, collection: &CollectionPath, fields: Fields) -> Result<DocumentId, Error>;

    /// Commit all staged writes in `batch` as one atomic unit.
    ///
    /// Fails with [Error::NotFound] without applying anything when any
    /// staged write targets a document that does not exist, including one
    /// deleted earlier in the same batch.
    async fn batch_write(&self, batch: WriteBatch) -> Result<(), Error>;

    /// Register a live listener on `collection`.
    ///
    /// The listener receives the current snapshot before this call returns,
    /// then a fresh snapshot after every commit touching the collection.
    fn subscribe(&self, collection: &CollectionPath, listener: SnapshotListener)
    -> Self::Subscription;
}

#[cfg(test)]
mod filter_tests {
    use serde_json::json;

    use super::{Fields, Filter};

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().expect("test fields must be an object").clone()
    }

    #[test]
    fn field_eq_matches_equal_value() {
        let filter = Filter::field_eq("category", "Food");

        assert!(filter.matches(&fields(json!({"category": "Food"}))));
        assert!(!filter.matches(&fields(json!({"category": "Rent"}))));
    }

    #[test]
    fn field_eq_treats_missing_field_as_null() {
        let filter = Filter::field_eq("category", serde_json::Value::Null);

        assert!(filter.matches(&fields(json!({"amount": 5.0}))));
        assert!(filter.matches(&fields(json!({"category": null}))));
        assert!(!filter.matches(&fields(json!({"category": "Food"}))));
    }

    #[test]
    fn field_between_is_inclusive() {
        let filter = Filter::field_between("createdAt", 10, 20);

        assert!(filter.matches(&fields(json!({"createdAt": 10}))));
        assert!(filter.matches(&fields(json!({"createdAt": 20}))));
        assert!(!filter.matches(&fields(json!({"createdAt": 21}))));
    }

    #[test]
    fn field_between_never_matches_missing_field() {
        let filter = Filter::field_between("createdAt", 0, i64::MAX);

        assert!(!filter.matches(&fields(json!({"amount": 5.0}))));
    }
}
