//! Centavo is the synchronization core of a personal finance tracker.
//!
//! Users record income and expense transactions tagged with user-defined
//! categories. Transactions link to categories by denormalized name, so
//! renaming or deleting a category has to propagate to every transaction
//! that references it. This crate owns that consistency logic, along with
//! the per-category summaries shown on a dashboard.
//!
//! Persistence and live updates are delegated to a document-store backend
//! consumed through the narrow [`DocumentStore`] interface. The crate ships
//! an in-memory implementation, [`MemoryStore`], that honours the backend's
//! contract (atomic batches, push snapshots) for tests and local use.

#![warn(missing_docs)]

pub mod category;
pub mod scope;
pub mod store;
pub mod summary;
pub mod transaction;

pub use scope::AccountScope;
pub use store::{DocumentStore, memory::MemoryStore};

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A non-positive or non-finite amount was used to create a transaction.
    ///
    /// Transaction amounts record how much money changed hands; whether the
    /// money came in or went out is carried by the transaction kind, so the
    /// amount itself must be strictly positive.
    #[error("{0} is not a valid amount, amounts must be positive")]
    InvalidAmount(f64),

    /// The category name used to create a transaction did not match any
    /// existing category.
    #[error("no category is named \"{0}\"")]
    UnknownCategory(String),

    /// The requested resource could not be found.
    ///
    /// Callers should check that the ID is correct and that the resource has
    /// not been deleted elsewhere. Batch writes fail with this error, and
    /// apply nothing, when any staged write targets a missing document.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the store")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the store")]
    DeleteMissingTransaction,

    /// A query or batch commit failed due to connectivity or permissions.
    ///
    /// Batch commits are atomic, so nothing was partially applied; the
    /// caller must retry the entire operation. Never produced by
    /// [MemoryStore], which has no network to fail; this variant is the
    /// slot adapters over real backends map their transport errors into.
    #[error("the backend is unavailable: {0}")]
    BackendUnavailable(String),

    /// Could not acquire the store lock.
    #[error("could not acquire the store lock")]
    StoreLockError,

    /// A stored document is missing fields or holds fields of the wrong
    /// type. The first value is the document ID, the second the underlying
    /// decode error.
    #[error("document \"{0}\" is malformed: {1}")]
    MalformedDocument(String, String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JsonSerializationError(value.to_string())
    }
}
