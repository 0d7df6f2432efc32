//! Account scoping for store operations.
//!
//! Every operation takes an explicit [AccountScope] instead of consulting a
//! global "current user". The scope owns the two collection paths that hold
//! an account's data.

use crate::store::CollectionPath;

/// Identifies the authenticated account whose data an operation touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountScope {
    uid: String,
}

impl AccountScope {
    /// Create a scope for the account with the given user ID.
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    /// The user ID this scope belongs to.
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Path of the collection holding this account's categories.
    pub fn categories(&self) -> CollectionPath {
        CollectionPath::new(format!("users/{}/categories", self.uid))
    }

    /// Path of the collection holding this account's transactions.
    pub fn transactions(&self) -> CollectionPath {
        CollectionPath::new(format!("users/{}/transactions", self.uid))
    }
}
