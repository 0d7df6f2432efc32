//! An in-memory [DocumentStore] with the same contract as the real backend:
//! batches commit atomically and subscribers are pushed a fresh snapshot
//! after every commit. Used in tests and for local, non-durable runs.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::Error;

use super::{
    CollectionPath, Document, DocumentId, DocumentStore, Fields, Filter, Snapshot,
    SnapshotListener, WriteBatch, WriteOp,
};

type Collections = HashMap<String, BTreeMap<String, Fields>>;

struct ListenerEntry {
    id: u64,
    collection: String,
    listener: Arc<dyn Fn(Snapshot) + Send + Sync>,
}

/// In-memory document store.
///
/// Documents are held per collection in insertion order. All operations go
/// through a single lock, which matches the single-writer behaviour the rest
/// of the crate assumes from the backend.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    listeners: Arc<Mutex<Vec<ListenerEntry>>>,
    next_document_id: AtomicU64,
    next_listener_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_of(collections: &Collections, collection: &CollectionPath) -> Vec<Document> {
        collections
            .get(collection.as_str())
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document {
                        id: DocumentId::new(id.clone()),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push `snapshot` to every listener registered on `collection`.
    ///
    /// Listener callbacks run outside the data lock so they are free to
    /// query the store again.
    fn notify(&self, collection: &str, snapshot: Vec<Document>) -> Result<(), Error> {
        let listeners: Vec<_> = {
            let table = self.listeners.lock().map_err(|_| Error::StoreLockError)?;
            table
                .iter()
                .filter(|entry| entry.collection == collection)
                .map(|entry| Arc::clone(&entry.listener))
                .collect()
        };

        for listener in listeners {
            listener(Ok(snapshot.clone()));
        }

        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    type Subscription = MemorySubscription;

    async fn query(
        &self,
        collection: &CollectionPath,
        filter: &Filter,
    ) -> Result<Vec<Document>, Error> {
        let collections = self.collections.lock().map_err(|_| Error::StoreLockError)?;

        let documents = Self::snapshot_of(&collections, collection)
            .into_iter()
            .filter(|document| filter.matches(&document.fields))
            .collect();

        Ok(documents)
    }

    async fn create(&self, collection: &CollectionPath, fields: Fields) -> Result<DocumentId, Error> {
        let id = format!("{:06}", self.next_document_id.fetch_add(1, Ordering::Relaxed));

        let snapshot = {
            let mut collections = self.collections.lock().map_err(|_| Error::StoreLockError)?;
            collections
                .entry(collection.as_str().to_string())
                .or_default()
                .insert(id.clone(), fields);

            Self::snapshot_of(&collections, collection)
        };

        self.notify(collection.as_str(), snapshot)?;

        Ok(DocumentId::new(id))
    }

    async fn batch_write(&self, batch: WriteBatch) -> Result<(), Error> {
        let snapshots = {
            let mut collections = self.collections.lock().map_err(|_| Error::StoreLockError)?;

            // Apply the batch to a working copy first, so a write targeting
            // a missing document, including one deleted earlier in the same
            // batch, fails the whole commit and leaves the store untouched.
            let mut working = collections.clone();
            let mut touched: Vec<String> = Vec::new();

            for op in batch.ops() {
                let path = match op {
                    WriteOp::Update { path, fields } => {
                        let document = working
                            .get_mut(path.collection.as_str())
                            .and_then(|documents| documents.get_mut(path.id.as_str()))
                            .ok_or(Error::NotFound)?;

                        for (name, value) in fields {
                            document.insert(name.clone(), value.clone());
                        }
                        path
                    }
                    WriteOp::Delete { path } => {
                        working
                            .get_mut(path.collection.as_str())
                            .and_then(|documents| documents.remove(path.id.as_str()))
                            .ok_or(Error::NotFound)?;
                        path
                    }
                };

                if !touched.iter().any(|collection| collection == path.collection.as_str()) {
                    touched.push(path.collection.as_str().to_string());
                }
            }

            *collections = working;

            touched
                .into_iter()
                .map(|collection| {
                    let snapshot =
                        Self::snapshot_of(&collections, &CollectionPath::new(collection.clone()));
                    (collection, snapshot)
                })
                .collect::<Vec<_>>()
        };

        for (collection, snapshot) in snapshots {
            self.notify(&collection, snapshot)?;
        }

        Ok(())
    }

    fn subscribe(
        &self,
        collection: &CollectionPath,
        listener: SnapshotListener,
    ) -> MemorySubscription {
        let listener: Arc<dyn Fn(Snapshot) + Send + Sync> = Arc::from(listener);
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut table) = self.listeners.lock() {
            table.push(ListenerEntry {
                id,
                collection: collection.as_str().to_string(),
                listener: Arc::clone(&listener),
            });
        }

        let initial = match self.collections.lock() {
            Ok(collections) => Ok(Self::snapshot_of(&collections, collection)),
            Err(_) => Err(Error::StoreLockError),
        };
        listener(initial);

        MemorySubscription {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }
}

/// Keeps a [MemoryStore] listener registered.
///
/// Dropping the subscription detaches the listener; no further snapshots are
/// delivered.
pub struct MemorySubscription {
    listeners: Weak<Mutex<Vec<ListenerEntry>>>,
    id: u64,
}

impl MemorySubscription {
    /// Detach the listener. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade()
            && let Ok(mut table) = listeners.lock()
        {
            table.retain(|entry| entry.id != self.id);
        }
    }
}
