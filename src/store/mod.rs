//! Shared document persistence.
//!
//! The whole system of record is one [`Document`]. Backends implement the
//! [`Store`] trait (load/save of the full document); [`Persistence`] wraps a
//! backend with the process-wide exclusive section and the optimistic version
//! check that every mutator goes through.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StoreError, WorkflowError};
use crate::outbox::OutboxItem;
use crate::workflow::Agreement;

/// The persisted system of record.
///
/// `properties`, `bookings`, `payments` and `documents` belong to the portal
/// and are carried through every rewrite untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Optimistic concurrency stamp, bumped on every committed write.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub agreements: BTreeMap<String, Agreement>,
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
    #[serde(default)]
    pub outbox: Vec<OutboxItem>,
    #[serde(default)]
    pub properties: Vec<serde_json::Value>,
    #[serde(default)]
    pub bookings: Vec<serde_json::Value>,
    #[serde(default)]
    pub payments: Vec<serde_json::Value>,
    #[serde(default)]
    pub documents: Vec<serde_json::Value>,
}

/// A backend able to load and fully replace the document.
pub trait Store: Send + Sync {
    /// Returns `None` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<Document>, StoreError>;

    /// Replaces the persisted document. Must be all-or-nothing.
    fn save(&self, doc: &Document) -> Result<(), StoreError>;
}

/// Exclusive, versioned access to a [`Store`].
pub struct Persistence {
    backend: Box<dyn Store>,
    lock: Mutex<()>,
}

impl Persistence {
    pub fn new(backend: impl Store + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current document, initializing it on first access.
    pub fn read(&self) -> Result<Document> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_or_init()
    }

    /// Replace the document wholesale.
    ///
    /// `doc.version` must equal the persisted version, i.e. `doc` must derive
    /// from the latest [`read`](Self::read); otherwise the write is rejected
    /// with `ConcurrencyConflict` and nothing is stored.
    pub fn write(&self, doc: Document) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.load_or_init()?;
        self.commit(current.version, doc).map(|_| ())
    }

    /// Read-modify-write inside the exclusive section.
    ///
    /// If `apply` fails the in-memory copy is dropped and the persisted
    /// document is left exactly as it was.
    pub fn update<T>(&self, apply: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load_or_init()?;
        let base = doc.version;
        let out = apply(&mut doc)?;
        doc.version = base;
        self.commit(base, doc)?;
        Ok(out)
    }

    fn load_or_init(&self) -> Result<Document> {
        if let Some(doc) = self.backend.load()? {
            return Ok(doc);
        }
        let doc = Document::default();
        self.backend.save(&doc)?;
        info!("initialized empty document");
        Ok(doc)
    }

    fn commit(&self, persisted: u64, mut doc: Document) -> Result<u64> {
        if doc.version != persisted {
            return Err(WorkflowError::ConcurrencyConflict {
                expected: doc.version,
                found: persisted,
            });
        }
        doc.version = persisted + 1;
        self.backend.save(&doc)?;
        debug!(version = doc.version, "document committed");
        Ok(doc.version)
    }
}
