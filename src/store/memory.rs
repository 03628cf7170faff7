use std::sync::{Mutex, PoisonError};

use super::{Document, Store};
use crate::error::StoreError;

/// Keeps the document in process memory. Used by tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<Option<Document>>,
}

impl MemoryStore {
    /// Start from an existing document instead of an empty store.
    pub fn with_document(doc: Document) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Document>, StoreError> {
        Ok(self.doc.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        *self.doc.lock().unwrap_or_else(PoisonError::into_inner) = Some(doc.clone());
        Ok(())
    }
}
