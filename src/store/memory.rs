use std::sync::{Arc, RwLock};

use super::Store;
use crate::error::{DbError, Result};
use crate::Document;

/// An in-memory [`Store`]. All clones share the same document.
///
/// A store made with [`MemoryStore::corrupt`] fails every read the same way a missing or
/// unparseable file would, until a document is written to it.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    doc: Arc<RwLock<Option<Document>>>,
}

impl MemoryStore {
    /// creates a store holding an empty document
    pub fn new() -> Self {
        MemoryStore::with_document(Document::default())
    }

    /// creates a store holding `doc`
    pub fn with_document(doc: Document) -> Self {
        MemoryStore {
            doc: Arc::new(RwLock::new(Some(doc))),
        }
    }

    /// creates a store whose reads fail until something is written to it
    pub fn corrupt() -> Self {
        MemoryStore {
            doc: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl Store for MemoryStore {
    fn read_all(&self) -> Result<Document> {
        let doc = self.doc.read().map_err(|_| DbError::LockPoisoned("read"))?;
        doc.clone()
            .ok_or_else(|| DbError::corrupt("<memory>", "no document has been written"))
    }

    fn write_all(&self, doc: &Document) -> Result<()> {
        let mut current = self.doc.write().map_err(|_| DbError::LockPoisoned("write"))?;
        *current = Some(doc.clone());
        Ok(())
    }
}
