use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use super::Store;
use crate::error::{DbError, Result};
use crate::Document;

/// A [`Store`] that keeps the whole [`Document`] in a single, pretty-printed JSON file.
///
/// Every read parses the entire file and every write replaces the entire file. Writes go to a
/// temporary file in the same directory which is then renamed over the backing file, so a
/// concurrent reader sees either the old document or the new one, never a truncated one.
///
/// Cloning a `JsonFileStore` is cheap, all clones point at the same file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Arc<PathBuf>,
}

impl JsonFileStore {
    /// creates a [`JsonFileStore`] backed by the file at `path`. The file is not touched until
    /// the first read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: Arc::new(path.into()),
        }
    }

    /// creates a [`JsonFileStore`] backed by the file at `path`, writing an empty document
    /// to it if the file does not exist yet.
    #[instrument]
    pub fn create_if_missing(path: &Path) -> Result<Self> {
        let store = JsonFileStore::new(path);
        if !path.exists() {
            info!("no document found at {:?}, creating an empty one", path);
            store.write_all(&Document::default())?;
        }
        Ok(store)
    }

    /// the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // the directory the temporary file is created in, it must be on the same file system as
    // the backing file for the rename to be atomic
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Store for JsonFileStore {
    fn read_all(&self) -> Result<Document> {
        let text = fs::read_to_string(self.path()).map_err(|e| DbError::corrupt(self.path(), e))?;
        let doc: Document =
            serde_json::from_str(&text).map_err(|e| DbError::corrupt(self.path(), e))?;
        debug!(path = ?self.path(), students = doc.students.len(), "read document");
        Ok(doc)
    }

    fn write_all(&self, doc: &Document) -> Result<()> {
        let text = serde_json::to_string_pretty(doc)?;
        let mut tmp = NamedTempFile::new_in(self.dir())?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        // the temp file is created 0600, keep whatever mode the backing file already has
        if let Ok(meta) = fs::metadata(self.path()) {
            tmp.as_file().set_permissions(meta.permissions())?;
        }
        tmp.persist(self.path()).map_err(|e| DbError::Io(e.error))?;
        debug!(path = ?self.path(), students = doc.students.len(), "wrote document");
        Ok(())
    }
}
