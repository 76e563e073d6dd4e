//! This module provides the storage implementations for the student [`Document`].
//! A store only knows how to read the whole document and how to write the whole document back;
//! every query and mutation is done in memory by the [`Interpreter`].
//!
//! Two stores are implemented: [`JsonFileStore`], which keeps the document in a pretty-printed
//! JSON file, and [`MemoryStore`], which keeps it in memory and is mostly useful for tests.
//!
//! [`Document`]: ../struct.Document.html
//! [`Interpreter`]: ../struct.Interpreter.html
use crate::{Document, Result};

/// A trait for the basic functionality of a whole-document storage engine
pub trait Store: Clone + Send + Sync + 'static {
    /// Reads the entire document
    ///
    /// # Errors
    ///
    /// Returns `DbError::CorruptState` if the backing data is missing or cannot be parsed.
    fn read_all(&self) -> Result<Document>;

    /// Replaces the entire document with `doc`
    fn write_all(&self, doc: &Document) -> Result<()>;
}

mod json_file;
mod memory;

pub use self::json_file::JsonFileStore;
pub use self::memory::MemoryStore;
