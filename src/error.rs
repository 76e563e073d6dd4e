use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// type alias for all operations on a [`Store`] or [`Interpreter`] that could fail with a [`DbError`]
///
/// [`Store`]: ./trait.Store.html
/// [`Interpreter`]: ./struct.Interpreter.html
pub type Result<T> = std::result::Result<T, DbError>;

/// The Error variants used throughout studentdb.
/// Lower level errors from third party crates are wrapped into one of these variants.
#[derive(Error, Debug)]
pub enum DbError {
    /// the backing document is missing or could not be parsed
    #[error("corrupt state in {path:?}: {reason}")]
    CorruptState {
        /// path of the backing file
        path: PathBuf,
        /// what went wrong while reading it
        reason: String,
    },

    /// the payload embedded in a command could not be understood
    #[error("malformed command payload: {0}")]
    MalformedCommandPayload(String),

    /// variant for errors caused from file IO
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serde Error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// the lock guarding the store was poisoned by a panicking thread
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// a command line parameter could not be parsed
    #[error("parsing error: {0}")]
    Parsing(String),

    /// the HTTP client could not talk to the server
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// an error message returned from the server
    #[error("{0}")]
    StringErr(String),
}

impl DbError {
    /// builds a [`DbError::CorruptState`] for the file at `path`
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DbError::CorruptState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
