use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the collection store.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The store file could not be read or written.
    #[error("collection store I/O failed at {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Stored JSON did not parse.
    #[error("collection data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CollectionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
