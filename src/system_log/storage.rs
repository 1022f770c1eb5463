//! Destination interface for drained batches

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable destination for one kind of event
///
/// Called only from the saving thread of the owning `SystemLog`. A returned
/// error means nothing from the batch may be assumed written: the batch is
/// kept and retried, and its offset is not confirmed.
pub trait LogStorage<E>: Send {
    /// Make sure the destination exists. With `force`, (re)initialize it
    /// even if it already does.
    fn prepare(&mut self, force: bool) -> StorageResult<()>;

    /// Durably write `batch`, in order
    fn write_batch(&mut self, batch: &[E]) -> StorageResult<()>;
}
