//! Queue Error Types

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Timeout exceeded ({timeout:?}) while flushing system log '{queue}'")]
    TimeoutExceeded { queue: String, timeout: Duration },

    #[error("System log '{queue}' was shut down before offset {offset} was flushed")]
    ShutDown { queue: String, offset: u64 },
}

impl QueueError {
    /// Name of the queue the error was raised for
    pub fn queue(&self) -> &str {
        match self {
            QueueError::TimeoutExceeded { queue, .. } | QueueError::ShutDown { queue, .. } => queue,
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
