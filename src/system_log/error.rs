//! System log error types

use crate::queue::QueueError;

#[derive(Debug, thiserror::Error)]
pub enum SystemLogError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Failed to start saving thread for system log '{name}': {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("System log '{name}' is already registered")]
    DuplicateName { name: String },
}

/// Result type for system log operations
pub type SystemLogResult<T> = Result<T, SystemLogError>;

impl crate::core::error_handling::ContextualError for SystemLogError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, SystemLogError::DuplicateName { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SystemLogError::DuplicateName { .. } => Some("Each system log needs a unique name"),
            _ => None,
        }
    }
}
