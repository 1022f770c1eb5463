//! Resource accounting error types

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error(
        "Memory limit exceeded for '{budget}': would use {requested} more bytes on top of {used} (limit: {limit})"
    )]
    MemoryLimitExceeded {
        budget: String,
        requested: usize,
        used: usize,
        limit: usize,
    },
}

/// Result type for resource accounting operations
pub type ResourceResult<T> = Result<T, ResourceError>;
