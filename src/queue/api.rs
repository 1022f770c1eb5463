//! Public API for the queue system
//!
//! External modules should import from here rather than directly from internal modules.
//! See module documentation for complete usage examples and architecture details.

// Core queue component
pub use crate::queue::internal::SystemLogQueue;

// Configuration
pub use crate::queue::settings::QueueSettings;

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};

// Drain results and statistics
pub use crate::queue::types::{PopResult, QueueStats};
