//! Resource accounting
//!
//! Memory budgets are attached per thread; work that must not be charged to
//! the ambient budget (such as growing a shared system log buffer) runs under
//! a [`MemoryTrackerBlocker`].

mod error;
mod memory;

pub use error::{ResourceError, ResourceResult};
pub use memory::{AttachGuard, MemoryBudget, MemoryTracker, MemoryTrackerBlocker};
