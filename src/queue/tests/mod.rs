//! Test modules for the queue system
//!
//! Tests are organized by functional area: buffering order, overflow
//! handling, the flush offset protocol, shutdown, and concurrent access.

mod flush_protocol;

use crate::queue::api::{QueueSettings, SystemLogQueue};
use std::time::Duration;

/// Queue with short timings so tests never wait on production defaults
pub(super) fn test_queue<E>(name: &str, capacity: usize) -> SystemLogQueue<E> {
    SystemLogQueue::new(
        name,
        QueueSettings::default()
            .with_capacity(capacity)
            .with_flush_interval(Duration::from_millis(20))
            .with_flush_timeout(Duration::from_millis(500)),
    )
}
