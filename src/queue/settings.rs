//! Queue sizing and timing settings

use std::time::Duration;

/// Default maximum number of buffered events per queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1_048_576;

/// Default cadence of the drain thread when nobody asks for a flush
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(7_500);

/// Upper bound for a synchronous flush wait. 60s proved too short when the
/// destination disk is saturated by parallel load.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    /// Events beyond this many are dropped until the drain side catches up
    pub capacity: usize,
    /// Longest time the drain thread sleeps in `pop` without a request
    pub flush_interval: Duration,
    /// How long `wait_flush` blocks before failing
    pub flush_timeout: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl QueueSettings {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// Buffer length at which a flush is requested pre-emptively
    pub fn half_capacity(&self) -> usize {
        self.capacity / 2
    }
}
