//! Type definitions for the queue system
//!
//! Results handed to the drain thread and point-in-time statistics.

/// Outcome of a single `pop` by the drain thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopResult {
    /// Logical offset just past the last drained event; pass it to `confirm`
    /// once the batch is persisted
    pub to_flush_end: u64,
    /// A caller asked for the destination to be (re)initialized
    pub should_prepare_tables_anyway: bool,
    /// The queue is shut down; this is the final drain
    pub exit_this_thread: bool,
}

/// Snapshot of a queue's counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Queue identifier
    pub name: String,
    /// Maximum number of buffered events
    pub capacity: usize,
    /// Events currently waiting to be drained
    pub buffered: usize,
    /// Total number of events ever drained
    pub front_index: u64,
    /// Highest offset anyone asked to have flushed
    pub requested_flush_up_to: u64,
    /// Highest offset confirmed as persisted
    pub flushed_up_to: u64,
    /// Events refused because the buffer was full
    pub dropped: u64,
    pub is_shutdown: bool,
}

impl QueueStats {
    /// Offset just past the newest buffered event
    pub fn end_offset(&self) -> u64 {
        self.front_index + self.buffered as u64
    }

    /// Events admitted but not yet confirmed as persisted
    pub fn unflushed(&self) -> u64 {
        self.end_offset().saturating_sub(self.flushed_up_to)
    }
}
