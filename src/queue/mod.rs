//! System Log Queue Component
//!
//! A bounded, offset-tracked buffer shared by many producer threads and
//! drained by one dedicated thread per event kind. One generic
//! implementation serves every kind of telemetry event (queries, traces,
//! text messages, ...); the queue never inspects the payload.
//!
//! # Overview
//!
//! - **Fire-and-forget producers**: `add` never blocks on I/O and drops
//!   events instead of growing past the configured capacity
//! - **Pre-emptive flush**: reaching half capacity wakes the drain thread
//! - **Logical offsets**: `front_index`, `requested_flush_up_to` and
//!   `flushed_up_to` only ever grow, so "has my event been persisted yet"
//!   is a single comparison
//! - **Synchronous flush**: `notify_flush` hands out an offset ticket,
//!   `wait_flush` blocks until it is confirmed (bounded by a timeout)
//! - **Re-entrancy safety**: an `add` triggered by logging from inside
//!   another `add` on the same thread is dropped
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐  ┌────────────┐
//! │ Producer A │  │ Producer B │  │ Producer C │
//! └─────┬──────┘  └─────┬──────┘  └─────┬──────┘
//!       │ add           │ notify_flush  │ wait_flush
//!       ▼               ▼               ▼
//! ┌─────────────────────────────────────────────────────┐
//! │            SystemLogQueue<E> (one mutex)            │
//! │  front_index ─┐                                     │
//! │               ▼                                     │
//! │             ┌───┬───┬───┬───┬───┬───┐               │
//! │             │ e │ e │ e │ e │ e │   │ ≤ capacity    │
//! │             └───┴───┴───┴───┴───┴───┘               │
//! │  requested_flush_up_to    flushed_up_to             │
//! └────────────────────────┬────────────────────────────┘
//!                          │ pop (swap) / confirm
//!                          ▼
//!                 ┌─────────────────┐
//!                 │  Drain thread   │──▶ LogStorage
//!                 └─────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use systemlog::queue::{QueueSettings, SystemLogQueue};
//!
//! let queue = SystemLogQueue::<String>::new("text_log", QueueSettings::default());
//! queue.add("something happened".to_string());
//!
//! // Ask for a flush and wait until the drain thread confirms it
//! if let Some(offset) = queue.notify_flush(false) {
//!     queue.wait_flush(offset)?;
//! }
//! # Ok::<(), systemlog::queue::QueueError>(())
//! ```

pub mod api;
mod error;
mod internal;
mod reentrancy;
mod settings;
mod types;

pub use error::{QueueError, QueueResult};
pub use internal::SystemLogQueue;
pub use settings::{
    QueueSettings, DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};
pub use types::{PopResult, QueueStats};

#[cfg(test)]
mod tests;
