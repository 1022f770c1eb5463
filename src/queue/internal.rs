//! Internal SystemLogQueue implementation with offset-based flush tracking
//!
//! This module provides the core queue functionality with:
//! - A bounded FIFO buffer shared by many producer threads
//! - Logical offsets that never rewind: `front_index` (events drained so far),
//!   `requested_flush_up_to` and `flushed_up_to`
//! - A single drain thread that swaps the whole buffer out in `pop` and
//!   publishes completion through `confirm`
//! - Synchronous flushing for callers via `notify_flush` + `wait_flush`
//!
//! All state lives behind one mutex. One condition variable (`flush_event`)
//! wakes both the drain thread and flush waiters; each re-checks its own
//! predicate after every wake.

use crate::core::sync::{lock_unpoisoned, wait_timeout_while_unpoisoned};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::reentrancy::AddGuard;
use crate::queue::settings::QueueSettings;
use crate::queue::types::{PopResult, QueueStats};
use crate::resource::{MemoryTracker, MemoryTrackerBlocker};
use std::mem;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Mutable queue state, only touched under the queue mutex
#[derive(Debug)]
struct QueueState<E> {
    buffer: Vec<E>,
    front_index: u64,
    requested_flush_up_to: u64,
    flushed_up_to: u64,
    force_prepare_tables: bool,
    is_shutdown: bool,
    /// `front_index` at the last "queue is full" error, to avoid repeating it
    logged_queue_full_at_index: Option<u64>,
    dropped: u64,
}

impl<E> QueueState<E> {
    fn new() -> Self {
        Self {
            buffer: Vec::new(),
            front_index: 0,
            requested_flush_up_to: 0,
            flushed_up_to: 0,
            force_prepare_tables: false,
            is_shutdown: false,
            logged_queue_full_at_index: None,
            dropped: 0,
        }
    }

    fn end_offset(&self) -> u64 {
        self.front_index + self.buffer.len() as u64
    }

    fn drain_wanted(&self) -> bool {
        self.requested_flush_up_to > self.flushed_up_to
            || self.is_shutdown
            || self.force_prepare_tables
    }

    fn flushed_through(&self, offset: u64) -> bool {
        self.flushed_up_to >= offset && !self.force_prepare_tables
    }
}

/// Bounded buffer of events of one kind, drained by a single thread
///
/// The queue never looks inside `E`. Producers call [`add`](Self::add),
/// [`notify_flush`](Self::notify_flush) and [`wait_flush`](Self::wait_flush)
/// from any thread; exactly one drain thread calls [`pop`](Self::pop) and
/// [`confirm`](Self::confirm).
#[derive(Debug)]
pub struct SystemLogQueue<E> {
    name: String,
    settings: QueueSettings,
    state: Mutex<QueueState<E>>,
    flush_event: Condvar,
}

impl<E> SystemLogQueue<E> {
    pub fn new(name: impl Into<String>, settings: QueueSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            state: Mutex::new(QueueState::new()),
            flush_event: Condvar::new(),
        }
    }

    /// Get the queue identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Append one event, or drop it
    ///
    /// Dropped silently when the calling thread is already inside `add`, or
    /// after shutdown. Dropped with a rate-limited error when the buffer is
    /// full. Never blocks on anything but the queue mutex.
    pub fn add(&self, event: E) {
        // Logging below can route straight back into add on this thread.
        let Some(_inside_add) = AddGuard::enter() else {
            return;
        };

        // Buffer growth can be megabytes; it must not count against whatever
        // budget the producing thread is running under.
        let _blocker = MemoryTrackerBlocker::new();

        let mut queue_is_half_full = false;
        let mut full_at_index = None;
        {
            let mut state = lock_unpoisoned(&self.state);

            if state.is_shutdown {
                return;
            }

            // Events arrive one at a time under the lock, so every length is
            // observed and strict equality fires once per crossing.
            if state.buffer.len() == self.settings.half_capacity() {
                queue_is_half_full = true;

                let queue_end = state.end_offset();
                if state.requested_flush_up_to < queue_end {
                    state.requested_flush_up_to = queue_end;
                }
                self.flush_event.notify_all();
            }

            if state.buffer.len() >= self.settings.capacity {
                state.dropped += 1;
                // Log again only once the drain side has made progress.
                if state.logged_queue_full_at_index != Some(state.front_index) {
                    state.logged_queue_full_at_index = Some(state.front_index);
                    full_at_index = Some(state.front_index);
                }
            } else {
                let allocated_before = state.buffer.capacity();
                state.buffer.push(event);
                let grown = state.buffer.capacity() - allocated_before;
                if grown > 0 {
                    // Reported under the blocker, so no budget is charged
                    let _ = MemoryTracker::alloc(grown.saturating_mul(mem::size_of::<E>()));
                }
            }
        }

        if let Some(front_index) = full_at_index {
            log::error!(
                "Queue is full for system log '{}' at {}",
                self.name,
                front_index
            );
            return;
        }

        if queue_is_half_full {
            log::info!("Queue is half full for system log '{}'.", self.name);
        }
    }

    /// Ask the drain thread to flush everything visible right now
    ///
    /// Returns the offset just past the newest buffered event, to be passed
    /// to [`wait_flush`](Self::wait_flush). `force` additionally asks the
    /// drain side to (re)initialize its destination before confirming.
    /// Returns `None` once the queue is shut down: no offset will be reached.
    pub fn notify_flush(&self, force: bool) -> Option<u64> {
        let this_thread_requested_offset = {
            let mut state = lock_unpoisoned(&self.state);
            if state.is_shutdown {
                return None;
            }

            let offset = state.end_offset();

            // Never lower a request made by another thread.
            state.force_prepare_tables |= force;
            state.requested_flush_up_to = state.requested_flush_up_to.max(offset);

            self.flush_event.notify_all();
            offset
        };

        log::debug!(
            "Requested flush up to offset {} for system log '{}'",
            this_thread_requested_offset,
            self.name
        );
        Some(this_thread_requested_offset)
    }

    /// Block until everything up to `offset` is confirmed as persisted
    ///
    /// Fails with [`QueueError::TimeoutExceeded`] after the configured flush
    /// timeout, or with [`QueueError::ShutDown`] as soon as the queue is shut
    /// down without the offset having been reached.
    ///
    /// A waiter woken by shutdown does not wait for the final drain: its
    /// events may still be persisted and confirmed afterwards, so `ShutDown`
    /// means "not confirmed yet", not "lost". A later call with the same
    /// offset returns `Ok(())` once the final drain has confirmed it.
    pub fn wait_flush(&self, offset: u64) -> QueueResult<()> {
        let state = lock_unpoisoned(&self.state);
        let (state, _timed_out) = wait_timeout_while_unpoisoned(
            &self.flush_event,
            state,
            self.settings.flush_timeout,
            |state| !state.flushed_through(offset) && !state.is_shutdown,
        );

        if state.flushed_through(offset) {
            return Ok(());
        }

        if state.is_shutdown {
            return Err(QueueError::ShutDown {
                queue: self.name.clone(),
                offset,
            });
        }

        Err(QueueError::TimeoutExceeded {
            queue: self.name.clone(),
            timeout: self.settings.flush_timeout,
        })
    }

    /// Drain the whole buffer into `output` (drain thread only)
    ///
    /// Sleeps up to the flush interval unless a flush was requested, a
    /// destination refresh was forced, or the queue was shut down. The
    /// previous contents of `output` are discarded and its allocation becomes
    /// the new buffer.
    pub fn pop(&self, output: &mut Vec<E>) -> PopResult {
        let state = lock_unpoisoned(&self.state);
        let (mut state, _timed_out) = wait_timeout_while_unpoisoned(
            &self.flush_event,
            state,
            self.settings.flush_interval,
            |state| !state.drain_wanted(),
        );

        state.front_index += state.buffer.len() as u64;
        output.clear();
        mem::swap(&mut state.buffer, output);

        PopResult {
            to_flush_end: state.front_index,
            should_prepare_tables_anyway: state.force_prepare_tables,
            exit_this_thread: state.is_shutdown,
        }
    }

    /// Publish that everything before `to_flush_end` is persisted (drain thread only)
    ///
    /// Must only be called after the drained batch was durably written.
    pub fn confirm(&self, to_flush_end: u64) {
        let mut state = lock_unpoisoned(&self.state);
        state.flushed_up_to = state.flushed_up_to.max(to_flush_end);
        state.force_prepare_tables = false;
        self.flush_event.notify_all();
    }

    /// Stop accepting events and release the drain thread and all waiters
    pub fn shutdown(&self) {
        lock_unpoisoned(&self.state).is_shutdown = true;
        self.flush_event.notify_all();
    }

    /// Sleep for up to `timeout`, returning early once the queue is shut down
    ///
    /// Returns whether the queue is shut down. Used by the drain thread to back
    /// off between retries without delaying shutdown.
    pub fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        let state = lock_unpoisoned(&self.state);
        let (state, _timed_out) =
            wait_timeout_while_unpoisoned(&self.flush_event, state, timeout, |state| {
                !state.is_shutdown
            });
        state.is_shutdown
    }

    pub fn is_shutdown(&self) -> bool {
        lock_unpoisoned(&self.state).is_shutdown
    }

    /// Number of events currently buffered
    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.state).buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take a consistent snapshot of the queue counters
    pub fn stats(&self) -> QueueStats {
        let state = lock_unpoisoned(&self.state);
        QueueStats {
            name: self.name.clone(),
            capacity: self.settings.capacity,
            buffered: state.buffer.len(),
            front_index: state.front_index,
            requested_flush_up_to: state.requested_flush_up_to,
            flushed_up_to: state.flushed_up_to,
            dropped: state.dropped,
            is_shutdown: state.is_shutdown,
        }
    }
}
