//! SystemLog - a queue plus the saving thread that drains it
//!
//! The saving thread repeatedly pops the whole queue buffer, writes it to
//! the log's [`LogStorage`] and confirms the drained offset. A batch that
//! fails to persist is retried alone until it is written; its offset is only
//! confirmed then, so flush waiters are never released early. While it
//! retries, the queue keeps its capacity bound and drops what does not fit.

use crate::core::sync::lock_unpoisoned;
use crate::queue::{PopResult, QueueResult, QueueSettings, QueueStats, SystemLogQueue};
use crate::system_log::error::{SystemLogError, SystemLogResult};
use crate::system_log::storage::{LogStorage, StorageResult};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One kind of system log: its queue, storage and saving thread
///
/// # Example
///
/// ```rust,no_run
/// use systemlog::events::QueryLogElement;
/// use systemlog::queue::QueueSettings;
/// use systemlog::system_log::{JsonLinesStorage, SystemLog};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let query_log = SystemLog::new(
///     "query_log",
///     QueueSettings::default(),
///     JsonLinesStorage::<QueryLogElement>::new("/var/lib/systemlog", "query_log"),
/// );
/// query_log.startup()?;
///
/// query_log.add(QueryLogElement::finished("q-1", "SELECT 1", 2, 1));
/// query_log.flush(false)?;
///
/// query_log.stop_flush_thread();
/// # Ok(())
/// # }
/// ```
pub struct SystemLog<E: Send + 'static> {
    queue: Arc<SystemLogQueue<E>>,
    /// Handed to the saving thread on startup
    storage: Mutex<Option<Box<dyn LogStorage<E>>>>,
    saving_thread: Mutex<Option<JoinHandle<()>>>,
}

impl<E: Send + 'static> SystemLog<E> {
    pub fn new(
        name: impl Into<String>,
        settings: QueueSettings,
        storage: impl LogStorage<E> + 'static,
    ) -> Self {
        Self {
            queue: Arc::new(SystemLogQueue::new(name, settings)),
            storage: Mutex::new(Some(Box::new(storage))),
            saving_thread: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        self.queue.name()
    }

    pub fn queue(&self) -> &Arc<SystemLogQueue<E>> {
        &self.queue
    }

    /// Spawn the saving thread. Calling it again is a no-op.
    pub fn startup(&self) -> SystemLogResult<()> {
        let mut saving_thread = lock_unpoisoned(&self.saving_thread);
        let Some(storage) = lock_unpoisoned(&self.storage).take() else {
            return Ok(());
        };

        let queue = Arc::clone(&self.queue);
        let retry_delay = queue.settings().flush_interval;
        let handle = thread::Builder::new()
            .name(format!("SystemLogFlush-{}", self.name()))
            .spawn(move || {
                let mut saver = Saver {
                    queue,
                    storage,
                    retry_delay,
                };
                saver.run();
            })
            .map_err(|source| SystemLogError::ThreadSpawn {
                name: self.name().to_string(),
                source,
            })?;

        *saving_thread = Some(handle);
        log::debug!("Started saving thread for system log '{}'", self.name());
        Ok(())
    }

    pub fn add(&self, event: E) {
        self.queue.add(event);
    }

    pub fn notify_flush(&self, force: bool) -> Option<u64> {
        self.queue.notify_flush(force)
    }

    pub fn wait_flush(&self, offset: u64) -> QueueResult<()> {
        self.queue.wait_flush(offset)
    }

    /// Flush everything added so far and wait for it to be persisted
    ///
    /// Returns immediately once the log is shut down.
    pub fn flush(&self, force: bool) -> SystemLogResult<()> {
        match self.notify_flush(force) {
            Some(offset) => Ok(self.wait_flush(offset)?),
            None => Ok(()),
        }
    }

    /// Shut the queue down and wait for the final drain to finish
    pub fn stop_flush_thread(&self) {
        self.queue.shutdown();

        let handle = lock_unpoisoned(&self.saving_thread).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Saving thread for system log '{}' panicked", self.name());
            }
        }
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }
}

impl<E: Send + 'static> Drop for SystemLog<E> {
    fn drop(&mut self) {
        self.stop_flush_thread();
    }
}

/// State owned by the saving thread
struct Saver<E> {
    queue: Arc<SystemLogQueue<E>>,
    storage: Box<dyn LogStorage<E>>,
    retry_delay: Duration,
}

impl<E> Saver<E> {
    fn run(&mut self) {
        let name = self.queue.name().to_string();
        log::trace!("Starting up saving thread for system log '{}'", name);

        // Reused across iterations: pop swaps it with the queue buffer
        let mut batch: Vec<E> = Vec::new();
        let mut lost_events = false;

        loop {
            let popped = self.queue.pop(&mut batch);
            lost_events |= !self.save(&batch, &popped);

            // An offset past lost events is never confirmed
            if !lost_events {
                self.queue.confirm(popped.to_flush_end);
                log::trace!(
                    "Flushed system log '{}' up to offset {}",
                    name,
                    popped.to_flush_end
                );
            }

            if popped.exit_this_thread {
                break;
            }
        }

        log::trace!("Terminated saving thread for system log '{}'", name);
    }

    /// Write one drained batch, returning whether it was persisted
    ///
    /// A failed write is retried, on its own, every `retry_delay` until it
    /// succeeds. Nothing new is popped meanwhile, so producers run into the
    /// queue capacity instead of piling events up here. Shutdown ends the
    /// retries after one last attempt.
    fn save(&mut self, batch: &[E], popped: &PopResult) -> bool {
        let mut shutting_down = popped.exit_this_thread;
        loop {
            match self.persist(batch, popped) {
                Ok(()) => return true,
                Err(e) if shutting_down => {
                    log::error!(
                        "Failed to flush system log '{}' on shutdown, {} events lost: {}",
                        self.queue.name(),
                        batch.len(),
                        e
                    );
                    return false;
                }
                Err(e) => {
                    log::error!(
                        "Failed to flush {} events to system log '{}', will retry: {}",
                        batch.len(),
                        self.queue.name(),
                        e
                    );
                    shutting_down = self.queue.wait_for_shutdown(self.retry_delay);
                }
            }
        }
    }

    fn persist(&mut self, batch: &[E], popped: &PopResult) -> StorageResult<()> {
        if batch.is_empty() {
            if popped.should_prepare_tables_anyway {
                self.storage.prepare(true)?;
            }
            return Ok(());
        }

        log::trace!(
            "Flushing system log '{}', {} entries up to offset {}",
            self.queue.name(),
            batch.len(),
            popped.to_flush_end
        );
        self.storage.prepare(popped.should_prepare_tables_anyway)?;
        self.storage.write_batch(batch)
    }
}
