//! In-memory storage with a shared probe for saving-thread tests

use crate::core::sync::lock_unpoisoned;
use crate::system_log::storage::{LogStorage, StorageError, StorageResult};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ProbeState<E> {
    written: Vec<E>,
    prepare_calls: usize,
    forced_prepares: usize,
    fail_writes: usize,
    failed_writes: usize,
}

/// Storage half: moved into the saving thread
pub(crate) struct MemoryStorage<E> {
    state: Arc<Mutex<ProbeState<E>>>,
}

/// Observer half: stays with the test
pub(crate) struct StorageProbe<E> {
    state: Arc<Mutex<ProbeState<E>>>,
}

impl<E> MemoryStorage<E> {
    pub(crate) fn new() -> (Self, StorageProbe<E>) {
        let state = Arc::new(Mutex::new(ProbeState {
            written: Vec::new(),
            prepare_calls: 0,
            forced_prepares: 0,
            fail_writes: 0,
            failed_writes: 0,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            StorageProbe { state },
        )
    }
}

impl<E: Clone> StorageProbe<E> {
    pub(crate) fn written(&self) -> Vec<E> {
        lock_unpoisoned(&self.state).written.clone()
    }
}

impl<E> StorageProbe<E> {
    pub(crate) fn prepare_calls(&self) -> usize {
        lock_unpoisoned(&self.state).prepare_calls
    }

    pub(crate) fn forced_prepares(&self) -> usize {
        lock_unpoisoned(&self.state).forced_prepares
    }

    pub(crate) fn failed_writes(&self) -> usize {
        lock_unpoisoned(&self.state).failed_writes
    }

    /// Make the next `count` writes fail
    pub(crate) fn fail_next_writes(&self, count: usize) {
        lock_unpoisoned(&self.state).fail_writes = count;
    }
}

impl<E: Clone + Send> LogStorage<E> for MemoryStorage<E> {
    fn prepare(&mut self, force: bool) -> StorageResult<()> {
        let mut state = lock_unpoisoned(&self.state);
        state.prepare_calls += 1;
        if force {
            state.forced_prepares += 1;
        }
        Ok(())
    }

    fn write_batch(&mut self, batch: &[E]) -> StorageResult<()> {
        let mut state = lock_unpoisoned(&self.state);
        if state.fail_writes > 0 {
            state.fail_writes -= 1;
            state.failed_writes += 1;
            return Err(StorageError::Unavailable {
                message: "injected write failure".to_string(),
            });
        }
        state.written.extend_from_slice(batch);
        Ok(())
    }
}
