//! Common test utilities and helpers
//!
//! Shared by the integration test binaries; not every binary uses every
//! helper.
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use systemlog::system_log::{LogStorage, StorageError, StorageResult};

/// Inner logger that keeps every formatted message
#[derive(Clone, Default)]
pub struct CapturingLogger {
    lines: Arc<Mutex<Vec<(log::Level, String)>>>,
}

impl CapturingLogger {
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap().clear();
    }
}

impl log::Log for CapturingLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Debug
    }

    fn log(&self, record: &log::Record) {
        self.lines
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

/// Storage that fails every write until it is switched to healthy
pub struct SwitchableStorage<E> {
    pub written: Arc<Mutex<Vec<E>>>,
    pub healthy: Arc<AtomicBool>,
    pub failed_writes: Arc<AtomicUsize>,
}

impl<E> SwitchableStorage<E> {
    pub fn new(healthy: bool) -> Self {
        Self {
            written: Arc::new(Mutex::new(Vec::new())),
            healthy: Arc::new(AtomicBool::new(healthy)),
            failed_writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handles the test keeps after the storage moves into a system log
    pub fn handles(&self) -> (Arc<Mutex<Vec<E>>>, Arc<AtomicBool>, Arc<AtomicUsize>) {
        (
            Arc::clone(&self.written),
            Arc::clone(&self.healthy),
            Arc::clone(&self.failed_writes),
        )
    }
}

impl<E: Clone + Send> LogStorage<E> for SwitchableStorage<E> {
    fn prepare(&mut self, _force: bool) -> StorageResult<()> {
        Ok(())
    }

    fn write_batch(&mut self, batch: &[E]) -> StorageResult<()> {
        if !self.healthy.load(Ordering::SeqCst) {
            self.failed_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable {
                message: "destination offline".to_string(),
            });
        }
        self.written.lock().unwrap().extend_from_slice(batch);
        Ok(())
    }
}

/// Non-empty lines of a JSON-lines file
pub fn read_json_lines(path: &Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
