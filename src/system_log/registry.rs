//! Registry of every system log in the process

use crate::system_log::error::{SystemLogError, SystemLogResult};
use crate::system_log::handle::SystemLogHandle;
use std::sync::Arc;

/// Holds the system logs so they can be started, flushed and stopped together
#[derive(Default)]
pub struct SystemLogs {
    logs: Vec<Arc<dyn SystemLogHandle>>,
}

impl SystemLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, log: Arc<dyn SystemLogHandle>) -> SystemLogResult<()> {
        if self.get(log.name()).is_some() {
            return Err(SystemLogError::DuplicateName {
                name: log.name().to_string(),
            });
        }
        self.logs.push(log);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn SystemLogHandle>> {
        self.logs.iter().find(|log| log.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SystemLogHandle>> {
        self.logs.iter()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn startup_all(&self) -> SystemLogResult<()> {
        for log in &self.logs {
            log.startup()?;
        }
        Ok(())
    }

    /// Request a flush of every log, then wait for each of them
    ///
    /// All requests go out before the first wait so the saving threads work
    /// in parallel. Every log is waited on; the first error is returned.
    pub fn flush_all(&self, force: bool) -> SystemLogResult<()> {
        let tickets: Vec<_> = self
            .logs
            .iter()
            .map(|log| (log, log.notify_flush(force)))
            .collect();

        let mut first_error = None;
        for (log, ticket) in tickets {
            let Some(offset) = ticket else { continue };
            if let Err(e) = log.wait_flush(offset) {
                log::warn!("Flush of system log '{}' failed: {}", log.name(), e);
                first_error.get_or_insert(SystemLogError::from(e));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn shutdown_all(&self) {
        for log in &self.logs {
            log.shutdown();
        }
    }
}
