//! Type-erased view of a system log
//!
//! Lets the registry drive logs of different event types together.

use crate::queue::{QueueResult, QueueStats};
use crate::system_log::drain::SystemLog;
use crate::system_log::error::SystemLogResult;

pub trait SystemLogHandle: Send + Sync {
    fn name(&self) -> &str;

    fn startup(&self) -> SystemLogResult<()>;

    /// `None` once the log is shut down
    fn notify_flush(&self, force: bool) -> Option<u64>;

    fn wait_flush(&self, offset: u64) -> QueueResult<()>;

    fn flush(&self, force: bool) -> SystemLogResult<()>;

    /// Stop accepting events and join the saving thread
    fn shutdown(&self);

    fn stats(&self) -> QueueStats;
}

impl<E: Send + 'static> SystemLogHandle for SystemLog<E> {
    fn name(&self) -> &str {
        SystemLog::name(self)
    }

    fn startup(&self) -> SystemLogResult<()> {
        SystemLog::startup(self)
    }

    fn notify_flush(&self, force: bool) -> Option<u64> {
        SystemLog::notify_flush(self, force)
    }

    fn wait_flush(&self, offset: u64) -> QueueResult<()> {
        SystemLog::wait_flush(self, offset)
    }

    fn flush(&self, force: bool) -> SystemLogResult<()> {
        SystemLog::flush(self, force)
    }

    fn shutdown(&self) {
        self.stop_flush_thread();
    }

    fn stats(&self) -> QueueStats {
        SystemLog::stats(self)
    }
}
