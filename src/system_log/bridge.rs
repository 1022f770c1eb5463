//! `log::Log` adapter that mirrors diagnostics into the text log
//!
//! Every record goes to the wrapped logger as usual. Records at or above the
//! bridge's level are also added to the text-log queue. A queue reporting
//! its own state from inside `add` re-enters the bridge on the same thread;
//! that nested `add` is refused by the queue, so the record is printed but
//! not queued.

use crate::events::TextLogElement;
use crate::queue::SystemLogQueue;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::sync::Arc;

pub struct TextLogBridge {
    inner: Box<dyn Log>,
    text_log: Arc<SystemLogQueue<TextLogElement>>,
    level: LevelFilter,
}

impl TextLogBridge {
    /// `level` bounds what is queued; the inner logger applies its own filter
    pub fn new(
        inner: Box<dyn Log>,
        text_log: Arc<SystemLogQueue<TextLogElement>>,
        level: LevelFilter,
    ) -> Self {
        Self {
            inner,
            text_log,
            level,
        }
    }

    /// Install as the global logger
    pub fn install(self, max_level: LevelFilter) -> Result<(), SetLoggerError> {
        let max_level = max_level.max(self.level);
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn queues(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }
}

impl Log for TextLogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.queues(metadata) || self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        if self.queues(record.metadata()) {
            self.text_log.add(TextLogElement::from_record(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueSettings;
    use std::sync::Mutex;

    /// Inner logger that records formatted messages
    #[derive(Default)]
    struct Capture {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::Level::Debug
        }

        fn log(&self, record: &Record) {
            self.lines.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    fn record<'a>(level: log::Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .level(level)
            .target("systemlog::system_log::bridge")
            .args(args)
            .build()
    }

    #[test]
    fn test_records_reach_inner_logger_and_queue() {
        let capture = Capture::default();
        let lines = Arc::clone(&capture.lines);
        let text_log = Arc::new(SystemLogQueue::new("text_log", QueueSettings::default()));
        let bridge = TextLogBridge::new(Box::new(capture), Arc::clone(&text_log), LevelFilter::Info);

        bridge.log(&record(log::Level::Warn, format_args!("disk almost full")));

        assert_eq!(*lines.lock().unwrap(), vec!["disk almost full".to_string()]);
        text_log.notify_flush(false);
        let mut batch = Vec::new();
        text_log.pop(&mut batch);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].message, "disk almost full");
        assert_eq!(batch[0].level, "WARN");
    }

    #[test]
    fn test_records_below_bridge_level_are_not_queued() {
        let capture = Capture::default();
        let lines = Arc::clone(&capture.lines);
        let text_log = Arc::new(SystemLogQueue::new("text_log", QueueSettings::default()));
        let bridge = TextLogBridge::new(Box::new(capture), Arc::clone(&text_log), LevelFilter::Info);

        bridge.log(&record(log::Level::Debug, format_args!("details")));
        bridge.log(&record(log::Level::Trace, format_args!("noise")));

        assert_eq!(*lines.lock().unwrap(), vec!["details".to_string()]);
        assert!(text_log.is_empty());
    }
}
