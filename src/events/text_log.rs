//! Text log events: one per diagnostic message

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLogElement {
    pub event_time_microseconds: i64,
    pub thread_name: String,
    pub level: String,
    pub logger_name: String,
    pub message: String,
    pub source_file: Option<String>,
    pub source_line: Option<u32>,
}

impl TextLogElement {
    /// Capture a `log` record emitted on the current thread
    pub fn from_record(record: &log::Record<'_>) -> Self {
        Self {
            event_time_microseconds: super::now_microseconds(),
            thread_name: std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
            level: record.level().to_string(),
            logger_name: record.target().to_string(),
            message: record.args().to_string(),
            source_file: record.file().map(str::to_string),
            source_line: record.line(),
        }
    }
}
