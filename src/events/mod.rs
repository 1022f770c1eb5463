//! Telemetry event kinds
//!
//! Payload types carried by the system log queues. The queues treat them as
//! opaque values; only storage backends look at their fields.

mod query_log;
mod text_log;

pub use query_log::{QueryLogElement, QueryStatus};
pub use text_log::TextLogElement;

/// Current wall-clock time in microseconds since the Unix epoch
pub fn now_microseconds() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
