//! System Log Drain Side
//!
//! Everything between a [`SystemLogQueue`](crate::queue::SystemLogQueue) and
//! durable storage:
//!
//! - [`SystemLog`] owns one queue and a saving thread that pops batches,
//!   writes them through a [`LogStorage`] and confirms what was written
//! - [`SystemLogs`] keeps every log of the process so they can be started,
//!   flushed and shut down together through [`SystemLogHandle`]
//! - [`JsonLinesStorage`] writes one JSON object per line per event
//! - [`TextLogBridge`] mirrors `log` records into a text-log queue

pub mod bridge;
pub mod drain;
pub mod error;
pub mod handle;
pub mod jsonl;
pub mod registry;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::TextLogBridge;
pub use drain::SystemLog;
pub use error::{SystemLogError, SystemLogResult};
pub use handle::SystemLogHandle;
pub use jsonl::JsonLinesStorage;
pub use registry::SystemLogs;
pub use storage::{LogStorage, StorageError, StorageResult};
