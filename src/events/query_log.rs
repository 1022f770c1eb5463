//! Query log events: one per finished (or failed) query

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    QueryStart,
    QueryFinish,
    ExceptionWhileProcessing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLogElement {
    pub status: QueryStatus,
    pub event_time_microseconds: i64,
    pub query_id: String,
    pub query: String,
    pub query_duration_ms: u64,
    pub read_rows: u64,
    pub memory_usage: u64,
    pub exception: Option<String>,
}

impl QueryLogElement {
    pub fn finished(
        query_id: impl Into<String>,
        query: impl Into<String>,
        query_duration_ms: u64,
        read_rows: u64,
    ) -> Self {
        Self {
            status: QueryStatus::QueryFinish,
            event_time_microseconds: super::now_microseconds(),
            query_id: query_id.into(),
            query: query.into(),
            query_duration_ms,
            read_rows,
            memory_usage: 0,
            exception: None,
        }
    }

    pub fn failed(
        query_id: impl Into<String>,
        query: impl Into<String>,
        exception: impl Into<String>,
    ) -> Self {
        Self {
            status: QueryStatus::ExceptionWhileProcessing,
            event_time_microseconds: super::now_microseconds(),
            query_id: query_id.into(),
            query: query.into(),
            query_duration_ms: 0,
            read_rows: 0,
            memory_usage: 0,
            exception: Some(exception.into()),
        }
    }

    pub fn with_memory_usage(mut self, memory_usage: u64) -> Self {
        self.memory_usage = memory_usage;
        self
    }
}
