//! Synthetic query workload
//!
//! Each producer thread plays the part of a query executor: it runs under
//! its own memory budget, charges a little memory per "query", and records
//! a query_log event for every query it finishes or fails.

use crate::app::cli::args::Args;
use crate::events::QueryLogElement;
use crate::resource::{MemoryBudget, MemoryTracker};
use crate::system_log::SystemLog;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Every this many queries one fails
const FAILURE_EVERY: u64 = 97;

/// Progress is logged (and so lands in text_log) this often
const PROGRESS_EVERY: u64 = 10_000;

const SAMPLE_QUERIES: [&str; 4] = [
    "SELECT count() FROM hits WHERE CounterID = 62",
    "SELECT URL, count() AS c FROM hits GROUP BY URL ORDER BY c DESC LIMIT 10",
    "INSERT INTO visits SELECT * FROM input('VisitID UInt64')",
    "SELECT uniqExact(UserID) FROM hits WHERE EventDate >= today() - 7",
];

#[derive(Debug, Clone)]
pub struct WorkloadOptions {
    pub producers: usize,
    /// Pause between two queries of one producer
    pub pause: Duration,
    /// Per-producer memory limit, if any
    pub memory_limit: Option<usize>,
}

impl WorkloadOptions {
    pub fn from_args(args: &Args) -> Self {
        Self {
            producers: args.producers,
            pause: args.event_pause(),
            memory_limit: args.memory_limit,
        }
    }
}

/// What one producer did before it was stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerReport {
    pub queries: u64,
    pub failures: u64,
    pub peak_memory: usize,
}

impl ProducerReport {
    fn merge(self, other: Self) -> Self {
        Self {
            queries: self.queries + other.queries,
            failures: self.failures + other.failures,
            peak_memory: self.peak_memory.max(other.peak_memory),
        }
    }
}

pub struct Workload {
    producers: Vec<JoinHandle<ProducerReport>>,
}

impl Workload {
    /// Start the producer threads; they run until `stop` is set
    pub fn start(
        query_log: Arc<SystemLog<QueryLogElement>>,
        options: &WorkloadOptions,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let mut producers = Vec::with_capacity(options.producers);
        for id in 0..options.producers {
            let query_log = Arc::clone(&query_log);
            let stop = Arc::clone(&stop);
            let pause = options.pause;
            let budget = Arc::new(MemoryBudget::new(
                format!("producer-{}", id),
                options.memory_limit,
            ));

            let handle = thread::Builder::new()
                .name(format!("producer-{}", id))
                .spawn(move || run_producer(id, &query_log, budget, pause, &stop))?;
            producers.push(handle);
        }
        log::info!("Started {} producer threads", producers.len());
        Ok(Self { producers })
    }

    /// Wait for every producer and sum up their reports
    pub fn join(self) -> ProducerReport {
        self.producers
            .into_iter()
            .filter_map(|handle| match handle.join() {
                Ok(report) => Some(report),
                Err(_) => {
                    log::error!("A producer thread panicked");
                    None
                }
            })
            .fold(ProducerReport::default(), ProducerReport::merge)
    }
}

fn run_producer(
    id: usize,
    query_log: &SystemLog<QueryLogElement>,
    budget: Arc<MemoryBudget>,
    pause: Duration,
    stop: &AtomicBool,
) -> ProducerReport {
    let _attached = MemoryTracker::attach(Arc::clone(&budget));
    let mut report = ProducerReport::default();

    while !stop.load(Ordering::Acquire) {
        let query_id = format!("{}-{}", id, report.queries);
        let query = SAMPLE_QUERIES[(report.queries as usize) % SAMPLE_QUERIES.len()];
        let started = Instant::now();

        // Stand-in for the working set of the query
        let working_set = query.len() * 64;
        let element = match MemoryTracker::alloc(working_set) {
            Ok(()) => {
                let element = if report.queries % FAILURE_EVERY == FAILURE_EVERY - 1 {
                    report.failures += 1;
                    QueryLogElement::failed(query_id, query, "Code: 60. Table doesn't exist")
                } else {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    QueryLogElement::finished(query_id, query, duration_ms, report.queries % 1000)
                };
                MemoryTracker::free(working_set);
                element
            }
            Err(e) => {
                report.failures += 1;
                QueryLogElement::failed(query_id, query, e.to_string())
            }
        };

        query_log.add(element.with_memory_usage(working_set as u64));
        report.queries += 1;

        if report.queries % PROGRESS_EVERY == 0 {
            log::info!("Producer {} finished {} queries", id, report.queries);
        }
        thread::sleep(pause);
    }

    report.peak_memory = budget.peak();
    log::debug!(
        "Producer {} stopped after {} queries ({} failed)",
        id,
        report.queries,
        report.failures
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::QueryStatus;
    use crate::queue::QueueSettings;
    use crate::system_log::testing::MemoryStorage;

    fn start(
        memory_limit: Option<usize>,
    ) -> (
        Arc<SystemLog<QueryLogElement>>,
        crate::system_log::testing::StorageProbe<QueryLogElement>,
        Workload,
        Arc<AtomicBool>,
    ) {
        let (storage, probe) = MemoryStorage::new();
        let settings = QueueSettings::default().with_flush_interval(Duration::from_millis(20));
        let query_log = Arc::new(SystemLog::new("query_log", settings, storage));
        query_log.startup().unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let options = WorkloadOptions {
            producers: 2,
            pause: Duration::from_micros(200),
            memory_limit,
        };
        let workload = Workload::start(Arc::clone(&query_log), &options, Arc::clone(&stop)).unwrap();
        (query_log, probe, workload, stop)
    }

    #[test]
    fn test_options_from_command_line() {
        use clap::Parser;

        let args = Args::try_parse_from([
            "systemlog",
            "--producers",
            "3",
            "--events-per-second",
            "500",
            "--memory-limit",
            "4096",
        ])
        .unwrap();
        let options = WorkloadOptions::from_args(&args);

        assert_eq!(options.producers, 3);
        assert_eq!(options.pause, Duration::from_millis(2));
        assert_eq!(options.memory_limit, Some(4096));

        let unlimited = WorkloadOptions::from_args(&Args::try_parse_from(["systemlog"]).unwrap());
        assert_eq!(unlimited.memory_limit, None);
    }

    #[test]
    fn test_producers_fill_query_log_until_stopped() {
        let (query_log, probe, workload, stop) = start(None);

        thread::sleep(Duration::from_millis(100));
        stop.store(true, Ordering::Release);
        let report = workload.join();
        query_log.flush(false).unwrap();

        assert!(report.queries > 0);
        assert_eq!(probe.written().len() as u64, report.queries);
        assert!(report.peak_memory > 0);
        println!("✓ {} queries recorded", report.queries);
    }

    #[test]
    fn test_memory_limit_turns_queries_into_failures() {
        let (query_log, probe, workload, stop) = start(Some(16));

        thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Release);
        let report = workload.join();
        query_log.flush(false).unwrap();

        assert_eq!(report.failures, report.queries);
        assert!(probe
            .written()
            .iter()
            .all(|event| event.status == QueryStatus::ExceptionWhileProcessing));
    }
}
