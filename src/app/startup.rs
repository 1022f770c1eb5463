//! Application startup and the main run loop

use super::cli::args::Args;
use super::cli::config::{ConfigError, Settings};
use super::cli::display::print_stats_summary;
use super::workload::{Workload, WorkloadOptions};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::build_logger;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::version_string;
use crate::events::{QueryLogElement, TextLogElement};
use crate::queue::QueueStats;
use crate::system_log::{
    JsonLinesStorage, SystemLog, SystemLogError, SystemLogResult, SystemLogs, TextLogBridge,
};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Records at this level and above are kept in text_log
const TEXT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Parse arguments, load configuration, run the pipeline. Returns the exit code.
pub async fn startup() -> i32 {
    let args = Args::parse();

    let mut settings = match Settings::load(args.config_file.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    settings.apply_args(&args);

    let use_color = settings
        .logging
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());

    let storage_dir = settings.storage.directory.clone();
    let queue_settings = settings.queue_settings();
    let query_log = Arc::new(SystemLog::new(
        "query_log",
        queue_settings.clone(),
        JsonLinesStorage::<QueryLogElement>::new(&storage_dir, "query_log"),
    ));
    let text_log = Arc::new(SystemLog::new(
        "text_log",
        queue_settings,
        JsonLinesStorage::<TextLogElement>::new(&storage_dir, "text_log"),
    ));

    if let Err(e) = install_logging(&settings, use_color, &text_log) {
        eprintln!("Error initialising logging: {}", e);
        return 1;
    }

    if let Err(e) = settings.validate() {
        log_error_with_context(&ConfigError::from(e), "Validating configuration");
        return 1;
    }

    log::info!(
        "systemlog {} writing to {}",
        version_string(),
        storage_dir.display()
    );

    let logs = match start_logs(&query_log, &text_log) {
        Ok(logs) => Arc::new(logs),
        Err(e) => {
            log_error_with_context(&e, "Starting system logs");
            return 1;
        }
    };

    let result = ShutdownCoordinator::guard_with_coordinator(|coordinator, shutdown_rx| {
        run(args, query_log, Arc::clone(&logs), coordinator, shutdown_rx)
    })
    .await;

    let stats: Vec<QueueStats> = logs.iter().map(|log| log.stats()).collect();
    print_stats_summary(&stats, use_color);

    match result {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, "Flushing system logs");
            1
        }
    }
}

fn install_logging(
    settings: &Settings,
    use_color: bool,
    text_log: &SystemLog<TextLogElement>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (inner, max_level) = build_logger(
        settings.logging.level.as_deref(),
        settings.logging.format.as_deref(),
        settings.log_file(),
        use_color,
    )?;
    TextLogBridge::new(inner, Arc::clone(text_log.queue()), TEXT_LOG_LEVEL).install(max_level)?;
    Ok(())
}

fn start_logs(
    query_log: &Arc<SystemLog<QueryLogElement>>,
    text_log: &Arc<SystemLog<TextLogElement>>,
) -> SystemLogResult<SystemLogs> {
    let mut logs = SystemLogs::new();
    logs.register(query_log.clone())?;
    logs.register(text_log.clone())?;
    logs.startup_all()?;
    Ok(logs)
}

/// Resolves when `deadline` passes; never without one
async fn expire(deadline: Option<Duration>) {
    match deadline {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

async fn flush_in_background(logs: &Arc<SystemLogs>, force: bool) -> Result<(), SystemLogError> {
    let logs = Arc::clone(logs);
    match tokio::task::spawn_blocking(move || logs.flush_all(force)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Flush task failed: {}", e);
            Ok(())
        }
    }
}

async fn run(
    args: Args,
    query_log: Arc<SystemLog<QueryLogElement>>,
    logs: Arc<SystemLogs>,
    coordinator: ShutdownCoordinator,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), SystemLogError> {
    let options = WorkloadOptions::from_args(&args);
    let workload = match Workload::start(query_log, &options, coordinator.stop_flag()) {
        Ok(workload) => workload,
        Err(e) => {
            log::error!("Failed to start producers: {}", e);
            coordinator.trigger_shutdown();
            logs.shutdown_all();
            return Ok(());
        }
    };

    let mut ticker = tokio::time::interval(args.flush_every());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    let deadline = expire(args.duration());
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = &mut deadline => {
                log::info!("Run time elapsed, stopping producers");
                coordinator.trigger_shutdown();
                break;
            }
            _ = ticker.tick() => {
                match flush_in_background(&logs, false).await {
                    Ok(()) => log::debug!("Periodic flush of all system logs complete"),
                    Err(e) => log::warn!("Periodic flush failed: {}", e),
                }
            }
        }
    }

    let report = tokio::task::spawn_blocking(move || workload.join())
        .await
        .unwrap_or_default();
    log::info!(
        "Producers finished {} queries ({} failed, peak working set {} bytes)",
        report.queries,
        report.failures,
        report.peak_memory
    );

    let flushed = flush_in_background(&logs, false).await;
    let shutdown_logs = Arc::clone(&logs);
    if tokio::task::spawn_blocking(move || shutdown_logs.shutdown_all())
        .await
        .is_err()
    {
        log::error!("Shutting down system logs failed");
    }
    flushed
}
