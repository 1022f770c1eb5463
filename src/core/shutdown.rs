//! Signal-driven shutdown coordination
//!
//! The first SIGINT/SIGTERM/SIGHUP/SIGQUIT (or Ctrl-C) requests a graceful
//! stop: producers finish, every system log is flushed and shut down. A
//! second signal exits immediately with status 130.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across async tasks and producer threads
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        };
        (coordinator, shutdown_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Flag for plain threads that cannot await the broadcast channel
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    /// Run `future_fn` with signal handlers installed
    ///
    /// Must be called from within a tokio runtime.
    pub async fn guard_with_coordinator<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(Self, broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        setup_signal_handlers(
            coordinator.shutdown_tx.clone(),
            coordinator.stop_flag(),
        );
        future_fn(coordinator, shutdown_rx).await
    }
}

/// Record one received signal; the second one exits the process
fn on_signal(
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_requested: &AtomicBool,
    signal_count: &AtomicUsize,
) {
    let previous = signal_count.fetch_add(1, Ordering::AcqRel);
    shutdown_requested.store(true, Ordering::Release);
    let _ = shutdown_tx.send(());
    if previous >= 1 {
        log::warn!("Second shutdown signal received; exiting without flushing");
        std::process::exit(130);
    }
    log::info!("Shutdown requested; flushing system logs");
}

fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>, shutdown_requested: Arc<AtomicBool>) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        // Default disposition: a closed stdout pipe ends the process
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use tokio::signal::unix::{signal, SignalKind};
        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let tx = shutdown_tx.clone();
            let requested = Arc::clone(&shutdown_requested);
            let count = Arc::clone(&signal_count);

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        on_signal(&tx, &requested, &count);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                on_signal(&shutdown_tx, &shutdown_requested, &signal_count);
            }
        });
    }
}
