use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::executor::MonitoringExecutor;
use super::types::TIMESTAMP_FORMAT;
use crate::config::Smtp;
use crate::journal::ResultLog;
use crate::notify::{NotificationSender, outcome_line};
use crate::store::UrlStore;

/// What one pass over the URL list did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub down: usize,
    pub notified: usize,
    pub notify_failed: usize,
}

/// Monitor loop - load, check, log, alert, sleep; until shut down
pub struct MonitoringScheduler {
    store: UrlStore,
    executor: Arc<MonitoringExecutor>,
    notifier: Arc<dyn NotificationSender>,
    smtp: Smtp,
    log: Arc<ResultLog>,
    interval: Duration,
}

impl MonitoringScheduler {
    pub fn new(
        store: UrlStore,
        executor: Arc<MonitoringExecutor>,
        notifier: Arc<dyn NotificationSender>,
        smtp: Smtp,
        log: Arc<ResultLog>,
        interval: Duration,
    ) -> Self {
        Self { store, executor, notifier, smtp, log, interval }
    }

    /// Run one cycle. URLs are checked one after another; every result is
    /// logged before this returns.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        let urls = self.store.load_or_empty();

        if urls.is_empty() {
            info!("No URLs to monitor. Waiting {} seconds...", self.interval.as_secs());
            let marker =
                format!("No URLs to monitor at {}", Local::now().format(TIMESTAMP_FORMAT));
            self.log.record(&marker).await;
            return report;
        }

        debug!(count = urls.len(), "Starting check cycle");

        for url in &urls {
            let result = self.executor.execute_check(url).await;
            let message = result.message();
            self.log.record(&message).await;
            report.checked += 1;
            debug!(record = %result.to_record(), "Check record");

            if result.is_live() {
                info!(
                    url = %result.url,
                    timestamp = %result.timestamp.format(TIMESTAMP_FORMAT),
                    live = true,
                    status_code = result.status_code,
                    "{}",
                    message
                );
                continue;
            }

            warn!(
                url = %result.url,
                timestamp = %result.timestamp.format(TIMESTAMP_FORMAT),
                live = false,
                status_code = result.status_code,
                error = result.error_message.as_deref(),
                "{}",
                message
            );
            report.down += 1;

            let sent = self.notifier.send(&self.smtp, &message).await;
            let outcome = outcome_line(&message, &sent);
            self.log.record(&outcome).await;
            match sent {
                Ok(()) => {
                    report.notified += 1;
                    info!(url = %result.url, "{}", outcome);
                }
                Err(_) => {
                    report.notify_failed += 1;
                    error!(url = %result.url, "{}", outcome);
                }
            }
        }

        report
    }

    /// Run cycles until `shutdown` turns true. A started cycle always
    /// completes; the sleep between cycles is cut short. Returns the number
    /// of completed cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut cycles = 0;

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let report = self.run_cycle().await;
            cycles += 1;
            debug!(?report, cycle = cycles, "Cycle finished");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }
        }

        info!("Monitor loop stopped after {} cycles", cycles);
        cycles
    }
}

/// Resolves once the flag is set. A dropped sender can never signal, so it pends.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
