/// Scenario tests for the monitor loop
///
/// The checker and notifier are replaced with in-process fakes; the URL
/// store and result log are real files in a temp directory.
use crate::config::Smtp;
use crate::journal::ResultLog;
use crate::monitoring::checker::Checker;
use crate::monitoring::{CycleReport, MonitoringExecutor, MonitoringScheduler};
use crate::notify::{NotificationSender, NotifyError};
use crate::store::UrlStore;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio::sync::watch;

/// Checker answering from a fixed table; unknown URLs are refused
#[derive(Default)]
struct ScriptedChecker {
    outcomes: HashMap<String, std::result::Result<u16, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    fn with(mut self, url: &str, outcome: std::result::Result<u16, &str>) -> Self {
        self.outcomes.insert(url.to_string(), outcome.map_err(str::to_string));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Checker for ScriptedChecker {
    async fn check(&self, target: &str) -> Result<u16> {
        self.calls.lock().unwrap().push(target.to_string());
        match self.outcomes.get(target) {
            Some(Ok(code)) => Ok(*code),
            Some(Err(e)) => Err(anyhow!("{}", e)),
            None => Err(anyhow!("connection refused")),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[async_trait::async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send(&self, config: &Smtp, message: &str) -> std::result::Result<(), NotifyError> {
        self.sent.lock().unwrap().push((config.receiver.clone(), message.to_string()));
        if self.fail { Err(NotifyError::MissingCredential) } else { Ok(()) }
    }
}

struct Harness {
    _dir: TempDir,
    log_path: PathBuf,
    store: UrlStore,
    checker: Arc<ScriptedChecker>,
    notifier: Arc<RecordingNotifier>,
    scheduler: MonitoringScheduler,
}

impl Harness {
    fn new(urls: &[&str], checker: ScriptedChecker, notifier: RecordingNotifier) -> Self {
        Self::with_interval(urls, checker, notifier, Duration::from_secs(600))
    }

    fn with_interval(
        urls: &[&str],
        checker: ScriptedChecker,
        notifier: RecordingNotifier,
        interval: Duration,
    ) -> Self {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("website_status.log");
        let store = UrlStore::new(dir.path().join("urls.json"));
        store.save(&urls.iter().map(|u| u.to_string()).collect::<Vec<_>>()).unwrap();

        let checker = Arc::new(checker);
        let notifier = Arc::new(notifier);
        let smtp = Smtp { receiver: "ops@example.com".into(), ..Smtp::default() };

        let scheduler = MonitoringScheduler::new(
            store.clone(),
            Arc::new(MonitoringExecutor::with_checker(checker.clone())),
            notifier.clone(),
            smtp,
            Arc::new(ResultLog::new(&log_path)),
            interval,
        );

        Self { _dir: dir, log_path, store, checker, notifier, scheduler }
    }

    fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[tokio::test]
async fn test_live_site_is_logged_without_alert() {
    let h = Harness::new(
        &["https://example.com"],
        ScriptedChecker::default().with("https://example.com", Ok(200)),
        RecordingNotifier::default(),
    );

    let report = h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("https://example.com is live at "));
    assert!(lines[0].ends_with(". Status code: 200"));
    assert!(h.notifier.messages().is_empty());
    assert_eq!(report, CycleReport { checked: 1, ..CycleReport::default() });
}

#[tokio::test]
async fn test_unreachable_site_is_logged_and_alerted() {
    let h = Harness::new(
        &["https://down.example"],
        ScriptedChecker::default().with("https://down.example", Err("connection refused")),
        RecordingNotifier::default(),
    );

    let report = h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("is down at"));
    assert!(lines[0].contains("Error: connection refused"));
    assert_eq!(lines[1], format!("Notification sent: {}", lines[0]));

    // The alert body is exactly the logged result line
    assert_eq!(h.notifier.messages(), vec![lines[0].clone()]);
    assert_eq!(h.notifier.sent.lock().unwrap()[0].0, "ops@example.com");
    assert_eq!(report.down, 1);
    assert_eq!(report.notified, 1);
}

#[tokio::test]
async fn test_failed_alert_is_logged_and_loop_continues() {
    let h = Harness::new(
        &["https://down.example", "https://example.com"],
        ScriptedChecker::default()
            .with("https://down.example", Err("connection refused"))
            .with("https://example.com", Ok(200)),
        RecordingNotifier::failing(),
    );

    let report = h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("is down at") && lines[0].contains("Error:"));
    assert!(lines[1].starts_with("Failed to send notification"));
    assert!(lines[2].starts_with("https://example.com is live at "));
    assert_eq!(report.notify_failed, 1);
    assert_eq!(report.checked, 2);
}

#[tokio::test]
async fn test_non_200_status_is_down_and_alerted() {
    let h = Harness::new(
        &["https://redirect.example", "https://error.example"],
        ScriptedChecker::default()
            .with("https://redirect.example", Ok(301))
            .with("https://error.example", Ok(500)),
        RecordingNotifier::default(),
    );

    h.scheduler.run_cycle().await;

    let results: Vec<String> =
        h.log_lines().into_iter().filter(|l| !l.starts_with("Notification sent")).collect();
    assert!(results[0].contains("is down at") && results[0].ends_with("Status code: 301"));
    assert!(results[1].contains("is down at") && results[1].ends_with("Status code: 500"));
    assert_eq!(h.notifier.messages().len(), 2);
}

#[tokio::test]
async fn test_empty_store_logs_marker_only() {
    let h = Harness::new(&[], ScriptedChecker::default(), RecordingNotifier::default());

    let report = h.scheduler.run_cycle().await;
    h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.starts_with("No URLs to monitor at ")));
    // The marker carries a real timestamp, not a template
    assert!(lines.iter().all(|l| !l.contains('{')));
    assert!(h.checker.calls().is_empty());
    assert!(h.notifier.messages().is_empty());
    assert_eq!(report, CycleReport::default());
}

#[tokio::test]
async fn test_corrupt_store_behaves_like_empty() {
    let h = Harness::new(&[], ScriptedChecker::default(), RecordingNotifier::default());
    std::fs::write(h.store.path(), "not json").unwrap();

    h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("No URLs to monitor at "));
    assert!(h.checker.calls().is_empty());
}

#[tokio::test]
async fn test_one_result_per_url_per_cycle() {
    let urls = ["https://a.example", "https://b.example", "https://a.example"];
    let h = Harness::new(
        &urls,
        ScriptedChecker::default().with("https://a.example", Ok(200)).with("https://b.example", Ok(200)),
        RecordingNotifier::default(),
    );

    h.scheduler.run_cycle().await;
    h.scheduler.run_cycle().await;

    let lines = h.log_lines();
    assert_eq!(lines.len(), urls.len() * 2);
    assert_eq!(h.checker.calls(), [urls, urls].concat());
}

#[tokio::test]
async fn test_store_is_reloaded_every_cycle() {
    let h = Harness::new(
        &["https://a.example"],
        ScriptedChecker::default().with("https://a.example", Ok(200)).with("https://b.example", Ok(200)),
        RecordingNotifier::default(),
    );

    h.scheduler.run_cycle().await;
    h.store.add("https://b.example").unwrap();
    h.scheduler.run_cycle().await;

    assert_eq!(h.checker.calls(), vec!["https://a.example", "https://a.example", "https://b.example"]);
}

#[tokio::test]
async fn test_shutdown_interrupts_sleep() {
    let h = Harness::with_interval(
        &["https://example.com"],
        ScriptedChecker::default().with("https://example.com", Ok(200)),
        RecordingNotifier::default(),
        Duration::from_secs(3600),
    );
    let (tx, rx) = watch::channel(false);

    let stopper = async {
        // Wait until the first cycle has written its line, then stop.
        while h.log_lines().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();
    };

    let (cycles, ()) =
        tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(h.scheduler.run(rx), stopper) })
            .await
            .expect("loop did not stop during its sleep");

    assert_eq!(cycles, 1);
    assert_eq!(h.log_lines().len(), 1);
}

#[tokio::test]
async fn test_shutdown_before_start_runs_no_cycle() {
    let h = Harness::new(&["https://example.com"], ScriptedChecker::default(), RecordingNotifier::default());
    let (_tx, rx) = watch::channel(true);

    assert_eq!(h.scheduler.run(rx).await, 0);
    assert!(h.checker.calls().is_empty());
}

#[tokio::test]
async fn test_sleep_repeats_cycles_until_stopped() {
    let h = Harness::with_interval(
        &["https://example.com"],
        ScriptedChecker::default().with("https://example.com", Ok(200)),
        RecordingNotifier::default(),
        Duration::from_millis(20),
    );
    let (tx, rx) = watch::channel(false);

    let stopper = async {
        while h.log_lines().len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tx.send(true).unwrap();
    };

    let (cycles, ()) =
        tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(h.scheduler.run(rx), stopper) })
            .await
            .unwrap();

    assert!(cycles >= 3);
    assert_eq!(h.log_lines().len(), cycles);
}
