use anyhow::Result;
use chrono::Local;
use std::sync::Arc;

use super::checker::{Checker, HttpChecker};
use super::types::CheckResult;

/// Monitoring executor - turns one probe into a classified check result
pub struct MonitoringExecutor {
    checker: Arc<dyn Checker>,
}

impl MonitoringExecutor {
    /// Create an executor backed by the HTTP checker
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        Ok(Self::with_checker(Arc::new(HttpChecker::new(timeout_seconds)?)))
    }

    pub fn with_checker(checker: Arc<dyn Checker>) -> Self {
        Self { checker }
    }

    /// Execute a single check. The timestamp is taken once the outcome is known.
    pub async fn execute_check(&self, url: &str) -> CheckResult {
        match self.checker.check(url).await {
            Ok(status_code) => CheckResult::from_response(url, status_code, Local::now()),
            Err(e) => CheckResult::from_error(url, e.to_string(), Local::now()),
        }
    }
}
