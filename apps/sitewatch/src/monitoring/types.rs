use chrono::{DateTime, Local};
use serde::Serialize;

/// Timestamp layout used in every rendered log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Liveness of a checked site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Live,
    Down,
}

impl std::fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorStatus::Live => write!(f, "live"),
            MonitorStatus::Down => write!(f, "down"),
        }
    }
}

/// Result of a single liveness check
///
/// Serialized as the JSON `record` field of the per-check debug event.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// URL that was checked
    pub url: String,

    /// Local time at which the outcome was classified
    pub timestamp: DateTime<Local>,

    pub status: MonitorStatus,

    /// HTTP status code, when a response was received
    pub status_code: Option<u16>,

    /// Transport error description, when no response was received
    pub error_message: Option<String>,
}

impl CheckResult {
    /// A response arrived; only 200 counts as live.
    pub fn from_response(url: impl Into<String>, status_code: u16, timestamp: DateTime<Local>) -> Self {
        let status = if status_code == 200 { MonitorStatus::Live } else { MonitorStatus::Down };
        Self {
            url: url.into(),
            timestamp,
            status,
            status_code: Some(status_code),
            error_message: None,
        }
    }

    /// No response arrived.
    pub fn from_error(url: impl Into<String>, error: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            url: url.into(),
            timestamp,
            status: MonitorStatus::Down,
            status_code: None,
            error_message: Some(error.into()),
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == MonitorStatus::Live
    }

    /// One-line JSON form of this result
    pub fn to_record(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }

    /// Human-readable line written to the result log and used as the alert body
    pub fn message(&self) -> String {
        let detail = match (&self.status_code, &self.error_message) {
            (Some(code), _) => format!("Status code: {code}"),
            (None, Some(error)) => format!("Error: {error}"),
            (None, None) => "Error: unknown".to_string(),
        };
        format!(
            "{} is {} at {}. {}",
            self.url,
            self.status,
            self.timestamp.format(TIMESTAMP_FORMAT),
            detail
        )
    }
}
