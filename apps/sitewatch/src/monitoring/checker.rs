use anyhow::{Result, anyhow};
use std::time::Duration;

/// Checker trait for liveness probes
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Perform exactly one request and return the response status code.
    ///
    /// `Err` means no response was received (connect, DNS, TLS, timeout).
    async fn check(&self, target: &str) -> Result<u16>;
}

/// HTTP/HTTPS checker issuing a single GET
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, target: &str) -> Result<u16> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| anyhow!("{}", describe_error(&e)))?;

        Ok(response.status().as_u16())
    }
}

/// Flatten an error and its sources into one line
pub fn describe_error(error: &(dyn std::error::Error + 'static)) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !description.contains(&cause_text) {
            description.push_str(": ");
            description.push_str(&cause_text);
        }
        source = cause.source();
    }
    description
}
