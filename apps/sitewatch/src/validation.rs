//! Validation for user-supplied URLs and timing settings.
//!
//! The monitor loop checks whatever the store holds; these checks guard the
//! CLI and the startup configuration only.

use anyhow::{Result, anyhow};
use url::Url;

/// Validate a website address before it is added to the store
pub fn validate_url(target: &str) -> Result<Url> {
    let url = Url::parse(target.trim()).map_err(|e| anyhow!("Invalid URL: {}", e))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Unsupported scheme: {} (expected http or https)", other)),
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(anyhow!("URL has no host: {}", target));
    }

    if url.port() == Some(0) {
        return Err(anyhow!("Port 0 is not valid"));
    }

    Ok(url)
}

/// Validate check interval
pub fn validate_check_interval(interval_seconds: u64) -> Result<()> {
    const MIN_INTERVAL: u64 = 10;
    const MAX_INTERVAL: u64 = 86400;

    if interval_seconds < MIN_INTERVAL {
        return Err(anyhow!(
            "Check interval too short: {} seconds (minimum: {})",
            interval_seconds,
            MIN_INTERVAL
        ));
    }

    if interval_seconds > MAX_INTERVAL {
        return Err(anyhow!(
            "Check interval too long: {} seconds (maximum: {})",
            interval_seconds,
            MAX_INTERVAL
        ));
    }

    Ok(())
}

/// Validate timeout is reasonable
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    const MIN_TIMEOUT: u64 = 1;
    const MAX_TIMEOUT: u64 = 300;

    if timeout_seconds < MIN_TIMEOUT {
        return Err(anyhow!(
            "Timeout too short: {} seconds (minimum: {})",
            timeout_seconds,
            MIN_TIMEOUT
        ));
    }

    if timeout_seconds > MAX_TIMEOUT {
        return Err(anyhow!(
            "Timeout too long: {} seconds (maximum: {})",
            timeout_seconds,
            MAX_TIMEOUT
        ));
    }

    Ok(())
}
