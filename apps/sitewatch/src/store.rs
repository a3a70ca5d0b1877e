//! Persisted list of monitored URLs.
//!
//! The backing file is a JSON object `{"urls": [...]}`, always read and
//! written as a whole.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("URL store I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("URL store {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Failed to serialize URL list: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UrlFile {
    #[serde(default)]
    urls: Vec<String>,
}

/// File-backed URL list
#[derive(Debug, Clone)]
pub struct UrlStore {
    path: PathBuf,
}

impl UrlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty list if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "Creating empty URL store");
        self.save(&[])
    }

    /// Read the URL list, creating an empty store if none exists.
    pub fn load(&self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            self.ensure_exists()?;
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let file: UrlFile = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;

        Ok(file.urls)
    }

    /// Load for a monitoring cycle: any failure is reported and treated as an empty list.
    pub fn load_or_empty(&self) -> Vec<String> {
        self.load().unwrap_or_else(|e| {
            warn!("Error loading URLs: {}", e);
            Vec::new()
        })
    }

    /// Replace the stored list with `urls`.
    pub fn save(&self, urls: &[String]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(&UrlFile { urls: urls.to_vec() })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        fs::write(&self.path, body).map_err(|source| self.io_error(source))
    }

    /// Append `url` unless an identical entry exists. Returns whether it was added.
    pub fn add(&self, url: &str) -> Result<bool, StoreError> {
        let mut urls = self.load()?;
        if urls.iter().any(|u| u == url) {
            return Ok(false);
        }
        urls.push(url.to_string());
        self.save(&urls)?;
        Ok(true)
    }

    /// Remove every entry equal to any of `forms`, e.g. a URL as typed and
    /// its parsed form. Returns how many were removed.
    pub fn remove_any(&self, forms: &[&str]) -> Result<usize, StoreError> {
        let mut urls = self.load()?;
        let before = urls.len();
        urls.retain(|u| !forms.contains(&u.as_str()));
        let removed = before - urls.len();
        if removed > 0 {
            self.save(&urls)?;
        }
        Ok(removed)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}
