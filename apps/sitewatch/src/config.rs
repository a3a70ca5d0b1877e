use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{validate_check_interval, validate_timeout};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: std::io::Error },

    #[error("failed to write config {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: std::io::Error },

    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("no config path available (neither XDG_CONFIG_HOME nor HOME is set)")]
    ConfigPathUnavailable,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: Monitor,
    pub smtp: Smtp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitor {
    pub url_file: path::PathBuf,
    pub log_file: path::PathBuf,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
}

/// SMTP settings used by the email notifier.
///
/// `password` may be left out of the file and supplied through
/// `SITEWATCH_SMTP_PASSWORD` instead.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Smtp {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub receiver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub timeout_seconds: u64,
}

impl Smtp {
    /// Login name, falling back to the sender address.
    pub fn login(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.sender)
    }
}

impl fmt::Debug for Smtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Smtp")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self {
            url_file: "urls.json".into(),
            log_file: "website_status.log".into(),
            interval_seconds: 600,
            timeout_seconds: 10,
        }
    }
}

impl Default for Smtp {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".into(),
            port: 587,
            sender: "your_email@gmail.com".into(),
            receiver: "your_email@gmail.com".into(),
            username: None,
            password: None,
            timeout_seconds: 30,
        }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/sitewatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("sitewatch/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Monitor")?;
        write_1(f, "URL File", &self.monitor.url_file.display())?;
        write_1(f, "Log File", &self.monitor.log_file.display())?;
        write_1(f, "Interval (s)", &self.monitor.interval_seconds)?;
        write_1(f, "Timeout (s)", &self.monitor.timeout_seconds)?;
        write_title_1(f, "SMTP")?;
        write_1(f, "Server", &self.smtp.server)?;
        write_1(f, "Port", &self.smtp.port)?;
        write_1(f, "Sender", &self.smtp.sender)?;
        write_1(f, "Receiver", &self.smtp.receiver)?;
        write_1(f, "Login", &self.smtp.login())?;
        write_1(f, "Password", &if self.smtp.password.is_some() { "********" } else { "<unset>" })?;
        write_1(f, "Send Timeout (s)", &self.smtp.timeout_seconds)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/sitewatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```ignore
    /// let cfg = config::Config::from_config(None::<&path::Path>)?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        let write_failed =
            |source: std::io::Error| ConfigError::WriteFailed { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        fs::write(path, config_str).map_err(write_failed)
    }

    /// Apply `SITEWATCH_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; unset keys leave the value alone.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let parse_number = |key: &str, raw: String| -> Result<u64, ConfigError> {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{key} must be a number, got {raw:?}")))
        };

        if let Some(v) = lookup("SITEWATCH_URL_FILE") {
            self.monitor.url_file = v.into();
        }
        if let Some(v) = lookup("SITEWATCH_LOG_FILE") {
            self.monitor.log_file = v.into();
        }
        if let Some(v) = lookup("SITEWATCH_INTERVAL_SECONDS") {
            self.monitor.interval_seconds = parse_number("SITEWATCH_INTERVAL_SECONDS", v)?;
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_SERVER") {
            self.smtp.server = v;
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_PORT") {
            let port = parse_number("SITEWATCH_SMTP_PORT", v)?;
            self.smtp.port = u16::try_from(port)
                .map_err(|_| ConfigError::Invalid(format!("SMTP port out of range: {port}")))?;
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_SENDER") {
            self.smtp.sender = v;
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_RECEIVER") {
            self.smtp.receiver = v;
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_USERNAME") {
            self.smtp.username = Some(v);
        }
        if let Some(v) = lookup("SITEWATCH_SMTP_PASSWORD") {
            self.smtp.password = Some(v);
        }

        Ok(())
    }

    /// Reject values the monitor loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_check_interval(self.monitor.interval_seconds)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_timeout(self.monitor.timeout_seconds)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_timeout(self.smtp.timeout_seconds)
            .map_err(|e| ConfigError::Invalid(format!("SMTP {e}")))?;
        if self.smtp.port == 0 {
            return Err(ConfigError::Invalid("SMTP port must not be 0".into()));
        }
        Ok(())
    }
}
