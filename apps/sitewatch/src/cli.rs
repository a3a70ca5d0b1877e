use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Config;
use crate::journal::ResultLog;
use crate::monitoring::{MonitoringExecutor, MonitoringScheduler};
use crate::notify::SmtpNotifier;
use crate::store::UrlStore;
use crate::validation::validate_url;

#[derive(Debug, Parser)]
#[command(name = "sitewatch", version, about = "Watch websites and mail an alert when one goes down")]
pub struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/sitewatch/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the URL list file
    #[arg(long, global = true)]
    pub url_file: Option<PathBuf>,

    /// Override the result log file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Debug-level console output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Monitor until interrupted (default)
    Run,
    /// Run a single check cycle and exit
    Check,
    /// Add a URL to the store
    Add { url: String },
    /// Remove a URL from the store
    Remove { url: String },
    /// List stored URLs
    List,
    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Load the config file, then apply environment and flag overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::from_config(self.config.as_ref())?;
        config.apply_env_overrides()?;

        if let Some(path) = &self.url_file {
            config.monitor.url_file = path.clone();
        }
        if let Some(path) = &self.log_file {
            config.monitor.log_file = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn execute(command: Command, config: Config) -> Result<()> {
    let store = UrlStore::new(&config.monitor.url_file);

    match command {
        Command::Run => run(config, store).await,
        Command::Check => {
            let report = build_scheduler(&config, store)?.run_cycle().await;
            println!(
                "Checked {} URL(s): {} down, {} alert(s) sent, {} alert(s) failed",
                report.checked, report.down, report.notified, report.notify_failed
            );
            Ok(())
        }
        Command::Add { url } => {
            let url = validate_url(&url)?;
            if store.add(url.as_str())? {
                println!("Added {url}");
            } else {
                println!("{url} is already monitored");
            }
            Ok(())
        }
        Command::Remove { url } => {
            let typed = url.trim();
            // `add` stores the parsed form; hand-edited entries may be stored as typed.
            let parsed = validate_url(typed).ok();
            let mut forms = vec![typed];
            if let Some(parsed) = parsed.as_ref() {
                forms.push(parsed.as_str());
            }

            match store.remove_any(&forms)? {
                0 => println!("{typed} is not in the URL list"),
                n => println!("Removed {} ({} entr{})", typed, n, if n == 1 { "y" } else { "ies" }),
            }
            Ok(())
        }
        Command::List => {
            let urls = store.load()?;
            if urls.is_empty() {
                println!("No URLs configured in {}", store.path().display());
            }
            for url in urls {
                println!("{url}");
            }
            Ok(())
        }
        Command::Config => {
            print!("{config}");
            Ok(())
        }
    }
}

fn build_scheduler(config: &Config, store: UrlStore) -> Result<MonitoringScheduler> {
    let executor = MonitoringExecutor::new(config.monitor.timeout_seconds)
        .context("failed to build HTTP client")?;

    Ok(MonitoringScheduler::new(
        store,
        Arc::new(executor),
        Arc::new(SmtpNotifier::new()),
        config.smtp.clone(),
        Arc::new(ResultLog::new(&config.monitor.log_file)),
        Duration::from_secs(config.monitor.interval_seconds),
    ))
}

async fn run(config: Config, store: UrlStore) -> Result<()> {
    if let Err(e) = store.ensure_exists() {
        warn!("Error saving URLs: {}", e);
    }
    if config.smtp.password.is_none() {
        warn!("No SMTP password configured; alerts for down sites will fail");
    }

    let scheduler = build_scheduler(&config, store)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown requested, stopping after the current cycle");
        let _ = shutdown_tx.send(true);
    });

    info!(
        url_file = %config.monitor.url_file.display(),
        log_file = %config.monitor.log_file.display(),
        interval_seconds = config.monitor.interval_seconds,
        "Starting website monitoring..."
    );
    scheduler.run(shutdown_rx).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
