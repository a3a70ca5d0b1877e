use std::env::var;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the console log, selected with `RUST_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (case-insensitive) falls back to compact.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") { Self::Json } else { Self::Compact }
    }

    fn from_env() -> Self {
        var("RUST_LOG_FORMAT").map(|raw| Self::parse(&raw)).unwrap_or_default()
    }
}

pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// `verbose` raises the default directive to DEBUG; `RUST_LOG` still wins.
pub fn init_verbose(verbose: bool) {
    init_with_level(if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO });
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_layer = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
    };

    let _ = tracing_subscriber::registry().with(log_layer).try_init();
}
