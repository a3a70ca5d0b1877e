/// Monitoring engine module - liveness checks and the monitor loop
///
/// This module is responsible for:
/// - Probing a URL over HTTP and classifying it as live or down
/// - Running the periodic cycle over the URL store
/// - Logging every result and alerting on down sites
pub mod checker;
pub mod executor;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod tests;

pub use executor::MonitoringExecutor;
pub use scheduler::{CycleReport, MonitoringScheduler};
