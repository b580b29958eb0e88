use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// One named check inside a [`HealthReport`].
#[derive(Debug, Clone, Serialize)]
pub struct HealthEntry {
    pub status: HealthStatus,
    pub description: Option<String>,
    /// Elapsed time as `hh:mm:ss.fffffff`.
    pub duration: String,
    pub data: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub results: BTreeMap<String, HealthEntry>,
}

impl HealthReport {
    /// Overall status is healthy only if every entry is.
    pub fn from_entries(results: BTreeMap<String, HealthEntry>) -> Self {
        let status = if results.values().all(|e| e.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        Self { status, results }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersion {
    pub name: String,
    pub current_version: String,
    pub environment: String,
    pub os_version: String,
    pub dockerized: bool,
}

/// Format a duration as `hh:mm:ss.fffffff` (100ns ticks).
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let ticks = elapsed.subsec_nanos() / 100;
    format!(
        "{:02}:{:02}:{:02}.{:07}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        ticks
    )
}
