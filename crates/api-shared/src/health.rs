use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health-check response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    /// Always `"healthy"` while the process is serving.
    pub status: String,
    /// Name of the bot this process runs.
    pub bot: String,
    /// UTC time the response was generated, ISO-8601.
    pub timestamp: String,
    /// Size of the message handler pool.
    pub workers: usize,
}

/// Health service shared by the standalone health server and the combined binary.
///
/// Holds the values reported on every check so handlers do not read configuration.
#[derive(Clone, Debug)]
pub struct HealthService {
    bot: String,
    workers: usize,
}

impl HealthService {
    /// Creates a health service for the converter bot reporting `workers` handlers.
    pub fn new(workers: usize) -> Self {
        Self {
            bot: "converter".into(),
            workers,
        }
    }

    /// Build a health response stamped with the current time.
    pub fn check_health(&self) -> HealthRes {
        HealthRes {
            status: "healthy".into(),
            bot: self.bot.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            workers: self.workers,
        }
    }
}
