//! Host and storage monitoring responses.

use serde::{Deserialize, Serialize};

/// `GET /monitoring/storage`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<FilesystemEntry>,
    #[serde(
        rename = "topConsumers",
        alias = "top_users",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub top_consumers: Option<Vec<ConsumerUsageEntry>>,
}

/// `df`-style filesystem usage. Sizes are human-readable strings (`"100G"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilesystemEntry {
    /// Device or filesystem name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<String>,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub used: String,
    #[serde(default)]
    pub available: String,
    /// Usage percentage string, e.g. `"45%"`.
    #[serde(default)]
    pub percentage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    /// Set instead of the size fields when the backend could not run `df`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Usage of one consumer in the top-consumer list, in megabytes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumerUsageEntry {
    #[serde(alias = "username")]
    pub identity: String,
    #[serde(rename = "usedMB", alias = "used_mb", default)]
    pub used_mb: f64,
}

/// `GET /monitoring/system`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SystemMetrics>,
}

/// Host metrics sampled by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu: PercentEntry,
    pub memory: PercentEntry,
    pub disk: PercentEntry,
    #[serde(
        rename = "loadAverage",
        alias = "load_average",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub load_average: Option<LoadAverage>,
}

/// A utilisation percentage. Extra fields (totals, counts) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentEntry {
    pub percent: f64,
}

/// 1, 5 and 15 minute load averages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadAverage {
    #[serde(rename = "1min")]
    pub one: f64,
    #[serde(rename = "5min")]
    pub five: f64,
    #[serde(rename = "15min")]
    pub fifteen: f64,
}

/// `GET /monitoring/services`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServicesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

/// Status of one platform service (`smbd`, `nfs-server`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    /// `running`, `stopped` or `unknown`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub active: bool,
}
