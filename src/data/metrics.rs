//! Normalized payloads built from backend responses.
//!
//! Every conversion here turns a wire response into canonical units (bytes,
//! percentages with a [`Severity`]) so renderers never parse or classify.

use std::collections::HashSet;

use serde::Serialize;

use quotawatch_types::{
    AccountsResponse, LoadAverage, QuotaEntry, QuotasResponse, ServicesResponse, StorageResponse,
    SystemResponse,
};

use super::consumer::Consumer;
use super::policy::{Policy, PolicyBook};
use super::quota::{assess, QuotaReport, Severity};
use super::ranking::{rank, RankedConsumer};
use super::size::{megabytes_to_bytes, parse_percentage, size_to_bytes};
use crate::error::{FetchError, PolicyError};
use crate::store::MetricCategory;

/// Payload held by a snapshot, one variant per kind of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum MetricPayload {
    Gauge(UsageGauge),
    Services(Vec<ServiceState>),
    Storage(FilesystemUsage),
    TopConsumers(Vec<RankedConsumer>),
    Quotas(Vec<QuotaRow>),
    Policies(Vec<Policy>),
    Accounts(Vec<AccountSummary>),
}

/// A host utilisation gauge (cpu, memory or disk).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageGauge {
    pub percent: f64,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_average: Option<LoadAverage>,
}

impl UsageGauge {
    pub fn new(percent: f64, load_average: Option<LoadAverage>) -> Self {
        Self {
            percent,
            severity: Severity::classify(percent),
            load_average,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Unknown,
}

impl ServiceStatus {
    fn parse(status: &str, active: bool) -> Self {
        match status {
            "running" => ServiceStatus::Running,
            "stopped" => ServiceStatus::Stopped,
            _ if active => ServiceStatus::Running,
            _ => ServiceStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceState {
    pub name: String,
    pub status: ServiceStatus,
}

/// Filesystem usage with canonical byte counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilesystemUsage {
    pub filesystem: Option<String>,
    pub mountpoint: Option<String>,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    pub percentage: f64,
    pub severity: Severity,
}

/// One row of the quota table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaRow {
    pub consumer: Consumer,
    pub report: QuotaReport,
    /// Grace period reported by the backend, if any.
    pub grace: Option<String>,
    /// True when the limits come from the default policy.
    pub inherited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub identity: String,
    pub usage: Option<u64>,
}

/// Build the gauge for `category` from a system response.
pub fn gauge_from_system(
    response: &SystemResponse,
    category: MetricCategory,
) -> Result<UsageGauge, FetchError> {
    let metrics = response
        .metrics
        .as_ref()
        .ok_or(FetchError::MissingField("metrics"))?;

    let gauge = match category {
        MetricCategory::Cpu => UsageGauge::new(metrics.cpu.percent, metrics.load_average),
        MetricCategory::Memory => UsageGauge::new(metrics.memory.percent, None),
        MetricCategory::Disk => UsageGauge::new(metrics.disk.percent, None),
        _ => return Err(FetchError::MissingField("gauge category")),
    };
    Ok(gauge)
}

pub fn services_from(response: ServicesResponse) -> Vec<ServiceState> {
    response
        .services
        .into_iter()
        .map(|s| ServiceState {
            status: ServiceStatus::parse(&s.status, s.active),
            name: s.name,
        })
        .collect()
}

/// Filesystem usage from the storage endpoint.
///
/// A filesystem entry carrying an `error` is a failed fetch, not zeros.
pub fn filesystem_from(response: &StorageResponse) -> Result<FilesystemUsage, FetchError> {
    let fs = response
        .filesystem
        .as_ref()
        .ok_or(FetchError::MissingField("filesystem"))?;

    if let Some(err) = &fs.error {
        return Err(FetchError::Backend(err.clone()));
    }

    let percentage = parse_percentage(&fs.percentage);
    Ok(FilesystemUsage {
        filesystem: fs.filesystem.clone(),
        mountpoint: fs.mountpoint.clone(),
        size: size_to_bytes(&fs.size),
        used: size_to_bytes(&fs.used),
        available: size_to_bytes(&fs.available),
        percentage,
        severity: Severity::classify(percentage),
    })
}

/// Ranked top consumers from the storage endpoint.
pub fn top_consumers_from(
    response: &StorageResponse,
    n: usize,
) -> Result<Vec<RankedConsumer>, FetchError> {
    let entries = response
        .top_consumers
        .as_ref()
        .ok_or(FetchError::MissingField("topConsumers"))?;

    let consumers: Vec<Consumer> = entries
        .iter()
        .map(|e| Consumer::new(e.identity.clone(), megabytes_to_bytes(e.used_mb)))
        .collect();
    Ok(rank(&consumers, n))
}

/// Build a consumer from a backend row.
///
/// A row whose soft limit exceeds its hard limit is rejected, not clamped.
fn consumer_from(entry: &QuotaEntry) -> Result<Consumer, PolicyError> {
    let limit = |mb: f64| Some(megabytes_to_bytes(mb)).filter(|&b| b > 0);
    let consumer = Consumer::new(entry.identity.clone(), megabytes_to_bytes(entry.used_mb));
    match (limit(entry.soft_limit_mb), limit(entry.hard_limit_mb)) {
        (Some(soft), Some(hard)) => consumer.with_limits(soft, hard),
        (None, Some(hard)) => Ok(consumer.with_hard_limit(hard)),
        (_, None) => Ok(consumer),
    }
}

/// Evaluate every quota against its effective limits.
///
/// Rows are ordered most severe first, then by identity. One row with an
/// inverted limit pair fails the whole snapshot.
pub fn quota_rows(
    response: QuotasResponse,
    book: &PolicyBook,
) -> Result<Vec<QuotaRow>, PolicyError> {
    let mut rows = Vec::with_capacity(response.quotas.len());
    for entry in &response.quotas {
        let consumer = consumer_from(entry)?;
        let limits = book.effective_limits(&consumer);
        rows.push(QuotaRow {
            report: assess(&consumer, limits),
            inherited: consumer.limits().is_none() && limits.is_some(),
            grace: entry.grace.clone(),
            consumer,
        });
    }

    rows.sort_by(|a, b| {
        b.report
            .status
            .severity
            .cmp(&a.report.status.severity)
            .then_with(|| a.consumer.identity.cmp(&b.consumer.identity))
    });
    Ok(rows)
}

pub fn accounts_from(response: AccountsResponse) -> Vec<AccountSummary> {
    response
        .accounts
        .into_iter()
        .map(|a| AccountSummary {
            usage: a.usage.as_deref().map(size_to_bytes),
            identity: a.identity,
        })
        .collect()
}

/// Accounts with no quota row, in identity order.
pub fn unquoted_accounts(accounts: &[AccountSummary], rows: &[QuotaRow]) -> Vec<AccountSummary> {
    let quoted: HashSet<&str> = rows.iter().map(|r| r.consumer.identity.as_str()).collect();
    let mut unquoted: Vec<AccountSummary> = accounts
        .iter()
        .filter(|a| !quoted.contains(a.identity.as_str()))
        .cloned()
        .collect();
    unquoted.sort_by(|a, b| a.identity.cmp(&b.identity));
    unquoted
}
