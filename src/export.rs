//! JSON report of the current console state.
//!
//! Used by `--export` (one fetch of every category, then exit) and by the
//! `e` key in the TUI (whatever the store holds right now).
//!
//! `--export` runs without a refresh scheduler. There [`fetch_all`] is the
//! only writer to its store, which is built for that one report and dropped
//! after it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::data::{
    AccountSummary, FilesystemUsage, MetricPayload, Policy, QuotaRow, RankedConsumer,
    ServiceState, Severity, UsageGauge,
};
use crate::scheduler::MetricFetcher;
use crate::store::{MetricCategory, SnapshotStore};

/// Consumers per severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub total: usize,
    pub ok: usize,
    pub warning: usize,
    pub critical: usize,
    pub over_limit: usize,
}

impl SeveritySummary {
    pub fn from_rows(rows: &[QuotaRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.report.status.severity {
                Severity::Ok => summary.ok += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Critical => summary.critical += 1,
                Severity::OverLimit => summary.over_limit += 1,
            }
        }
        summary
    }

    /// The worst severity present, `Ok` when empty.
    pub fn worst(&self) -> Severity {
        if self.over_limit > 0 {
            Severity::OverLimit
        } else if self.critical > 0 {
            Severity::Critical
        } else if self.warning > 0 {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFailure {
    pub category: MetricCategory,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub summary: SeveritySummary,
    pub quotas: Vec<QuotaRow>,
    pub top_consumers: Vec<RankedConsumer>,
    pub filesystem: Option<FilesystemUsage>,
    pub gauges: BTreeMap<MetricCategory, UsageGauge>,
    pub services: Vec<ServiceState>,
    pub policies: Vec<Policy>,
    /// Every account the backend knows, with or without a quota.
    pub accounts: Vec<AccountSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CategoryFailure>,
}

impl Report {
    /// Build a report from the latest snapshots.
    pub fn from_store(store: &SnapshotStore) -> Self {
        let mut report = Report::default();

        for category in store.categories() {
            let Some(snapshot) = store.get(category) else {
                continue;
            };
            match &*snapshot.payload {
                MetricPayload::Gauge(gauge) => {
                    report.gauges.insert(category, *gauge);
                }
                MetricPayload::Services(services) => report.services = services.clone(),
                MetricPayload::Storage(fs) => report.filesystem = Some(fs.clone()),
                MetricPayload::TopConsumers(ranked) => report.top_consumers = ranked.clone(),
                MetricPayload::Quotas(rows) => report.quotas = rows.clone(),
                MetricPayload::Policies(policies) => report.policies = policies.clone(),
                MetricPayload::Accounts(accounts) => report.accounts = accounts.clone(),
            }
        }

        report.summary = SeveritySummary::from_rows(&report.quotas);
        report
    }

    pub fn is_empty(&self) -> bool {
        self.quotas.is_empty()
            && self.top_consumers.is_empty()
            && self.filesystem.is_none()
            && self.gauges.is_empty()
            && self.services.is_empty()
            && self.policies.is_empty()
            && self.accounts.is_empty()
    }
}

/// Fetch every category once, concurrently, into `store`.
///
/// Only for a store no scheduler writes to. Returns the categories that
/// failed; their previous snapshots are kept.
pub async fn fetch_all(
    fetcher: Arc<dyn MetricFetcher>,
    store: &SnapshotStore,
) -> Vec<CategoryFailure> {
    let mut tasks = JoinSet::new();
    for category in MetricCategory::ALL {
        let fetcher = Arc::clone(&fetcher);
        tasks.spawn(async move { (category, fetcher.fetch(category).await) });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((category, Ok(payload))) => {
                debug!(%category, "fetched for export");
                store.put(category, payload);
            }
            Ok((category, Err(err))) => failures.push(CategoryFailure {
                category,
                message: err.to_string(),
            }),
            Err(err) => warn!(error = %err, "export fetch task failed"),
        }
    }
    failures.sort_by_key(|f| f.category);
    failures
}

/// Write `report` as pretty-printed JSON.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
