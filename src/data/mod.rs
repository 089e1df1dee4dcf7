//! Data models and processing for quota and capacity metrics.
//!
//! This module turns raw backend responses into canonical, severity-tagged
//! data suitable for display.
//!
//! ## Submodules
//!
//! - [`size`]: Parsing of human-readable sizes ("100G", "1.5T") into byte counts
//! - [`quota`]: Percentage-used and [`Severity`] classification
//! - [`policy`]: Named quota policies and default resolution ([`PolicyBook`])
//! - [`ranking`]: Top-N consumers by usage
//! - [`metrics`]: Per-category payloads ([`MetricPayload`])
//! - [`chart`]: Declarative chart descriptions for the renderer
//! - [`history`]: Historical tracking for sparklines and growth rates
//!
//! ## Data Flow
//!
//! ```text
//! backend response (JSON)
//!        │
//!        ▼
//! size / policy / quota ──▶ MetricPayload ──▶ SnapshotStore
//!                              │
//!                              ├──▶ ranking (top-N)
//!                              └──▶ History::record_quotas() (for sparklines)
//! ```

pub mod chart;
pub mod consumer;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod quota;
pub mod ranking;
pub mod size;

pub use chart::{ChartKind, ChartPoint, ChartSpec};
pub use consumer::Consumer;
pub use history::History;
pub use metrics::{
    unquoted_accounts, AccountSummary, FilesystemUsage, MetricPayload, QuotaRow, ServiceState,
    ServiceStatus, UsageGauge,
};
pub use policy::{Limits, Policy, PolicyBook};
pub use quota::{assess, evaluate, QuotaNotice, QuotaReport, QuotaStatus, Severity};
pub use ranking::{rank, top_n, RankedConsumer, TopN};
pub use size::{format_bytes, parse_size, SizeQuantity, SizeUnit};
