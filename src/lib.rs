//! # quotawatch
//!
//! A terminal console and library for storage quota and capacity monitoring.
//!
//! The crate polls a storage console backend for host utilisation, filesystem
//! usage, per-account quotas and quota policies, normalises everything into
//! byte counts and severity levels, and renders it in an interactive terminal
//! UI that keeps refreshing on its own.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ┌───────────┐   fetch    ┌──────────────┐   put    ┌─────────┐  │
//! │  │ scheduler │──────────▶ │ ConsoleClient│          │  store  │  │
//! │  │ (cycles)  │◀────────── │  (adapters)  │          │         │  │
//! │  └─────┬─────┘  payload   └──────────────┘          └────▲────┘  │
//! │        │ put_if_newer ─────────────────────────────────────┘     │
//! │        ▼ RenderSink                                        │     │
//! │  ┌───────────┐  SinkEvent  ┌─────────┐  read   ┌──────────┴──┐  │
//! │  │  source   │───────────▶ │   app   │───────▶ │     ui      │  │
//! │  │ (channel) │             │ (state) │         │ (ratatui)   │  │
//! │  └───────────┘             └─────────┘         └─────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: size parsing, quota evaluation, policy resolution, ranking,
//!   chart descriptions and usage history
//! - **[`store`]**: the last good [`MetricSnapshot`] per [`MetricCategory`]
//! - **[`scheduler`]**: per-view refresh cycles ([`RefreshScheduler`])
//! - **[`source`]**: the [`DataSource`] the TUI drains scheduler events from
//! - **[`app`]**, **[`ui`]**, **[`events`]**: the terminal front end
//! - **[`config`]**: layered [`Settings`]
//! - **[`export`]**: JSON reports
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default backend (http://127.0.0.1:5000/api)
//! quotawatch
//!
//! # Another backend, faster monitoring refresh
//! quotawatch --endpoint http://storage01:5000/api --refresh 2
//!
//! # One-shot JSON report
//! quotawatch --export report.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quotawatch::scheduler::ConsoleFetcher;
//! use quotawatch::{App, ChannelSource, RefreshScheduler, SnapshotStore, View};
//! use quotawatch_adapters::ConsoleClient;
//!
//! # fn main() -> anyhow::Result<()> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let client = ConsoleClient::builder().build()?;
//! let store = Arc::new(SnapshotStore::new());
//! let scheduler = RefreshScheduler::new(
//!     runtime.handle().clone(),
//!     Arc::new(ConsoleFetcher::new(client, 10)),
//!     Arc::clone(&store),
//! );
//!
//! let (sink, source) = ChannelSource::create("http://127.0.0.1:5000/api");
//! let settings = quotawatch::Settings::default();
//! let _guard = scheduler.mount(
//!     View::Quotas.id(),
//!     View::Quotas.cycle_config(&settings),
//!     Box::new(sink),
//! );
//!
//! let mut app = App::new(Box::new(source), store);
//! app.process_events();
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod ui;

pub use app::{App, View};
pub use config::Settings;
pub use data::{Consumer, MetricPayload, Policy, PolicyBook, QuotaReport, QuotaStatus, Severity};
pub use error::{FetchError, PolicyError};
pub use scheduler::{CycleConfig, MetricFetcher, RefreshScheduler, RenderSink, ViewGuard, ViewId};
pub use source::{ChannelSink, ChannelSource, DataSource};
pub use store::{MetricCategory, MetricSnapshot, SnapshotStore};
