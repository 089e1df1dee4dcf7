//! Application state and navigation logic.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::Settings;
use crate::data::{unquoted_accounts, AccountSummary, History, MetricPayload, Policy, QuotaRow};
use crate::export::{write_report, Report};
use crate::scheduler::{CycleConfig, CycleState, SinkEvent, ViewId};
use crate::source::DataSource;
use crate::store::{MetricCategory, MetricSnapshot, SnapshotStore};
use crate::ui::quotas::{sort_rows_by, QuotaSortColumn};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Quota detail is an overlay (`App::show_detail_overlay`), not a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Host gauges, services, filesystem and top consumers.
    Monitoring,
    /// Per-consumer quota table.
    Quotas,
    Policies,
}

impl View {
    pub const ALL: [View; 3] = [View::Monitoring, View::Quotas, View::Policies];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Monitoring => View::Quotas,
            View::Quotas => View::Policies,
            View::Policies => View::Monitoring,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Monitoring => View::Policies,
            View::Quotas => View::Monitoring,
            View::Policies => View::Quotas,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Monitoring => "Monitoring",
            View::Quotas => "Quotas",
            View::Policies => "Policies",
        }
    }

    /// Name the view is mounted under in the scheduler.
    pub fn id(&self) -> ViewId {
        ViewId(self.label())
    }

    /// Categories refreshed while this view is mounted.
    pub fn categories(&self) -> Vec<MetricCategory> {
        match self {
            View::Monitoring => vec![
                MetricCategory::Cpu,
                MetricCategory::Memory,
                MetricCategory::Disk,
                MetricCategory::Services,
                MetricCategory::Storage,
                MetricCategory::TopConsumers,
            ],
            View::Quotas => vec![MetricCategory::Quotas, MetricCategory::Accounts],
            View::Policies => vec![MetricCategory::Policies],
        }
    }

    pub fn interval(&self, settings: &Settings) -> Duration {
        match self {
            View::Monitoring => settings.monitoring_interval(),
            View::Quotas | View::Policies => settings.quota_interval(),
        }
    }

    pub fn cycle_config(&self, settings: &Settings) -> CycleConfig {
        CycleConfig::new(self.interval(settings), self.categories())
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data
    source: Box<dyn DataSource>,
    store: Arc<SnapshotStore>,
    pub history: History,
    /// Last failure per category, cleared by the next successful render.
    pub notices: BTreeMap<MetricCategory, String>,
    /// Seconds until the mounted view refreshes.
    pub countdown: Option<u32>,
    pub last_round: Option<CycleState>,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,
    refresh_requested: bool,

    // Navigation
    pub selected_index: usize,

    // Sorting (Quotas view)
    pub sort_column: QuotaSortColumn,
    pub sort_ascending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, store: Arc<SnapshotStore>) -> Self {
        Self::with_theme(source, store, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, store: Arc<SnapshotStore>, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Monitoring,
            show_help: false,
            show_detail_overlay: false,
            source,
            store,
            history: History::new(),
            notices: BTreeMap::new(),
            countdown: None,
            last_round: None,
            last_updated: None,
            load_error: None,
            refresh_requested: false,
            selected_index: 0,
            sort_column: QuotaSortColumn::default(),
            // Most severe first.
            sort_ascending: false,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message, unless it has expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Drain pending scheduler events.
    ///
    /// Returns true if anything changed.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.source.poll() {
            self.apply_event(event);
            changed = true;
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
        }
        if changed {
            self.clamp_selection();
        }
        changed
    }

    fn apply_event(&mut self, event: SinkEvent) {
        match event {
            SinkEvent::Rendered(snapshot) => {
                self.notices.remove(&snapshot.category);
                self.record_history(&snapshot);
                self.last_updated = Some(snapshot.captured_at);
                self.load_error = None;
            }
            SinkEvent::FetchFailed { category, message } => {
                self.notices.insert(category, message);
            }
            SinkEvent::Countdown(remaining) => self.countdown = Some(remaining),
            SinkEvent::RoundFinished(state) => self.last_round = Some(state),
        }
    }

    fn record_history(&mut self, snapshot: &MetricSnapshot) {
        match &*snapshot.payload {
            MetricPayload::Quotas(rows) => self.history.record_quotas(rows, snapshot.captured_at),
            MetricPayload::Gauge(gauge) => self.history.record_gauge(snapshot.category, gauge.percent),
            _ => {}
        }
    }

    pub fn snapshot(&self, category: MetricCategory) -> Option<MetricSnapshot> {
        self.store.get(category)
    }

    /// Failure notice for `category`, if its last refresh failed.
    pub fn notice(&self, category: MetricCategory) -> Option<&str> {
        self.notices.get(&category).map(String::as_str)
    }

    /// Failure notices for the categories of the current view.
    pub fn current_notices(&self) -> Vec<(MetricCategory, &str)> {
        self.current_view
            .categories()
            .into_iter()
            .filter_map(|c| self.notice(c).map(|n| (c, n)))
            .collect()
    }

    /// Every quota row, unfiltered. `None` before the first quota snapshot.
    pub fn quota_rows(&self) -> Option<Vec<QuotaRow>> {
        match &*self.store.get(MetricCategory::Quotas)?.payload {
            MetricPayload::Quotas(rows) => Some(rows.clone()),
            _ => None,
        }
    }

    pub fn quota_count(&self) -> Option<usize> {
        self.quota_rows().map(|rows| rows.len())
    }

    /// Quota rows after filtering and sorting, in display order.
    pub fn visible_quota_rows(&self) -> Vec<QuotaRow> {
        let mut rows: Vec<QuotaRow> = self
            .quota_rows()
            .unwrap_or_default()
            .into_iter()
            .filter(|r| self.matches_filter(&r.consumer.identity))
            .collect();
        sort_rows_by(&mut rows, self.sort_column, self.sort_ascending);
        rows
    }

    pub fn accounts(&self) -> Option<Vec<AccountSummary>> {
        match &*self.store.get(MetricCategory::Accounts)?.payload {
            MetricPayload::Accounts(accounts) => Some(accounts.clone()),
            _ => None,
        }
    }

    /// Accounts with no quota row, after filtering.
    pub fn visible_unquoted_accounts(&self) -> Vec<AccountSummary> {
        let accounts = self.accounts().unwrap_or_default();
        let rows = self.quota_rows().unwrap_or_default();
        unquoted_accounts(&accounts, &rows)
            .into_iter()
            .filter(|a| self.matches_filter(&a.identity))
            .collect()
    }

    pub fn policies(&self) -> Option<Vec<Policy>> {
        match &*self.store.get(MetricCategory::Policies)?.payload {
            MetricPayload::Policies(policies) => Some(policies.clone()),
            _ => None,
        }
    }

    pub fn visible_policies(&self) -> Vec<Policy> {
        self.policies()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| self.matches_filter(&p.name))
            .collect()
    }

    /// The quota row under the cursor.
    pub fn selected_quota(&self) -> Option<QuotaRow> {
        self.visible_quota_rows().into_iter().nth(self.selected_index)
    }

    /// Number of selectable rows in the current view.
    pub fn list_len(&self) -> usize {
        match self.current_view {
            View::Monitoring => 0,
            View::Quotas => self.visible_quota_rows().len(),
            View::Policies => self.visible_policies().len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.list_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    /// Switch to the next view (Monitoring → Quotas → Policies).
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view. The caller remounts the refresh cycle.
    pub fn set_view(&mut self, view: View) {
        if view != self.current_view {
            self.current_view = view;
            self.selected_index = 0;
            self.countdown = None;
            self.last_round = None;
            self.show_detail_overlay = false;
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.list_len().saturating_sub(1);
    }

    /// Select a row by its visual position, ignoring positions past the end.
    pub fn select_row(&mut self, row: usize) {
        if row < self.list_len() {
            self.selected_index = row;
        }
    }

    /// Open the detail overlay for the selected quota.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Quotas && self.selected_quota().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Close an open overlay, otherwise return to the monitoring view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else {
            self.set_view(View::Monitoring);
        }
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Quotas {
            self.sort_column = self.sort_column.next();
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Quotas {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    /// Enter filter input mode.
    pub fn start_filter(&mut self) {
        if self.current_view != View::Monitoring {
            self.filter_active = true;
        }
    }

    /// Exit filter input mode, keeping the text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Case-insensitive substring match against the filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Ask the main loop to refresh the current view now.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Take a pending refresh request, if any.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the stored snapshots to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let mut report = Report::from_store(&self.store);
        if report.is_empty() {
            anyhow::bail!("No data to export");
        }
        report.failures = self
            .notices
            .iter()
            .map(|(&category, message)| crate::export::CategoryFailure {
                category,
                message: message.clone(),
            })
            .collect();
        write_report(&report, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{assess, Consumer, Limits, UsageGauge};
    use crate::error::FetchError;
    use crate::scheduler::RenderSink;
    use crate::source::{ChannelSink, ChannelSource};
    use quotawatch_adapters::AdapterError;

    fn row(identity: &str, used: u64) -> QuotaRow {
        let consumer = Consumer::new(identity, used);
        QuotaRow {
            report: assess(&consumer, Limits::new(500, 1000).ok()),
            consumer,
            grace: None,
            inherited: true,
        }
    }

    fn app() -> (App, ChannelSink, Arc<SnapshotStore>) {
        let store = Arc::new(SnapshotStore::new());
        let (sink, source) = ChannelSource::create("test");
        let app = App::with_theme(Box::new(source), Arc::clone(&store), Theme::dark());
        (app, sink, store)
    }

    fn publish_quotas(sink: &mut ChannelSink, store: &SnapshotStore, rows: Vec<QuotaRow>) {
        let snapshot = store.put(MetricCategory::Quotas, MetricPayload::Quotas(rows));
        sink.render(MetricCategory::Quotas, &snapshot);
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Monitoring.next(), View::Quotas);
        assert_eq!(View::Monitoring.prev(), View::Policies);
        for view in View::ALL {
            assert_eq!(view.next().prev(), view);
        }
    }

    #[test]
    fn test_view_intervals() {
        let settings = Settings::default();
        assert_eq!(View::Monitoring.interval(&settings), Duration::from_secs(5));
        assert_eq!(View::Policies.interval(&settings), Duration::from_secs(30));
        assert!(View::Quotas.categories().contains(&MetricCategory::Quotas));
        assert_eq!(View::Quotas.id(), ViewId("Quotas"));
    }

    #[test]
    fn test_failure_notice_cleared_by_render() {
        let (mut app, mut sink, store) = app();
        app.set_view(View::Quotas);

        sink.fetch_failed(MetricCategory::Quotas, &FetchError::from(AdapterError::Timeout));
        assert!(app.process_events());
        assert_eq!(app.notice(MetricCategory::Quotas), Some("Request timed out"));
        assert_eq!(app.current_notices().len(), 1);

        publish_quotas(&mut sink, &store, vec![row("alice", 100)]);
        app.process_events();
        assert!(app.notice(MetricCategory::Quotas).is_none());
        assert!(app.last_updated.is_some());
    }

    #[test]
    fn test_failure_keeps_last_rows() {
        let (mut app, mut sink, store) = app();
        publish_quotas(&mut sink, &store, vec![row("alice", 100)]);
        sink.fetch_failed(MetricCategory::Quotas, &FetchError::MissingField("quotas"));
        app.process_events();

        assert_eq!(app.quota_count(), Some(1));
        assert!(app.notice(MetricCategory::Quotas).is_some());
    }

    #[test]
    fn test_history_recorded_from_snapshots() {
        let (mut app, mut sink, store) = app();
        publish_quotas(&mut sink, &store, vec![row("alice", 100)]);
        publish_quotas(&mut sink, &store, vec![row("alice", 300)]);
        let gauge = store.put(
            MetricCategory::Cpu,
            MetricPayload::Gauge(UsageGauge::new(40.0, None)),
        );
        sink.render(MetricCategory::Cpu, &gauge);
        app.process_events();

        assert_eq!(app.history.consumer_usage["alice"].len(), 2);
        assert_eq!(app.history.gauge_series(MetricCategory::Cpu), vec![40]);
    }

    #[test]
    fn test_countdown_and_round_state() {
        let (mut app, mut sink, _store) = app();
        sink.countdown(7);
        sink.round_finished(CycleState::Failed);
        app.process_events();
        assert_eq!(app.countdown, Some(7));
        assert_eq!(app.last_round, Some(CycleState::Failed));

        app.set_view(View::Policies);
        assert_eq!(app.countdown, None);
    }

    #[test]
    fn test_filter_and_sort() {
        let (mut app, mut sink, store) = app();
        publish_quotas(
            &mut sink,
            &store,
            vec![row("alice", 100), row("bob", 900), row("alan", 700)],
        );
        app.process_events();
        app.set_view(View::Quotas);

        let order: Vec<String> = app
            .visible_quota_rows()
            .into_iter()
            .map(|r| r.consumer.identity)
            .collect();
        assert_eq!(order, vec!["bob", "alan", "alice"]);

        app.start_filter();
        app.filter_push('A');
        app.filter_push('l');
        assert_eq!(app.visible_quota_rows().len(), 2);
        assert_eq!(app.list_len(), 2);

        app.clear_filter();
        assert_eq!(app.list_len(), 3);
    }

    #[test]
    fn test_unquoted_accounts_visible() {
        let (mut app, mut sink, store) = app();
        publish_quotas(&mut sink, &store, vec![row("alice", 100)]);
        store.put(
            MetricCategory::Accounts,
            MetricPayload::Accounts(vec![
                AccountSummary { identity: "alice".into(), usage: Some(100) },
                AccountSummary { identity: "bob".into(), usage: Some(2 << 30) },
                AccountSummary { identity: "carl".into(), usage: None },
            ]),
        );
        app.process_events();
        app.set_view(View::Quotas);

        let names = |app: &App| -> Vec<String> {
            app.visible_unquoted_accounts().into_iter().map(|a| a.identity).collect()
        };
        assert_eq!(names(&app), vec!["bob", "carl"]);

        app.start_filter();
        app.filter_push('c');
        assert_eq!(names(&app), vec!["carl"]);
    }

    #[test]
    fn test_selection_clamped() {
        let (mut app, mut sink, store) = app();
        publish_quotas(&mut sink, &store, vec![row("a", 1), row("b", 2)]);
        app.process_events();
        app.set_view(View::Quotas);

        app.select_next_n(10);
        assert_eq!(app.selected_index, 1);
        app.select_row(5);
        assert_eq!(app.selected_index, 1);
        app.select_first();
        assert_eq!(app.selected_index, 0);

        publish_quotas(&mut sink, &store, vec![row("a", 1)]);
        app.select_last();
        app.process_events();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_detail_only_on_quotas() {
        let (mut app, mut sink, store) = app();
        publish_quotas(&mut sink, &store, vec![row("alice", 100)]);
        app.process_events();

        app.enter_detail();
        assert!(!app.show_detail_overlay);

        app.set_view(View::Quotas);
        app.enter_detail();
        assert!(app.show_detail_overlay);
        app.go_back();
        assert!(!app.show_detail_overlay);
        app.go_back();
        assert_eq!(app.current_view, View::Monitoring);
    }

    #[test]
    fn test_refresh_request_taken_once() {
        let (mut app, _sink, _store) = app();
        assert!(!app.take_refresh_request());
        app.request_refresh();
        assert!(app.take_refresh_request());
        assert!(!app.take_refresh_request());
    }

    #[test]
    fn test_scheduler_stop_reported() {
        let (mut app, sink, _store) = app();
        drop(sink);
        assert!(!app.process_events());
        assert_eq!(app.load_error.as_deref(), Some("refresh scheduler stopped"));
    }

    #[test]
    fn test_export_state() {
        let (app, mut sink, store) = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        assert!(app.export_state(&path).is_err());

        publish_quotas(&mut sink, &store, vec![row("alice", 850)]);
        app.export_state(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["critical"], 1);
    }
}
