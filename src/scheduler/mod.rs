//! Periodic refresh of mounted views.
//!
//! Each mounted view owns exactly one [`RefreshCycle`] and one one-second
//! timer task. When the countdown elapses, every category of the view is
//! fetched in its own task; completions come back in any order and are
//! written to the [`SnapshotStore`] before the view's [`RenderSink`] is told.
//!
//! Two checks keep late results from clobbering newer data:
//!
//! - a completion whose [`CycleId`] is not the view's current cycle is
//!   dropped (the view was remounted or unmounted meanwhile)
//! - the store rejects a payload whose [`Generation`] is older than the one
//!   it holds
//!
//! ```text
//! mount ──▶ timer ──tick──▶ RefreshCycle ──Fetch──▶ spawn fetch × N
//!                                                        │
//!                  RenderSink ◀── SnapshotStore ◀── complete (cycle id check)
//! ```

pub mod cycle;
pub mod fetch;
pub mod sink;

pub use cycle::{CycleId, CycleState, RefreshCycle, TickOutcome};
pub use fetch::{ConsoleFetcher, MetricFetcher};
pub use sink::{RenderSink, SinkEvent};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::data::MetricPayload;
use crate::error::FetchError;
use crate::store::{Generation, MetricCategory, SnapshotStore};

/// Name of a mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub &'static str);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How a view refreshes.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub interval: Duration,
    pub categories: Vec<MetricCategory>,
    /// Start a round as soon as the view is mounted.
    pub fetch_on_mount: bool,
}

impl CycleConfig {
    pub fn new(interval: Duration, categories: Vec<MetricCategory>) -> Self {
        Self {
            interval,
            categories,
            fetch_on_mount: true,
        }
    }

    pub fn fetch_on_mount(mut self, fetch_on_mount: bool) -> Self {
        self.fetch_on_mount = fetch_on_mount;
        self
    }
}

struct ViewSlot {
    cycle: RefreshCycle,
    categories: Vec<MetricCategory>,
    sink: Box<dyn RenderSink>,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct Views {
    slots: HashMap<ViewId, ViewSlot>,
    next_cycle: u64,
}

struct Shared {
    runtime: Handle,
    fetcher: Arc<dyn MetricFetcher>,
    store: Arc<SnapshotStore>,
    views: Mutex<Views>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        for slot in self.views.get_mut().slots.values() {
            slot.timer.abort();
        }
    }
}

/// Drives refresh cycles for mounted views.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct RefreshScheduler {
    shared: Arc<Shared>,
}

impl fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("live_timers", &self.live_timers())
            .finish()
    }
}

impl RefreshScheduler {
    pub fn new(
        runtime: Handle,
        fetcher: Arc<dyn MetricFetcher>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                runtime,
                fetcher,
                store,
                views: Mutex::new(Views::default()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.shared.store
    }

    /// Mount `view`, replacing any cycle it already has.
    ///
    /// The previous timer is cancelled before the new one is installed, and
    /// results still in flight for the previous cycle are discarded.
    pub fn mount(
        &self,
        view: ViewId,
        config: CycleConfig,
        sink: Box<dyn RenderSink>,
    ) -> ViewGuard {
        let mut views = self.shared.views.lock();

        if let Some(old) = views.slots.remove(&view) {
            old.timer.abort();
            debug!(%view, cycle = old.cycle.id().0, "superseded refresh cycle");
        }

        views.next_cycle += 1;
        let id = CycleId(views.next_cycle);
        let interval_secs = u32::try_from(config.interval.as_secs()).unwrap_or(u32::MAX);

        let timer = self
            .shared
            .runtime
            .spawn(run_timer(Arc::downgrade(&self.shared), view, id));

        views.slots.insert(
            view,
            ViewSlot {
                cycle: RefreshCycle::new(id, interval_secs),
                categories: config.categories,
                sink,
                timer,
            },
        );
        info!(%view, cycle = id.0, interval_secs, "mounted view");

        if config.fetch_on_mount {
            self.shared.start_round(&mut views, view);
        }

        ViewGuard {
            shared: Arc::downgrade(&self.shared),
            view,
            cycle: id,
        }
    }

    /// Start a round now unless one is in flight. Returns whether it started.
    pub fn refresh_now(&self, view: ViewId) -> bool {
        let mut views = self.shared.views.lock();
        self.shared.start_round(&mut views, view)
    }

    /// Tear down `view`'s cycle. Returns false if it was not mounted.
    pub fn unmount(&self, view: ViewId) -> bool {
        self.shared.unmount(view, None)
    }

    /// Number of views with a running timer.
    pub fn live_timers(&self) -> usize {
        self.shared
            .views
            .lock()
            .slots
            .values()
            .filter(|slot| !slot.timer.is_finished())
            .count()
    }

    /// Current cycle of `view`, if mounted.
    pub fn cycle_id(&self, view: ViewId) -> Option<CycleId> {
        self.shared.views.lock().slots.get(&view).map(|s| s.cycle.id())
    }

    pub fn cycle_state(&self, view: ViewId) -> Option<CycleState> {
        self.shared.views.lock().slots.get(&view).map(|s| s.cycle.state())
    }
}

impl Shared {
    fn tick(self: &Arc<Self>, view: ViewId, id: CycleId) -> bool {
        let mut views = self.views.lock();
        let Some(slot) = views.slots.get_mut(&view) else {
            return false;
        };
        if slot.cycle.id() != id {
            return false;
        }

        match slot.cycle.tick() {
            TickOutcome::Skipped => {}
            TickOutcome::Countdown(remaining) => slot.sink.countdown(remaining),
            TickOutcome::Fetch => {
                self.start_round(&mut views, view);
            }
        }
        true
    }

    fn start_round(self: &Arc<Self>, views: &mut Views, view: ViewId) -> bool {
        let Some(slot) = views.slots.get_mut(&view) else {
            return false;
        };
        if slot.cycle.in_flight() {
            return false;
        }

        let generation = self.store.next_generation();
        slot.cycle.begin_round(generation, slot.categories.len());
        slot.sink.countdown(slot.cycle.remaining_secs());

        let id = slot.cycle.id();
        debug!(
            %view,
            cycle = id.0,
            generation = generation.0,
            categories = slot.categories.len(),
            "starting refresh round"
        );

        for &category in &slot.categories {
            let shared = Arc::clone(self);
            self.runtime.spawn(async move {
                let result = shared.fetcher.fetch(category).await;
                shared.complete(view, id, generation, category, result);
            });
        }
        true
    }

    fn complete(
        &self,
        view: ViewId,
        id: CycleId,
        generation: Generation,
        category: MetricCategory,
        result: Result<MetricPayload, FetchError>,
    ) {
        let mut views = self.views.lock();
        let Some(slot) = views.slots.get_mut(&view) else {
            return;
        };
        if slot.cycle.id() != id {
            return;
        }

        let success = result.is_ok();
        match result {
            Ok(payload) => {
                if let Some(snapshot) = self.store.put_if_newer(category, payload, generation) {
                    slot.sink.render(category, &snapshot);
                }
            }
            Err(err) => slot.sink.fetch_failed(category, &err),
        }

        if let Some(state) = slot.cycle.complete_one(success) {
            slot.sink.round_finished(state);
        }
    }

    fn unmount(&self, view: ViewId, only: Option<CycleId>) -> bool {
        let mut views = self.views.lock();
        let owned = match (views.slots.get(&view), only) {
            (None, _) => false,
            (Some(slot), Some(id)) => slot.cycle.id() == id,
            (Some(_), None) => true,
        };
        if !owned {
            return false;
        }
        if let Some(slot) = views.slots.remove(&view) {
            slot.timer.abort();
            info!(%view, cycle = slot.cycle.id().0, "unmounted view");
        }
        true
    }
}

/// Ticks once per second until the cycle is gone or superseded.
async fn run_timer(shared: Weak<Shared>, view: ViewId, id: CycleId) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.tick(view, id) {
            break;
        }
    }
}

/// Unmounts its view when dropped.
///
/// A guard whose cycle has since been replaced by a newer mount leaves the
/// newer cycle alone.
#[derive(Debug)]
#[must_use = "dropping the guard unmounts the view"]
pub struct ViewGuard {
    shared: Weak<Shared>,
    view: ViewId,
    cycle: CycleId,
}

impl ViewGuard {
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn cycle_id(&self) -> CycleId {
        self.cycle
    }
}

impl Drop for ViewGuard {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unmount(self.view, Some(self.cycle));
        }
    }
}
