//! Presentation sinks notified by the scheduler.

use crate::error::FetchError;
use crate::store::{MetricCategory, MetricSnapshot};

use super::cycle::CycleState;

/// Receives refresh results for a mounted view.
///
/// The sink is owned by the scheduler for as long as the view is mounted and
/// dropped on unmount. Calls arrive from the runtime thread and must not
/// block.
pub trait RenderSink: Send {
    /// A category has a new snapshot.
    fn render(&mut self, category: MetricCategory, snapshot: &MetricSnapshot);

    /// A category failed to refresh. Its previous snapshot is still stored.
    fn fetch_failed(&mut self, category: MetricCategory, error: &FetchError);

    /// Seconds left until the next round.
    fn countdown(&mut self, _remaining_secs: u32) {}

    /// Every category of the round has answered.
    fn round_finished(&mut self, _state: CycleState) {}
}

/// A sink notification, as forwarded over a channel.
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Rendered(MetricSnapshot),
    FetchFailed {
        category: MetricCategory,
        message: String,
    },
    Countdown(u32),
    RoundFinished(CycleState),
}
