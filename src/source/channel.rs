//! Channel bridge between the scheduler and the TUI.
//!
//! The scheduler calls a [`ChannelSink`] from the runtime thread; the TUI
//! drains the paired [`ChannelSource`] from its draw loop without blocking.

use tokio::sync::mpsc;

use super::DataSource;
use crate::error::FetchError;
use crate::scheduler::{CycleState, RenderSink, SinkEvent};
use crate::store::{MetricCategory, MetricSnapshot};

/// Sending half. Cheap to clone; one clone is handed to each mounted view.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    fn send(&self, event: SinkEvent) {
        // The receiver is gone only while the TUI is shutting down.
        let _ = self.sender.send(event);
    }
}

impl RenderSink for ChannelSink {
    fn render(&mut self, _category: MetricCategory, snapshot: &MetricSnapshot) {
        self.send(SinkEvent::Rendered(snapshot.clone()));
    }

    fn fetch_failed(&mut self, category: MetricCategory, error: &FetchError) {
        self.send(SinkEvent::FetchFailed {
            category,
            message: error.to_string(),
        });
    }

    fn countdown(&mut self, remaining_secs: u32) {
        self.send(SinkEvent::Countdown(remaining_secs));
    }

    fn round_finished(&mut self, state: CycleState) {
        self.send(SinkEvent::RoundFinished(state));
    }
}

/// A data source that receives scheduler events via a channel.
///
/// # Example
///
/// ```
/// use quotawatch::{ChannelSource, DataSource};
///
/// let (sink, mut source) = ChannelSource::create("http://127.0.0.1:5000/api");
/// assert!(source.poll().is_none());
/// # drop(sink);
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::UnboundedReceiver<SinkEvent>,
    description: String,
    disconnected: bool,
}

impl ChannelSource {
    /// Create a sink/source pair.
    pub fn create(source_description: &str) -> (ChannelSink, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let source = Self {
            receiver,
            description: format!("console: {}", source_description),
            disconnected: false,
        };
        (ChannelSink { sender }, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<SinkEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        if self.disconnected {
            Some("refresh scheduler stopped")
        } else {
            None
        }
    }
}
