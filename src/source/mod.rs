//! Data source abstraction for receiving refresh results.
//!
//! The TUI never talks to the scheduler directly. It polls a [`DataSource`]
//! for [`SinkEvent`]s and reads payloads from the snapshot store.

mod channel;

pub use channel::{ChannelSink, ChannelSource};

use std::fmt::Debug;

use crate::scheduler::SinkEvent;

/// Trait for receiving scheduler events.
pub trait DataSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `Some(event)` if one is queued, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<SinkEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the source can no longer deliver events.
    fn error(&self) -> Option<&str>;
}
