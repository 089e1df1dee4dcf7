//! Refresh cycle state machine.
//!
//! ```text
//!        tick (countdown hits 0)          all categories answered
//! Idle ──────────────────────────▶ Fetching ──────────────────────▶ Idle
//!  ▲                                  │
//!  │            next tick             │ any category failed
//!  └──────────── Failed ◀─────────────┘
//! ```
//!
//! The cycle holds no timers itself; the scheduler drives `tick` once per
//! second and reports fetch completions back.

use serde::Serialize;

use crate::store::Generation;

/// Identity of one mounted cycle. A remount always gets a larger id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    Idle,
    Fetching,
    Failed,
}

/// What the scheduler should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A round is in flight; the countdown is frozen.
    Skipped,
    /// Seconds left until the next round.
    Countdown(u32),
    /// Countdown elapsed: start a round.
    Fetch,
}

#[derive(Debug, Clone)]
pub struct RefreshCycle {
    id: CycleId,
    interval_secs: u32,
    remaining_secs: u32,
    state: CycleState,
    generation: Option<Generation>,
    pending: usize,
    failures: usize,
}

impl RefreshCycle {
    /// A new idle cycle. Intervals below one second are raised to one.
    pub fn new(id: CycleId, interval_secs: u32) -> Self {
        let interval_secs = interval_secs.max(1);
        Self {
            id,
            interval_secs,
            remaining_secs: interval_secs,
            state: CycleState::Idle,
            generation: None,
            pending: 0,
            failures: 0,
        }
    }

    pub fn id(&self) -> CycleId {
        self.id
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Generation of the current or last round.
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    pub fn in_flight(&self) -> bool {
        self.state == CycleState::Fetching
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            CycleState::Fetching => return TickOutcome::Skipped,
            CycleState::Failed => self.state = CycleState::Idle,
            CycleState::Idle => {}
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.remaining_secs = self.interval_secs;
            TickOutcome::Fetch
        } else {
            TickOutcome::Countdown(self.remaining_secs)
        }
    }

    /// Start a round over `categories` categories and restart the countdown.
    ///
    /// A round with no categories finishes immediately.
    pub fn begin_round(&mut self, generation: Generation, categories: usize) {
        self.generation = Some(generation);
        self.remaining_secs = self.interval_secs;
        self.pending = categories;
        self.failures = 0;
        self.state = if categories == 0 {
            CycleState::Idle
        } else {
            CycleState::Fetching
        };
    }

    /// Record one category's result.
    ///
    /// Returns the resulting state once the last category has answered.
    pub fn complete_one(&mut self, success: bool) -> Option<CycleState> {
        if self.state != CycleState::Fetching {
            return None;
        }
        if !success {
            self.failures += 1;
        }
        self.pending = self.pending.saturating_sub(1);
        if self.pending > 0 {
            return None;
        }
        self.state = if self.failures > 0 {
            CycleState::Failed
        } else {
            CycleState::Idle
        };
        Some(self.state)
    }
}
