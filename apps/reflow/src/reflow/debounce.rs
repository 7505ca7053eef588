//! Resize debounce state machine.
//!
//! ```text
//! Idle ──resize──▶ Resizing{deadline}      (suppress transitions)
//! Resizing ──resize──▶ Resizing{deadline'}  (timer reset only)
//! Resizing ──deadline reached──▶ Idle       (reflow all, restore transitions)
//! ```
//!
//! The machine only tracks time; side effects belong to the caller, keyed off
//! [`ResizeTransition`] and [`ResizeDebounce::fire`].

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Idle,
    Resizing { deadline: Instant },
}

/// What a resize signal did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTransition {
    /// First signal of a burst: the caller suppresses transitions.
    Entered,
    /// Later signal within the quiet period: deadline pushed back, nothing else.
    Rescheduled,
}

#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    quiet_period: Duration,
    state: ResizeState,
}

impl ResizeDebounce {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: ResizeState::Idle,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.state, ResizeState::Resizing { .. })
    }

    /// Pending deadline, if a burst is in progress.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ResizeState::Idle => None,
            ResizeState::Resizing { deadline } => Some(deadline),
        }
    }

    pub fn on_resize(&mut self, now: Instant) -> ResizeTransition {
        let transition = match self.state {
            ResizeState::Idle => ResizeTransition::Entered,
            ResizeState::Resizing { .. } => ResizeTransition::Rescheduled,
        };
        self.state = ResizeState::Resizing {
            deadline: now + self.quiet_period,
        };
        transition
    }

    /// Returns `true` exactly once per burst, when `now` has reached the deadline.
    /// The machine is back in `Idle` afterwards.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            ResizeState::Resizing { deadline } if now >= deadline => {
                self.state = ResizeState::Idle;
                true
            }
            _ => false,
        }
    }
}

impl Default for ResizeDebounce {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}
