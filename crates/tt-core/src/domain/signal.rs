//! Semaphore signals.
//!
//! Signals are display-only: the layout sets their state and a renderer shows
//! it.  They have no identifier namespace and no notification.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Running direction a signal faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Aspect shown by a semaphore signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemaphoreState {
    /// Red: stop.
    #[default]
    Stop,
    /// Yellow: proceed slowly.
    Slow,
    /// Green: line clear.
    Clear,
}

#[derive(Debug, Clone)]
pub struct Signal {
    direction: Direction,
    state: SemaphoreState,
    needs_display: bool,
}

impl Signal {
    /// Creates a signal showing [`SemaphoreState::Stop`].
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: SemaphoreState::default(),
            needs_display: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> SemaphoreState {
        self.state
    }

    pub fn set_state(&mut self, state: SemaphoreState) {
        if state == self.state {
            return;
        }
        debug!(?state, "signal state changed");
        self.state = state;
        self.needs_display = true;
    }

    pub fn take_needs_display(&mut self) -> bool {
        std::mem::take(&mut self.needs_display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_signal_shows_stop() {
        let signal = Signal::new(Direction::Backward);
        assert_eq!(signal.state(), SemaphoreState::Stop);
        assert_eq!(signal.direction(), Direction::Backward);
    }

    #[test]
    fn test_set_state_requests_redraw_only_on_change() {
        let mut signal = Signal::new(Direction::Forward);

        signal.set_state(SemaphoreState::Stop);
        assert!(!signal.take_needs_display());

        signal.set_state(SemaphoreState::Clear);
        assert_eq!(signal.state(), SemaphoreState::Clear);
        assert!(signal.take_needs_display());
    }
}
