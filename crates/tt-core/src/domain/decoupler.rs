//! Decoupler: a two-state uncoupling ramp.
//!
//! Unlike points, decouplers have no wished/actual split; the physical
//! device is treated as switching instantly.

use tracing::debug;

use crate::domain::notify::{Action, ActionSlot, Sender};
use crate::domain::registry::DecouplerId;

#[derive(Debug)]
pub struct Decoupler {
    id: DecouplerId,
    engaged: bool,
    needs_display: bool,
    action: ActionSlot,
}

impl Decoupler {
    /// Creates a disengaged decoupler.
    pub fn new(id: DecouplerId) -> Self {
        Self {
            id,
            engaged: false,
            needs_display: false,
            action: ActionSlot::default(),
        }
    }

    pub fn id(&self) -> DecouplerId {
        self.id
    }

    /// `true` while engaged.
    pub fn position(&self) -> bool {
        self.engaged
    }

    /// Flips the engaged state and fires the action, unconditionally.
    pub fn toggle(&mut self) {
        self.engaged = !self.engaged;
        debug!(decoupler_id = self.id, engaged = self.engaged, "decoupler toggled");
        self.action.fire(Sender::Decoupler(self.id));
        self.needs_display = true;
    }

    pub fn set_action(&mut self, action: Action) {
        self.action.set(action);
    }

    pub fn clear_action(&mut self) {
        self.action.clear();
    }

    pub fn take_needs_display(&mut self) -> bool {
        std::mem::take(&mut self.needs_display)
    }
}
