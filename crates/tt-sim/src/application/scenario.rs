//! Scenario: the scripted touch layer.
//!
//! A scenario replays the `[[script]]` entries of the layout file against the
//! layout, tick by tick, as a user tapping the touch screen would.  Entries
//! that address missing devices are inert, like any other call on the
//! layout's identifier surface.

use tracing::{debug, warn};
use tt_core::{Layout, Quadrant};

use crate::infrastructure::storage::config::{ScriptAction, ScriptEntry};

/// Script entries ordered by tick.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    entries: Vec<ScriptEntry>,
}

impl Scenario {
    /// Builds a scenario; entries sharing a tick keep their file order.
    pub fn from_config(entries: &[ScriptEntry]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by_key(|entry| entry.tick);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tick of the last entry, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.entries.last().map(|entry| entry.tick)
    }

    /// Applies every entry scheduled for `tick`; returns how many were applied.
    pub fn apply_due(&self, tick: u64, layout: &mut Layout) -> usize {
        let due = self.entries.iter().filter(|entry| entry.tick == tick);
        let mut applied = 0;
        for entry in due {
            debug!(tick, action = ?entry.action, "script entry");
            apply(&entry.action, layout);
            applied += 1;
        }
        applied
    }
}

fn apply(action: &ScriptAction, layout: &mut Layout) {
    match *action {
        ScriptAction::TogglePoint(id) => layout.toggle_point(id),
        ScriptAction::TouchDouble { id, quadrant } => match Quadrant::try_from(quadrant) {
            Ok(quadrant) => layout.touch_double_point(id, quadrant),
            Err(e) => warn!(point_id = id, "touch ignored: {e}"),
        },
        ScriptAction::ToggleDecoupler(id) => layout.toggle_decoupler(id),
        ScriptAction::Wish { id, position } => layout.set_wished_position_of_point(id, position),
        ScriptAction::Signal { index, state } => layout.set_signal_state(index, state),
    }
}
