//! Single point: one identifier, one wished/actual pair.

use tracing::{debug, trace};

use super::PointControl;
use crate::domain::notify::{Action, ActionSlot, PendingWish, Sender};
use crate::domain::registry::PointId;
use crate::position::{Position, Way};

/// Drawing attributes of a single point.
///
/// They only matter to a renderer; the state machine never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointShape {
    /// The incoming track arrives on a diagonal.
    pub in_diagonal: bool,
    /// The outgoing track leaves on a diagonal.
    pub out_diagonal: bool,
    /// The point is drawn mirrored.
    pub reversed: bool,
}

/// A simple turnout.
#[derive(Debug)]
pub struct SinglePoint {
    id: PointId,
    way: Way,
    shape: PointShape,
    wished: Position,
    actual: Position,
    pending: bool,
    /// Unconsumed pending-wish edge.
    toggled: bool,
    needs_display: bool,
    action: ActionSlot,
}

impl SinglePoint {
    /// Creates a point set straight, with no wish outstanding.
    pub fn new(id: PointId, way: Way, shape: PointShape) -> Self {
        Self {
            id,
            way,
            shape,
            wished: Position::Straight,
            actual: Position::Straight,
            pending: false,
            toggled: false,
            needs_display: false,
            action: ActionSlot::default(),
        }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn shape(&self) -> PointShape {
        self.shape
    }

    /// Wished position, for rendering.
    pub fn wished(&self) -> Position {
        self.wished
    }

    /// Actual position, for rendering.
    pub fn actual(&self) -> Position {
        self.actual
    }

    pub fn pending(&self) -> bool {
        self.pending
    }
}

impl PointControl for SinglePoint {
    fn way(&self) -> Way {
        self.way
    }

    fn sender(&self) -> Sender {
        Sender::Point(self.id)
    }

    fn set_actual_position(&mut self, id: PointId, position: Position) {
        if id != self.id || position == self.actual {
            trace!(point_id = id, ?position, "actual position ignored");
            return;
        }
        self.actual = position;
        if self.actual == self.wished {
            self.pending = false;
        }
        debug!(point_id = id, ?position, pending = self.pending, "actual position changed");
        self.needs_display = true;
    }

    fn set_wished_position(&mut self, id: PointId, position: Position) {
        if id != self.id || position == self.wished || !position.is_commandable() {
            trace!(point_id = id, ?position, "wished position ignored");
            return;
        }
        self.wished = position;
        self.pending = true;
        self.toggled = true;
        debug!(point_id = id, ?position, "wished position changed");
        self.action.fire(self.sender());
        self.needs_display = true;
    }

    fn actual_position(&self, id: PointId) -> Position {
        if id == self.id {
            self.actual
        } else {
            Position::None
        }
    }

    fn wished_position(&self, id: PointId) -> Position {
        if id == self.id {
            self.wished
        } else {
            Position::None
        }
    }

    fn is_pending(&self, id: PointId) -> bool {
        id == self.id && self.pending
    }

    fn toggle(&mut self) {
        self.wished = self.wished.toggled();
        self.toggled = true;
        self.pending = true;
        debug!(point_id = self.id, wished = ?self.wished, "point toggled");
        self.action.fire(self.sender());
        self.needs_display = true;
    }

    fn pending_wish(&mut self) -> Option<PendingWish<Position>> {
        if !self.toggled {
            return None;
        }
        self.toggled = false;
        Some(PendingWish {
            point_id: self.id,
            position: self.wished,
        })
    }

    fn set_action(&mut self, action: Action) {
        self.action.set(action);
    }

    fn clear_action(&mut self) {
        self.action.clear();
    }

    fn take_needs_display(&mut self) -> bool {
        std::mem::take(&mut self.needs_display)
    }
}
