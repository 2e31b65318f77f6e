//! Points (turnouts) and their wished/actual state machine.
//!
//! A point has a *wished* position, set by the user or the control logic,
//! and an *actual* position, reported by the motor feedback.  The two
//! converge asynchronously: after a wish the point is *pending* until the
//! feedback reports the same position.  While the motor moves, feedback may
//! report `Middle`.
//!
//! Two shapes of point share the [`PointControl`] contract:
//!
//! - [`SinglePoint`]: one identifier, one wished/actual pair.
//! - [`DoublePoint`]: two identifiers (`top`, `bottom`) on one device, each
//!   with its own wished/actual pair, synchronised or not depending on its
//!   [`DoublePointSize`].
//!
//! [`Point`] is the closed set of both, as stored by the layout.

pub mod double;
pub mod single;

pub use double::{DoublePoint, DoublePointSize, Quadrant, QuadrantError};
pub use single::{PointShape, SinglePoint};

use crate::domain::notify::{Action, PendingWish, Sender};
use crate::domain::registry::PointId;
use crate::position::{CanichePosition, Position, Way};

/// Capability contract shared by every point shape.
///
/// Methods taking a `PointId` address one sub-point of the device.  An
/// identifier the device does not own makes setters no-ops and getters
/// return the sentinel ([`Position::None`], `false`).
pub trait PointControl {
    /// Orientation used to translate positions to Caniche codes.
    fn way(&self) -> Way;

    /// Identifies this device in notifications.
    fn sender(&self) -> Sender;

    /// Records motor feedback for sub-point `id`.
    ///
    /// No-op unless `id` is owned and `position` differs from the current
    /// actual position.  Clears the pending flag once actual equals wished.
    fn set_actual_position(&mut self, id: PointId, position: Position);

    /// Commands sub-point `id` to `position`.
    ///
    /// No-op unless `id` is owned, `position` is `Straight` or `Diagonal`,
    /// and it differs from the current wish.  On success marks the sub-point
    /// pending, arms its pending-wish edge and fires the action.
    fn set_wished_position(&mut self, id: PointId, position: Position);

    fn actual_position(&self, id: PointId) -> Position;

    fn wished_position(&self, id: PointId) -> Position;

    /// Returns `true` while the last wish of sub-point `id` has not been
    /// matched by feedback.
    fn is_pending(&self, id: PointId) -> bool;

    /// Toggles the device as a touch on it would.
    fn toggle(&mut self);

    /// Consumes the next unconsumed wish, if any.
    ///
    /// Edge-triggered: a wish is returned once, then `None` until another
    /// wish is made.  A second wish before the first is consumed overwrites
    /// it rather than queueing.
    fn pending_wish(&mut self) -> Option<PendingWish<Position>>;

    /// Same as [`pending_wish`](Self::pending_wish), in the Caniche vocabulary.
    fn pending_caniche_wish(&mut self) -> Option<PendingWish<CanichePosition>> {
        let way = self.way();
        self.pending_wish().map(|wish| PendingWish {
            point_id: wish.point_id,
            position: way.to_caniche(wish.position),
        })
    }

    /// Translates an internal position with this device's orientation.
    fn to_caniche(&self, position: Position) -> CanichePosition {
        self.way().to_caniche(position)
    }

    /// Translates a Caniche code with this device's orientation.
    fn to_position(&self, code: CanichePosition) -> Position {
        self.way().to_position(code)
    }

    fn set_action(&mut self, action: Action);

    fn clear_action(&mut self);

    /// Returns and clears the redraw request raised by the last mutations.
    fn take_needs_display(&mut self) -> bool;
}

/// A point of either shape.
#[derive(Debug)]
pub enum Point {
    Single(SinglePoint),
    Double(DoublePoint),
}

impl Point {
    /// Identifiers owned by this device: one for a single point, two for a
    /// double point.
    pub fn point_ids(&self) -> Vec<PointId> {
        match self {
            Point::Single(point) => vec![point.id()],
            Point::Double(point) => vec![point.top_id(), point.bottom_id()],
        }
    }

    pub fn as_single(&self) -> Option<&SinglePoint> {
        match self {
            Point::Single(point) => Some(point),
            Point::Double(_) => None,
        }
    }

    pub fn as_double(&self) -> Option<&DoublePoint> {
        match self {
            Point::Double(point) => Some(point),
            Point::Single(_) => None,
        }
    }

    pub fn as_double_mut(&mut self) -> Option<&mut DoublePoint> {
        match self {
            Point::Double(point) => Some(point),
            Point::Single(_) => None,
        }
    }

    fn control(&self) -> &dyn PointControl {
        match self {
            Point::Single(point) => point,
            Point::Double(point) => point,
        }
    }

    fn control_mut(&mut self) -> &mut dyn PointControl {
        match self {
            Point::Single(point) => point,
            Point::Double(point) => point,
        }
    }
}

impl From<SinglePoint> for Point {
    fn from(point: SinglePoint) -> Self {
        Point::Single(point)
    }
}

impl From<DoublePoint> for Point {
    fn from(point: DoublePoint) -> Self {
        Point::Double(point)
    }
}

impl PointControl for Point {
    fn way(&self) -> Way {
        self.control().way()
    }

    fn sender(&self) -> Sender {
        self.control().sender()
    }

    fn set_actual_position(&mut self, id: PointId, position: Position) {
        self.control_mut().set_actual_position(id, position);
    }

    fn set_wished_position(&mut self, id: PointId, position: Position) {
        self.control_mut().set_wished_position(id, position);
    }

    fn actual_position(&self, id: PointId) -> Position {
        self.control().actual_position(id)
    }

    fn wished_position(&self, id: PointId) -> Position {
        self.control().wished_position(id)
    }

    fn is_pending(&self, id: PointId) -> bool {
        self.control().is_pending(id)
    }

    fn toggle(&mut self) {
        self.control_mut().toggle();
    }

    fn pending_wish(&mut self) -> Option<PendingWish<Position>> {
        self.control_mut().pending_wish()
    }

    fn set_action(&mut self, action: Action) {
        self.control_mut().set_action(action);
    }

    fn clear_action(&mut self) {
        self.control_mut().clear_action();
    }

    fn take_needs_display(&mut self) -> bool {
        self.control_mut().take_needs_display()
    }
}
