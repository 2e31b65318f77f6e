//! Wished-change notification and the pending-wish edge.
//!
//! Every device carries an optional [`Action`].  It is called synchronously,
//! inside the mutating call, each time the device's wished state changes.
//! The action is told *which* device changed through a [`Sender`]; a
//! hardware driver reacting to it then polls the device's pending wish to
//! learn *what* to command.
//!
//! Actions are reference-counted so one closure can be shared by every
//! device of a layout.  They are not `Send`: the layout is driven from a
//! single control thread.

use std::fmt;
use std::rc::Rc;

use super::registry::{DecouplerId, PointId};

/// Callback fired when a device's wished state changes.
pub type Action = Rc<dyn Fn(Sender)>;

/// Identifies the device that fired an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    Point(PointId),
    DoublePoint { top: PointId, bottom: PointId },
    Decoupler(DecouplerId),
}

/// A wish consumed from a device by a pending-wish poll.
///
/// `P` is either the internal [`Position`](crate::position::Position) or the
/// protocol [`CanichePosition`](crate::position::CanichePosition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWish<P> {
    /// Identifier of the point (or double-point half) the wish is for.
    pub point_id: PointId,
    /// The wished position.
    pub position: P,
}

/// Optional per-device action.
#[derive(Clone, Default)]
pub struct ActionSlot {
    action: Option<Action>,
}

impl ActionSlot {
    /// Installs `action`, replacing any previous one.
    pub fn set(&mut self, action: Action) {
        self.action = Some(action);
    }

    /// Removes the installed action.
    pub fn clear(&mut self) {
        self.action = None;
    }

    pub fn is_set(&self) -> bool {
        self.action.is_some()
    }

    /// Calls the installed action, if any.
    pub fn fire(&self, sender: Sender) {
        if let Some(action) = &self.action {
            action(sender);
        }
    }
}

impl fmt::Debug for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSlot")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_fire_without_action_does_nothing() {
        let slot = ActionSlot::default();
        slot.fire(Sender::Point(1));
        assert!(!slot.is_set());
    }

    #[test]
    fn test_fire_calls_installed_action_with_sender() {
        // Arrange
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut slot = ActionSlot::default();
        slot.set(Rc::new(move |sender: Sender| sink.borrow_mut().push(sender)));

        // Act
        slot.fire(Sender::Decoupler(3));
        slot.fire(Sender::DoublePoint { top: 1, bottom: 2 });

        // Assert
        assert_eq!(
            *seen.borrow(),
            vec![Sender::Decoupler(3), Sender::DoublePoint { top: 1, bottom: 2 }]
        );
    }

    #[test]
    fn test_clear_removes_action() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut slot = ActionSlot::default();
        slot.set(Rc::new(move |_: Sender| *counter.borrow_mut() += 1));

        slot.clear();
        slot.fire(Sender::Point(0));

        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_debug_reports_whether_action_is_set() {
        let mut slot = ActionSlot::default();
        assert_eq!(format!("{slot:?}"), "ActionSlot { set: false }");
        slot.set(Rc::new(|_| {}));
        assert_eq!(format!("{slot:?}"), "ActionSlot { set: true }");
    }
}
