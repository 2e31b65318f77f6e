//! The layout: owner of every device and of both identifier registries.
//!
//! Devices are added once, while the layout is being built, and live as long
//! as the layout.  Adding a device registers it immediately: a single point
//! under its identifier, a double point under both of its identifiers (both
//! resolving to the same device), a decoupler in the decoupler namespace.
//!
//! Once built, the layout is driven through an identifier-addressed surface.
//! Every operation on an identifier that is out of range or unregistered is
//! a silent no-op and reads return the sentinel ([`Position::None`],
//! [`CanichePosition::Unknown`], `false`).  There is no error path: a caller
//! addressing a missing device sees an idle one.
//!
//! # Single control thread
//!
//! Mutations run to completion before returning, including the device's
//! action.  Actions are `Rc` closures, so a `Layout` is neither `Send` nor
//! `Sync`; hosts keep it on one thread.

use tracing::{debug, trace};

use crate::domain::decoupler::Decoupler;
use crate::domain::notify::{Action, PendingWish};
use crate::domain::point::{
    DoublePoint, DoublePointSize, Point, PointControl, PointShape, Quadrant, SinglePoint,
};
use crate::domain::registry::{
    DecouplerId, PointId, Registration, Registry, MAX_DECOUPLERS, MAX_POINTS,
};
use crate::domain::signal::{Direction, SemaphoreState, Signal};
use crate::position::{CanichePosition, Position, Way};

/// Per-instance access to a point owned by a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointHandle(usize);

/// Per-instance access to a decoupler owned by a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecouplerHandle(usize);

/// Per-instance access to a signal owned by a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHandle(usize);

impl SignalHandle {
    /// Insertion index of the signal.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A device whose redraw request was taken by [`Layout::take_redraws`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    Point(PointHandle),
    Decoupler(DecouplerHandle),
    Signal(SignalHandle),
}

/// Every device of a model-railway layout.
#[derive(Debug, Default)]
pub struct Layout {
    points: Vec<Point>,
    decouplers: Vec<Decoupler>,
    signals: Vec<Signal>,
    point_registry: Registry<PointHandle, MAX_POINTS>,
    decoupler_registry: Registry<DecouplerHandle, MAX_DECOUPLERS>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    // ── construction ──────────────────────────────────────────────────────────

    /// Adds a single point and registers it under `id`.
    pub fn add_point(&mut self, id: PointId, way: Way, shape: PointShape) -> PointHandle {
        let handle = PointHandle(self.points.len());
        self.points.push(SinglePoint::new(id, way, shape).into());
        self.register_point(id, handle);
        handle
    }

    /// Adds a double point and registers it under both identifiers.
    pub fn add_double_point(
        &mut self,
        top_id: PointId,
        bottom_id: PointId,
        way: Way,
        size: DoublePointSize,
        reversed: bool,
    ) -> PointHandle {
        let handle = PointHandle(self.points.len());
        self.points
            .push(DoublePoint::new(top_id, bottom_id, way, size, reversed).into());
        self.register_point(top_id, handle);
        self.register_point(bottom_id, handle);
        handle
    }

    /// Adds a decoupler and registers it under `id`.
    pub fn add_decoupler(&mut self, id: DecouplerId) -> DecouplerHandle {
        let handle = DecouplerHandle(self.decouplers.len());
        self.decouplers.push(Decoupler::new(id));
        match self.decoupler_registry.register(id, handle) {
            Registration::Registered => {}
            Registration::Replaced(previous) => {
                debug!(decoupler_id = id, ?previous, "decoupler identifier reassigned");
            }
            Registration::OutOfRange => {
                trace!(decoupler_id = id, "decoupler identifier out of range, not registered");
            }
        }
        handle
    }

    /// Adds a signal; signals are addressed by insertion index.
    pub fn add_signal(&mut self, direction: Direction) -> SignalHandle {
        let handle = SignalHandle(self.signals.len());
        self.signals.push(Signal::new(direction));
        handle
    }

    fn register_point(&mut self, id: PointId, handle: PointHandle) {
        match self.point_registry.register(id, handle) {
            Registration::Registered => {}
            Registration::Replaced(previous) if previous == handle => {}
            Registration::Replaced(previous) => {
                debug!(point_id = id, ?previous, "point identifier reassigned");
            }
            Registration::OutOfRange => {
                trace!(point_id = id, "point identifier out of range, not registered");
            }
        }
    }

    // ── per-instance access ───────────────────────────────────────────────────

    pub fn point(&self, handle: PointHandle) -> Option<&Point> {
        self.points.get(handle.0)
    }

    pub fn point_mut(&mut self, handle: PointHandle) -> Option<&mut Point> {
        self.points.get_mut(handle.0)
    }

    pub fn decoupler(&self, handle: DecouplerHandle) -> Option<&Decoupler> {
        self.decouplers.get(handle.0)
    }

    pub fn decoupler_mut(&mut self, handle: DecouplerHandle) -> Option<&mut Decoupler> {
        self.decouplers.get_mut(handle.0)
    }

    pub fn signal(&self, handle: SignalHandle) -> Option<&Signal> {
        self.signals.get(handle.0)
    }

    /// All points in insertion order, including ones shadowed in the registry.
    pub fn points(&self) -> impl Iterator<Item = (PointHandle, &Point)> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (PointHandle(index), point))
    }

    pub fn point_handles(&self) -> impl Iterator<Item = PointHandle> {
        (0..self.points.len()).map(PointHandle)
    }

    pub fn decouplers(&self) -> impl Iterator<Item = (DecouplerHandle, &Decoupler)> {
        self.decouplers
            .iter()
            .enumerate()
            .map(|(index, decoupler)| (DecouplerHandle(index), decoupler))
    }

    pub fn signals(&self) -> impl Iterator<Item = (SignalHandle, &Signal)> {
        self.signals
            .iter()
            .enumerate()
            .map(|(index, signal)| (SignalHandle(index), signal))
    }

    /// Resolves a point identifier to the device currently registered there.
    pub fn lookup_point(&self, id: PointId) -> Option<PointHandle> {
        self.point_registry.lookup(id)
    }

    /// Resolves a decoupler identifier to the device currently registered there.
    pub fn lookup_decoupler(&self, id: DecouplerId) -> Option<DecouplerHandle> {
        self.decoupler_registry.lookup(id)
    }

    /// Identifiers currently registered in the point namespace.
    pub fn registered_point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.point_registry.iter().map(|(id, _)| id)
    }

    fn point_at(&self, id: PointId) -> Option<&Point> {
        self.lookup_point(id).and_then(|handle| self.point(handle))
    }

    fn point_at_mut(&mut self, id: PointId) -> Option<&mut Point> {
        let handle = self.lookup_point(id)?;
        self.point_mut(handle)
    }

    fn decoupler_at(&self, id: DecouplerId) -> Option<&Decoupler> {
        self.lookup_decoupler(id)
            .and_then(|handle| self.decoupler(handle))
    }

    fn decoupler_at_mut(&mut self, id: DecouplerId) -> Option<&mut Decoupler> {
        let handle = self.lookup_decoupler(id)?;
        self.decoupler_mut(handle)
    }

    // ── points by identifier ──────────────────────────────────────────────────

    pub fn set_actual_position_of_point(&mut self, id: PointId, position: Position) {
        if let Some(point) = self.point_at_mut(id) {
            point.set_actual_position(id, position);
        }
    }

    pub fn set_wished_position_of_point(&mut self, id: PointId, position: Position) {
        if let Some(point) = self.point_at_mut(id) {
            point.set_wished_position(id, position);
        }
    }

    pub fn actual_position_of_point(&self, id: PointId) -> Position {
        self.point_at(id)
            .map_or(Position::None, |point| point.actual_position(id))
    }

    pub fn wished_position_of_point(&self, id: PointId) -> Position {
        self.point_at(id)
            .map_or(Position::None, |point| point.wished_position(id))
    }

    pub fn is_point_pending(&self, id: PointId) -> bool {
        self.point_at(id).is_some_and(|point| point.is_pending(id))
    }

    /// Records feedback given in the Caniche vocabulary.
    pub fn set_caniche_actual_position_of_point(&mut self, id: PointId, code: CanichePosition) {
        if let Some(point) = self.point_at_mut(id) {
            let position = point.to_position(code);
            point.set_actual_position(id, position);
        }
    }

    /// Commands a point with a Caniche code.  `Middle` and `Unknown` are
    /// rejected like their internal equivalents.
    pub fn set_caniche_wished_position_of_point(&mut self, id: PointId, code: CanichePosition) {
        if let Some(point) = self.point_at_mut(id) {
            let position = point.to_position(code);
            point.set_wished_position(id, position);
        }
    }

    pub fn actual_caniche_position_of_point(&self, id: PointId) -> CanichePosition {
        self.point_at(id).map_or(CanichePosition::Unknown, |point| {
            point.to_caniche(point.actual_position(id))
        })
    }

    pub fn wished_caniche_position_of_point(&self, id: PointId) -> CanichePosition {
        self.point_at(id).map_or(CanichePosition::Unknown, |point| {
            point.to_caniche(point.wished_position(id))
        })
    }

    /// Consumes the next pending wish of the device registered at `id`.
    ///
    /// The poll is per device: for a double point the top half is drained
    /// first whichever of its two identifiers is given.
    pub fn pending_wish_of_point(&mut self, id: PointId) -> Option<PendingWish<Position>> {
        self.point_at_mut(id)?.pending_wish()
    }

    pub fn pending_caniche_wish_of_point(
        &mut self,
        id: PointId,
    ) -> Option<PendingWish<CanichePosition>> {
        self.point_at_mut(id)?.pending_caniche_wish()
    }

    /// Toggles the device registered at `id` as a touch on it would.
    pub fn toggle_point(&mut self, id: PointId) {
        if let Some(point) = self.point_at_mut(id) {
            point.toggle();
        }
    }

    /// Touches quadrant `quadrant` of the device registered at `id`.
    ///
    /// A single point has no quadrants and simply toggles.
    pub fn touch_double_point(&mut self, id: PointId, quadrant: Quadrant) {
        match self.point_at_mut(id) {
            Some(Point::Double(point)) => point.touch(quadrant),
            Some(point) => point.toggle(),
            None => trace!(point_id = id, "touch on unknown point ignored"),
        }
    }

    pub fn set_action_of_point(&mut self, id: PointId, action: Action) {
        if let Some(point) = self.point_at_mut(id) {
            point.set_action(action);
        }
    }

    /// Installs `action` on every registered point.
    pub fn set_action_of_all_points(&mut self, action: Action) {
        for id in 0..MAX_POINTS as u8 {
            self.set_action_of_point(id, action.clone());
        }
    }

    // ── decouplers by identifier ──────────────────────────────────────────────

    /// `true` if the decoupler at `id` exists and is engaged.
    pub fn position_of_decoupler(&self, id: DecouplerId) -> bool {
        self.decoupler_at(id).is_some_and(Decoupler::position)
    }

    pub fn toggle_decoupler(&mut self, id: DecouplerId) {
        if let Some(decoupler) = self.decoupler_at_mut(id) {
            decoupler.toggle();
        }
    }

    pub fn set_action_of_decoupler(&mut self, id: DecouplerId, action: Action) {
        if let Some(decoupler) = self.decoupler_at_mut(id) {
            decoupler.set_action(action);
        }
    }

    /// Installs `action` on every registered decoupler.
    pub fn set_action_of_all_decouplers(&mut self, action: Action) {
        for id in 0..MAX_DECOUPLERS as u8 {
            self.set_action_of_decoupler(id, action.clone());
        }
    }

    // ── signals ───────────────────────────────────────────────────────────────

    /// Sets the aspect of the signal at insertion index `index`.
    pub fn set_signal_state(&mut self, index: usize, state: SemaphoreState) {
        if let Some(signal) = self.signals.get_mut(index) {
            signal.set_state(state);
        }
    }

    // ── rendering ─────────────────────────────────────────────────────────────

    /// Takes every pending redraw request, points first.
    pub fn take_redraws(&mut self) -> Vec<Redraw> {
        let points = self
            .points
            .iter_mut()
            .enumerate()
            .filter_map(|(index, point)| {
                point
                    .take_needs_display()
                    .then_some(Redraw::Point(PointHandle(index)))
            });
        let decouplers = self
            .decouplers
            .iter_mut()
            .enumerate()
            .filter_map(|(index, decoupler)| {
                decoupler
                    .take_needs_display()
                    .then_some(Redraw::Decoupler(DecouplerHandle(index)))
            });
        let signals = self
            .signals
            .iter_mut()
            .enumerate()
            .filter_map(|(index, signal)| {
                signal
                    .take_needs_display()
                    .then_some(Redraw::Signal(SignalHandle(index)))
            });
        points.chain(decouplers).chain(signals).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notify::Sender;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn make_layout() -> Layout {
        let mut layout = Layout::new();
        layout.add_point(1, Way::RightHand, PointShape::default());
        layout.add_double_point(2, 3, Way::LeftHand, DoublePointSize::LargeNoSync, false);
        layout.add_decoupler(0);
        layout
    }

    fn recorder() -> (Action, Rc<RefCell<Vec<Sender>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (Rc::new(move |sender: Sender| sink.borrow_mut().push(sender)), seen)
    }

    #[test]
    fn test_double_point_resolves_under_both_identifiers() {
        let layout = make_layout();

        let top = layout.lookup_point(2);
        let bottom = layout.lookup_point(3);

        assert!(top.is_some());
        assert_eq!(top, bottom);
    }

    #[test]
    fn test_registered_point_ids_lists_all_namespaced_ids() {
        let layout = make_layout();
        let ids: Vec<_> = layout.registered_point_ids().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_wish_then_feedback_through_identifiers() {
        // Arrange
        let mut layout = make_layout();

        // Act
        layout.set_wished_position_of_point(3, Position::Diagonal);
        let pending = layout.is_point_pending(3);
        layout.set_actual_position_of_point(3, Position::Diagonal);

        // Assert
        assert!(pending);
        assert!(!layout.is_point_pending(3));
        assert_eq!(layout.wished_position_of_point(3), Position::Diagonal);
        assert_eq!(layout.wished_position_of_point(2), Position::Straight);
    }

    #[test]
    fn test_caniche_surface_translates_with_device_way() {
        let mut layout = make_layout();

        // Point 1 is right-hand: Right is diagonal.
        layout.set_caniche_wished_position_of_point(1, CanichePosition::Right);
        // Point 2 is left-hand: Right is straight, Left is diagonal.
        layout.set_caniche_wished_position_of_point(2, CanichePosition::Left);

        assert_eq!(layout.wished_position_of_point(1), Position::Diagonal);
        assert_eq!(layout.wished_position_of_point(2), Position::Diagonal);
        assert_eq!(layout.wished_caniche_position_of_point(2), CanichePosition::Left);
        assert_eq!(layout.actual_caniche_position_of_point(1), CanichePosition::Left);
    }

    #[test]
    fn test_caniche_middle_feedback_is_observable() {
        let mut layout = make_layout();
        layout.toggle_point(1);

        layout.set_caniche_actual_position_of_point(1, CanichePosition::Middle);

        assert_eq!(layout.actual_position_of_point(1), Position::Middle);
        assert_eq!(layout.actual_caniche_position_of_point(1), CanichePosition::Middle);
        assert!(layout.is_point_pending(1));
    }

    #[test]
    fn test_caniche_middle_wish_is_rejected() {
        let mut layout = make_layout();

        layout.set_caniche_wished_position_of_point(1, CanichePosition::Middle);
        layout.set_caniche_wished_position_of_point(1, CanichePosition::Unknown);

        assert_eq!(layout.wished_position_of_point(1), Position::Straight);
        assert!(!layout.is_point_pending(1));
    }

    #[test]
    fn test_pending_caniche_wish_of_point_drains_double_point() {
        let mut layout = make_layout();
        layout.touch_double_point(2, Quadrant::BottomRight); // left-hand: set diagonal

        let first = layout.pending_caniche_wish_of_point(3);
        let second = layout.pending_caniche_wish_of_point(3);

        assert_eq!(first, Some(PendingWish { point_id: 2, position: CanichePosition::Left }));
        assert_eq!(second, Some(PendingWish { point_id: 3, position: CanichePosition::Left }));
        assert_eq!(layout.pending_caniche_wish_of_point(2), None);
    }

    #[test]
    fn test_touch_double_point_on_single_point_toggles_it() {
        let mut layout = make_layout();

        layout.touch_double_point(1, Quadrant::TopLeft);

        assert_eq!(layout.wished_position_of_point(1), Position::Diagonal);
    }

    #[test]
    fn test_set_action_of_all_points_reaches_every_device() {
        // Arrange
        let mut layout = make_layout();
        let (action, seen) = recorder();
        layout.set_action_of_all_points(action);

        // Act
        layout.toggle_point(1);
        layout.toggle_point(3);

        // Assert
        assert_eq!(
            *seen.borrow(),
            vec![Sender::Point(1), Sender::DoublePoint { top: 2, bottom: 3 }]
        );
    }

    #[test]
    fn test_decoupler_surface() {
        let mut layout = make_layout();
        let (action, seen) = recorder();
        layout.set_action_of_all_decouplers(action);

        layout.toggle_decoupler(0);

        assert!(layout.position_of_decoupler(0));
        assert!(!layout.position_of_decoupler(1));
        assert_eq!(*seen.borrow(), vec![Sender::Decoupler(0)]);
    }

    #[test]
    fn test_take_redraws_drains_flags_in_device_order() {
        // Arrange
        let mut layout = make_layout();
        let signal = layout.add_signal(Direction::Forward);
        layout.toggle_decoupler(0);
        layout.toggle_point(1);
        layout.set_signal_state(signal.index(), SemaphoreState::Slow);

        // Act
        let redraws = layout.take_redraws();

        // Assert
        assert_eq!(redraws.len(), 3);
        assert!(matches!(redraws[0], Redraw::Point(_)));
        assert!(matches!(redraws[1], Redraw::Decoupler(_)));
        assert_eq!(redraws[2], Redraw::Signal(signal));
        assert!(layout.take_redraws().is_empty());
    }

    #[test]
    fn test_set_signal_state_with_unknown_index_is_a_no_op() {
        let mut layout = make_layout();
        layout.set_signal_state(5, SemaphoreState::Clear);
        assert!(layout.take_redraws().is_empty());
    }

    #[test]
    fn test_shadowed_point_stays_reachable_by_handle() {
        // Arrange
        let mut layout = Layout::new();
        let first = layout.add_point(7, Way::LeftHand, PointShape::default());
        let second = layout.add_point(7, Way::RightHand, PointShape::default());

        // Act
        layout.toggle_point(7);

        // Assert
        assert_eq!(layout.lookup_point(7), Some(second));
        let first_point = layout.point(first).expect("first point");
        assert_eq!(first_point.wished_position(7), Position::Straight);
        assert_eq!(layout.points().count(), 2);
    }
}
