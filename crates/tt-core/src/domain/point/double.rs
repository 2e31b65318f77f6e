//! Double point: two sub-points (`top` and `bottom`) on one device.
//!
//! Each half has its own identifier and its own wished/actual/pending state,
//! and both halves share one [`Way`].  How a touch acts on the halves depends
//! on the [`DoublePointSize`]:
//!
//! - `Normal` and `Large`: the halves are synchronised; a touch toggles both.
//! - `LargeNoSync`: the device is split in four [`Quadrant`]s.  Quadrants on
//!   a half's diverging side toggle that half alone; quadrants on the shared
//!   track side force both halves to the same position.
//!
//! | quadrant     | Way::RightHand  | Way::LeftHand   |
//! |--------------|-----------------|-----------------|
//! | bottom-left  | set diagonal    | toggle bottom   |
//! | bottom-right | toggle bottom   | set diagonal    |
//! | top-left     | toggle top      | set straight    |
//! | top-right    | set straight    | toggle top      |

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use super::PointControl;
use crate::domain::notify::{Action, ActionSlot, PendingWish, Sender};
use crate::domain::registry::PointId;
use crate::position::{Position, Way};

/// Synchronisation mode of a double point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoublePointSize {
    #[default]
    Normal,
    Large,
    /// Large device whose halves are commanded independently.
    LargeNoSync,
}

/// One quarter of a double point's touch area.
///
/// The raw index is `2 * row + column`, rows counted from the bottom and
/// columns from the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Quadrant {
    BottomLeft = 0,
    BottomRight = 1,
    TopLeft = 2,
    TopRight = 3,
}

/// Raw quadrant index outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid quadrant index {0}: expected 0..=3")]
pub struct QuadrantError(pub u8);

impl TryFrom<u8> for Quadrant {
    type Error = QuadrantError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quadrant::BottomLeft),
            1 => Ok(Quadrant::BottomRight),
            2 => Ok(Quadrant::TopLeft),
            3 => Ok(Quadrant::TopRight),
            other => Err(QuadrantError(other)),
        }
    }
}

/// What touching a quadrant does to a `LargeNoSync` double point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantAction {
    ToggleTop,
    ToggleBottom,
    SetStraight,
    SetDiagonal,
}

impl QuadrantAction {
    /// Looks up the quadrant table for orientation `way`.
    pub fn for_touch(quadrant: Quadrant, way: Way) -> Self {
        match (quadrant, way) {
            (Quadrant::BottomLeft, Way::RightHand) => QuadrantAction::SetDiagonal,
            (Quadrant::BottomLeft, Way::LeftHand) => QuadrantAction::ToggleBottom,
            (Quadrant::BottomRight, Way::RightHand) => QuadrantAction::ToggleBottom,
            (Quadrant::BottomRight, Way::LeftHand) => QuadrantAction::SetDiagonal,
            (Quadrant::TopLeft, Way::RightHand) => QuadrantAction::ToggleTop,
            (Quadrant::TopLeft, Way::LeftHand) => QuadrantAction::SetStraight,
            (Quadrant::TopRight, Way::RightHand) => QuadrantAction::SetStraight,
            (Quadrant::TopRight, Way::LeftHand) => QuadrantAction::ToggleTop,
        }
    }
}

/// State of one half of a double point.
#[derive(Debug, Clone)]
struct Half {
    id: PointId,
    wished: Position,
    actual: Position,
    pending: bool,
    toggled: bool,
}

impl Half {
    fn new(id: PointId) -> Self {
        Self {
            id,
            wished: Position::Straight,
            actual: Position::Straight,
            pending: false,
            toggled: false,
        }
    }

    /// Applies a wish addressed to `id`; returns `true` if it was accepted.
    fn wish(&mut self, id: PointId, position: Position) -> bool {
        if id != self.id || position == self.wished || !position.is_commandable() {
            return false;
        }
        self.force(position);
        true
    }

    /// Applies feedback addressed to `id`; returns `true` if it was accepted.
    fn report(&mut self, id: PointId, position: Position) -> bool {
        if id != self.id || position == self.actual {
            return false;
        }
        self.actual = position;
        if self.actual == self.wished {
            self.pending = false;
        }
        true
    }

    fn flip(&mut self) {
        self.force(self.wished.toggled());
    }

    fn force(&mut self, position: Position) {
        self.wished = position;
        self.pending = true;
        self.toggled = true;
    }

    fn take_edge(&mut self) -> Option<PendingWish<Position>> {
        if !self.toggled {
            return None;
        }
        self.toggled = false;
        Some(PendingWish {
            point_id: self.id,
            position: self.wished,
        })
    }
}

/// A double slip or three-way style device made of two points.
#[derive(Debug)]
pub struct DoublePoint {
    top: Half,
    bottom: Half,
    way: Way,
    size: DoublePointSize,
    reversed: bool,
    needs_display: bool,
    action: ActionSlot,
}

impl DoublePoint {
    /// Creates a double point with both halves straight and idle.
    pub fn new(
        top_id: PointId,
        bottom_id: PointId,
        way: Way,
        size: DoublePointSize,
        reversed: bool,
    ) -> Self {
        Self {
            top: Half::new(top_id),
            bottom: Half::new(bottom_id),
            way,
            size,
            reversed,
            needs_display: false,
            action: ActionSlot::default(),
        }
    }

    pub fn top_id(&self) -> PointId {
        self.top.id
    }

    pub fn bottom_id(&self) -> PointId {
        self.bottom.id
    }

    pub fn size(&self) -> DoublePointSize {
        self.size
    }

    /// Drawn mirrored; rendering only.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// Reacts to a touch in `quadrant`.
    ///
    /// Outside `LargeNoSync` mode the quadrant does not matter and both
    /// halves toggle together.
    pub fn touch(&mut self, quadrant: Quadrant) {
        if self.size != DoublePointSize::LargeNoSync {
            self.toggle();
            return;
        }
        match QuadrantAction::for_touch(quadrant, self.way) {
            QuadrantAction::ToggleTop => self.toggle_top(),
            QuadrantAction::ToggleBottom => self.toggle_bottom(),
            QuadrantAction::SetStraight => self.set_straight(),
            QuadrantAction::SetDiagonal => self.set_diagonal(),
        }
    }

    /// Toggles the top half only.
    pub fn toggle_top(&mut self) {
        self.top.flip();
        debug!(point_id = self.top.id, wished = ?self.top.wished, "top half toggled");
        self.changed();
    }

    /// Toggles the bottom half only.
    pub fn toggle_bottom(&mut self) {
        self.bottom.flip();
        debug!(point_id = self.bottom.id, wished = ?self.bottom.wished, "bottom half toggled");
        self.changed();
    }

    /// Wishes both halves straight, even if they already are.
    pub fn set_straight(&mut self) {
        self.set_both(Position::Straight);
    }

    /// Wishes both halves diagonal, even if they already are.
    pub fn set_diagonal(&mut self) {
        self.set_both(Position::Diagonal);
    }

    fn set_both(&mut self, position: Position) {
        self.top.force(position);
        self.bottom.force(position);
        debug!(
            top = self.top.id,
            bottom = self.bottom.id,
            ?position,
            "both halves wished"
        );
        self.changed();
    }

    fn half(&self, id: PointId) -> Option<&Half> {
        if id == self.top.id {
            Some(&self.top)
        } else if id == self.bottom.id {
            Some(&self.bottom)
        } else {
            None
        }
    }

    fn changed(&mut self) {
        self.action.fire(self.sender());
        self.needs_display = true;
    }
}

impl PointControl for DoublePoint {
    fn way(&self) -> Way {
        self.way
    }

    fn sender(&self) -> Sender {
        Sender::DoublePoint {
            top: self.top.id,
            bottom: self.bottom.id,
        }
    }

    fn set_actual_position(&mut self, id: PointId, position: Position) {
        if self.top.report(id, position) || self.bottom.report(id, position) {
            debug!(point_id = id, ?position, "actual position changed");
            self.needs_display = true;
        } else {
            trace!(point_id = id, ?position, "actual position ignored");
        }
    }

    fn set_wished_position(&mut self, id: PointId, position: Position) {
        if self.top.wish(id, position) || self.bottom.wish(id, position) {
            debug!(point_id = id, ?position, "wished position changed");
            self.changed();
        } else {
            trace!(point_id = id, ?position, "wished position ignored");
        }
    }

    fn actual_position(&self, id: PointId) -> Position {
        self.half(id).map_or(Position::None, |half| half.actual)
    }

    fn wished_position(&self, id: PointId) -> Position {
        self.half(id).map_or(Position::None, |half| half.wished)
    }

    fn is_pending(&self, id: PointId) -> bool {
        self.half(id).is_some_and(|half| half.pending)
    }

    /// Toggles both halves and fires a single notification.
    fn toggle(&mut self) {
        self.top.flip();
        self.bottom.flip();
        debug!(
            top = self.top.id,
            bottom = self.bottom.id,
            "double point toggled"
        );
        self.changed();
    }

    /// Consumes the top edge first, then the bottom one; one per call.
    fn pending_wish(&mut self) -> Option<PendingWish<Position>> {
        self.top.take_edge().or_else(|| self.bottom.take_edge())
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const TOP: PointId = 10;
    const BOTTOM: PointId = 11;

    fn make_double(way: Way, size: DoublePointSize) -> DoublePoint {
        DoublePoint::new(TOP, BOTTOM, way, size, false)
    }

    fn count_notifications(point: &mut DoublePoint) -> Rc<Cell<u32>> {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        point.set_action(Rc::new(move |_: Sender| counter.set(counter.get() + 1)));
        calls
    }

    fn wishes(point: &DoublePoint) -> (Position, Position) {
        (point.wished_position(TOP), point.wished_position(BOTTOM))
    }

    // ── quadrant decoding ─────────────────────────────────────────────────────

    #[test]
    fn test_quadrant_try_from_decodes_row_major_index() {
        assert_eq!(Quadrant::try_from(0), Ok(Quadrant::BottomLeft));
        assert_eq!(Quadrant::try_from(1), Ok(Quadrant::BottomRight));
        assert_eq!(Quadrant::try_from(2), Ok(Quadrant::TopLeft));
        assert_eq!(Quadrant::try_from(3), Ok(Quadrant::TopRight));
    }

    #[test]
    fn test_quadrant_try_from_rejects_index_above_three() {
        let err = Quadrant::try_from(4).unwrap_err();
        assert_eq!(err, QuadrantError(4));
        assert_eq!(err.to_string(), "invalid quadrant index 4: expected 0..=3");
    }

    // ── synchronised modes ────────────────────────────────────────────────────

    #[test]
    fn test_toggle_flips_both_halves_with_one_notification() {
        // Arrange
        let mut point = make_double(Way::RightHand, DoublePointSize::Normal);
        let calls = count_notifications(&mut point);

        // Act
        point.toggle();

        // Assert
        assert_eq!(wishes(&point), (Position::Diagonal, Position::Diagonal));
        assert!(point.is_pending(TOP));
        assert!(point.is_pending(BOTTOM));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_touch_outside_no_sync_mode_ignores_quadrant() {
        for size in [DoublePointSize::Normal, DoublePointSize::Large] {
            let mut point = make_double(Way::RightHand, size);

            point.touch(Quadrant::BottomRight);

            assert_eq!(wishes(&point), (Position::Diagonal, Position::Diagonal));
        }
    }

    // ── LargeNoSync quadrant table ────────────────────────────────────────────

    #[test]
    fn test_right_hand_bottom_left_sets_both_diagonal() {
        let mut point = make_double(Way::RightHand, DoublePointSize::LargeNoSync);

        point.touch(Quadrant::BottomLeft);

        assert_eq!(wishes(&point), (Position::Diagonal, Position::Diagonal));
        assert!(point.is_pending(TOP) && point.is_pending(BOTTOM));
    }

    #[test]
    fn test_right_hand_bottom_right_toggles_bottom_only() {
        let mut point = make_double(Way::RightHand, DoublePointSize::LargeNoSync);

        point.touch(Quadrant::BottomRight);

        assert_eq!(wishes(&point), (Position::Straight, Position::Diagonal));
        assert!(!point.is_pending(TOP));
        assert!(point.is_pending(BOTTOM));
    }

    #[test]
    fn test_right_hand_top_quadrants() {
        let mut point = make_double(Way::RightHand, DoublePointSize::LargeNoSync);

        point.touch(Quadrant::TopLeft);
        assert_eq!(wishes(&point), (Position::Diagonal, Position::Straight));

        point.touch(Quadrant::TopRight);
        assert_eq!(wishes(&point), (Position::Straight, Position::Straight));
        assert!(point.is_pending(BOTTOM), "set_straight marks both halves pending");
    }

    #[test]
    fn test_left_hand_quadrant_table_is_mirrored() {
        let cases = [
            (Quadrant::BottomLeft, QuadrantAction::ToggleBottom),
            (Quadrant::BottomRight, QuadrantAction::SetDiagonal),
            (Quadrant::TopLeft, QuadrantAction::SetStraight),
            (Quadrant::TopRight, QuadrantAction::ToggleTop),
        ];
        for (quadrant, expected) in cases {
            assert_eq!(QuadrantAction::for_touch(quadrant, Way::LeftHand), expected);
        }
    }

    #[test]
    fn test_left_hand_top_right_toggles_top_only() {
        let mut point = make_double(Way::LeftHand, DoublePointSize::LargeNoSync);
        let calls = count_notifications(&mut point);

        point.touch(Quadrant::TopRight);

        assert_eq!(wishes(&point), (Position::Diagonal, Position::Straight));
        assert_eq!(calls.get(), 1);
    }

    // ── set_wished_position / set_actual_position ─────────────────────────────

    #[test]
    fn test_set_wished_position_addresses_one_half() {
        let mut point = make_double(Way::RightHand, DoublePointSize::Normal);

        point.set_wished_position(BOTTOM, Position::Diagonal);

        assert_eq!(wishes(&point), (Position::Straight, Position::Diagonal));
        assert!(!point.is_pending(TOP));
        assert!(point.is_pending(BOTTOM));
    }

    #[test]
    fn test_set_wished_position_rejects_middle() {
        let mut point = make_double(Way::RightHand, DoublePointSize::Normal);
        let calls = count_notifications(&mut point);

        point.set_wished_position(TOP, Position::Middle);

        assert_eq!(point.wished_position(TOP), Position::Straight);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_actual_clears_pending_per_half() {
        // Arrange
        let mut point = make_double(Way::RightHand, DoublePointSize::Normal);
        point.toggle();

        // Act
        point.set_actual_position(TOP, Position::Diagonal);

        // Assert
        assert!(!point.is_pending(TOP));
        assert!(point.is_pending(BOTTOM));
        assert_eq!(point.actual_position(TOP), Position::Diagonal);
        assert_eq!(point.actual_position(BOTTOM), Position::Straight);
    }

    #[test]
    fn test_foreign_id_reads_sentinel() {
        let point = make_double(Way::RightHand, DoublePointSize::Normal);

        assert_eq!(point.actual_position(12), Position::None);
        assert_eq!(point.wished_position(12), Position::None);
        assert!(!point.is_pending(12));
    }

    // ── pending_wish ──────────────────────────────────────────────────────────

    #[test]
    fn test_pending_wish_drains_top_then_bottom() {
        // Arrange
        let mut point = make_double(Way::RightHand, DoublePointSize::Normal);
        point.toggle();

        // Act
        let first = point.pending_wish();
        let second = point.pending_wish();
        let third = point.pending_wish();

        // Assert
        assert_eq!(first.map(|w| w.point_id), Some(TOP));
        assert_eq!(second.map(|w| w.point_id), Some(BOTTOM));
        assert_eq!(third, None);
    }

    #[test]
    fn test_pending_wish_returns_bottom_when_only_bottom_toggled() {
        let mut point = make_double(Way::LeftHand, DoublePointSize::LargeNoSync);

        point.toggle_bottom();

        assert_eq!(
            point.pending_wish(),
            Some(PendingWish {
                point_id: BOTTOM,
                position: Position::Diagonal
            })
        );
        assert_eq!(point.pending_wish(), None);
    }

    #[test]
    fn test_touch_requests_redraw() {
        let mut point = make_double(Way::RightHand, DoublePointSize::LargeNoSync);

        point.touch(Quadrant::TopLeft);

        assert!(point.take_needs_display());
        assert!(!point.take_needs_display());
    }
}
