//! Caniche protocol position codes.
//!
//! The numeric value of each variant is the code used on the device side of
//! the protocol.  [`CanichePosition::Unknown`] (0) stands for "no point" and
//! is also what any unrecognised raw code decodes to.

use serde::{Deserialize, Serialize};

use super::{Position, Way};

/// Position of a point as spoken by the Caniche device protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CanichePosition {
    /// Sentinel for "no such point" or an undecodable code.
    Unknown = 0,
    Right = 1,
    Middle = 2,
    Left = 3,
}

impl CanichePosition {
    /// Converts a raw protocol code to a [`CanichePosition`].
    ///
    /// Returns [`CanichePosition::Unknown`] for any value outside `1..=3`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => CanichePosition::Right,
            2 => CanichePosition::Middle,
            3 => CanichePosition::Left,
            _ => CanichePosition::Unknown,
        }
    }

    /// Returns the raw protocol code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Translates an internal [`Position`] to its Caniche code.
///
/// Pure and total: every input has an output, and the result depends only on
/// `(position, way)`.
pub fn to_caniche(position: Position, way: Way) -> CanichePosition {
    match (position, way) {
        (Position::Diagonal, Way::RightHand) => CanichePosition::Right,
        (Position::Diagonal, Way::LeftHand) => CanichePosition::Left,
        (Position::Straight, Way::RightHand) => CanichePosition::Left,
        (Position::Straight, Way::LeftHand) => CanichePosition::Right,
        (Position::Middle, _) => CanichePosition::Middle,
        (Position::None, _) => CanichePosition::Unknown,
    }
}

/// Translates a Caniche code to the internal [`Position`].
///
/// Inverse of [`to_caniche`] for the same `way`.  `Middle` maps to `Middle`,
/// which a point accepts as feedback but never as a wish.
pub fn to_position(code: CanichePosition, way: Way) -> Position {
    match (code, way) {
        (CanichePosition::Left, Way::RightHand) => Position::Straight,
        (CanichePosition::Left, Way::LeftHand) => Position::Diagonal,
        (CanichePosition::Right, Way::RightHand) => Position::Diagonal,
        (CanichePosition::Right, Way::LeftHand) => Position::Straight,
        (CanichePosition::Middle, _) => Position::Middle,
        (CanichePosition::Unknown, _) => Position::None,
    }
}
