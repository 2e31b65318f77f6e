//! Point position vocabularies and the translation between them.
//!
//! Two vocabularies describe where a point (turnout) is set:
//!
//! - [`Position`] is the internal one used by the layout: `Straight`,
//!   `Diagonal`, plus the transient `Middle` reported while the motor is
//!   moving and the `None` sentinel for "no such point".
//! - [`CanichePosition`] is the vocabulary of the Caniche device protocol
//!   spoken by the hardware driver: `Left`, `Right`, `Middle`, `Unknown`.
//!
//! # Why does the translation depend on the orientation? (for beginners)
//!
//! A turnout motor only knows which way its blade is thrown, left or right.
//! Whether "left" means the straight or the diverging route depends on how
//! the turnout is laid: on a right-hand turnout the diverging track leaves to
//! the right, so `Diagonal` is `Right`; on a left-hand turnout it is the
//! reverse.  The [`Way`] chosen when the point is built fixes this once and
//! for all, and the mapping is recomputed from it on every call; it is never
//! stored.
//!
//! | Position   | Way::RightHand | Way::LeftHand |
//! |------------|----------------|---------------|
//! | `Diagonal` | `Right`        | `Left`        |
//! | `Straight` | `Left`         | `Right`       |
//! | `Middle`   | `Middle`       | `Middle`      |
//! | `None`     | `Unknown`      | `Unknown`     |

pub mod caniche;

pub use caniche::CanichePosition;

use serde::{Deserialize, Serialize};

/// Internal position of a point.
///
/// Only `Straight` and `Diagonal` can be wished.  `Middle` is legal as an
/// actual (feedback) position while the motor is in transit.  `None` is the
/// sentinel returned for identifiers that resolve to no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Straight,
    Middle,
    Diagonal,
    /// No such point, or an invalid identifier.
    None,
}

impl Position {
    /// Returns `true` for the two positions a point can be commanded to.
    pub fn is_commandable(self) -> bool {
        matches!(self, Position::Straight | Position::Diagonal)
    }

    /// Returns the opposite commandable position.
    ///
    /// `Middle` and `None` have no opposite and are returned unchanged.
    pub fn toggled(self) -> Self {
        match self {
            Position::Straight => Position::Diagonal,
            Position::Diagonal => Position::Straight,
            other => other,
        }
    }
}

/// Fixed left-hand / right-hand orientation of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Way {
    #[default]
    LeftHand,
    RightHand,
}

impl Way {
    /// Translates an internal position to its Caniche code for this orientation.
    pub fn to_caniche(self, position: Position) -> CanichePosition {
        caniche::to_caniche(position, self)
    }

    /// Translates a Caniche code to the internal position for this orientation.
    pub fn to_position(self, code: CanichePosition) -> Position {
        caniche::to_position(code, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_straight_and_diagonal_are_commandable() {
        assert!(Position::Straight.is_commandable());
        assert!(Position::Diagonal.is_commandable());
        assert!(!Position::Middle.is_commandable());
        assert!(!Position::None.is_commandable());
    }

    #[test]
    fn test_toggled_swaps_straight_and_diagonal() {
        assert_eq!(Position::Straight.toggled(), Position::Diagonal);
        assert_eq!(Position::Diagonal.toggled(), Position::Straight);
    }

    #[test]
    fn test_toggled_leaves_middle_and_none_unchanged() {
        assert_eq!(Position::Middle.toggled(), Position::Middle);
        assert_eq!(Position::None.toggled(), Position::None);
    }

    #[test]
    fn test_way_methods_delegate_to_the_translation_table() {
        assert_eq!(
            Way::RightHand.to_caniche(Position::Diagonal),
            CanichePosition::Right
        );
        assert_eq!(
            Way::LeftHand.to_position(CanichePosition::Right),
            Position::Straight
        );
    }

    #[test]
    fn test_way_deserializes_from_snake_case_toml() {
        // Arrange
        #[derive(Deserialize)]
        struct Entry {
            way: Way,
            position: Position,
        }

        // Act
        let entry: Entry =
            toml::from_str("way = \"right_hand\"\nposition = \"diagonal\"").expect("parse");

        // Assert
        assert_eq!(entry.way, Way::RightHand);
        assert_eq!(entry.position, Position::Diagonal);
    }
}
