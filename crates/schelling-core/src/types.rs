//! Core type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offsets of the eight cells surrounding a position (Moore neighborhood)
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Cell coordinate in the grid.
///
/// Coordinates are signed so that neighbor offsets may step off the grid;
/// whether a position is inside a given grid is decided by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// The eight surrounding positions, including ones that may lie off-grid
    pub fn surrounding(&self) -> impl Iterator<Item = Position> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(d_row, d_col)| self.offset(d_row, d_col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Value held by a grid cell: nothing, or an agent of kind `K`.
///
/// Kinds are opaque labels compared by value. Occupants are never mutated;
/// cells are reassigned instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant<K> {
    Empty,
    Agent(K),
}

impl<K> Occupant<K> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    pub fn kind(&self) -> Option<&K> {
        match self {
            Occupant::Empty => None,
            Occupant::Agent(kind) => Some(kind),
        }
    }
}

impl<K> Default for Occupant<K> {
    fn default() -> Self {
        Occupant::Empty
    }
}

/// Per-cell satisfaction, derived fresh on every step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Satisfaction {
    Satisfied,
    Unsatisfied,
    /// Empty cells have no opinion
    NotApplicable,
}

/// Tolerance for dissimilar neighbors, in `[0, 1]`.
///
/// A cell is unsatisfied when the fraction of its non-empty neighbors that
/// share its kind drops below `1 - threshold`, so raising the threshold
/// makes agents easier to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(pub(crate) f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, Error> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Minimum same-kind neighbor fraction for a cell to be satisfied
    pub fn required_similarity(&self) -> f64 {
        1.0 - self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounding_positions() {
        let pos = Position::new(0, 0);
        let around: Vec<Position> = pos.surrounding().collect();
        assert_eq!(around.len(), 8);
        assert!(around.contains(&Position::new(-1, -1)));
        assert!(around.contains(&Position::new(1, 1)));
        assert!(!around.contains(&pos));
    }

    #[test]
    fn test_occupant_kind() {
        let agent: Occupant<char> = Occupant::Agent('r');
        assert_eq!(agent.kind(), Some(&'r'));
        assert!(!agent.is_empty());

        let empty: Occupant<char> = Occupant::default();
        assert_eq!(empty.kind(), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
        assert!(matches!(
            Threshold::new(1.5),
            Err(Error::InvalidThreshold(_))
        ));
        assert!(Threshold::new(-0.1).is_err());
        assert!(Threshold::new(f64::NAN).is_err());
    }

    #[test]
    fn test_threshold_required_similarity() {
        let threshold = Threshold::new(0.25).unwrap();
        assert_eq!(threshold.required_similarity(), 0.75);
    }

    #[test]
    fn test_threshold_deserialization_validates() {
        let ok: Threshold = serde_json::from_str("0.5").unwrap();
        assert_eq!(ok.value(), 0.5);
        assert!(serde_json::from_str::<Threshold>("2.0").is_err());
    }
}
