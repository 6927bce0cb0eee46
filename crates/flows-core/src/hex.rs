//! Hex coordinate system using axial coordinates (row, col).
//!
//! This module provides the foundational coordinate types for the board:
//! - `HexPosition`: Identifies individual cells
//! - `Direction`: The six sides of a cell, in clockwise order
//!
//! The implicit third axial coordinate is `-(row + col)`, which is why a cell
//! lies within radius `R` iff `|row|`, `|col|` and `|row + col|` are all at
//! most `R`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axial coordinate of a board cell.
///
/// - `row` increases going south-east
/// - `col` increases going east
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct HexPosition {
    pub row: i32,
    pub col: i32,
}

impl HexPosition {
    /// Create a new position
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The cell adjacent across `direction`. Pure arithmetic: the result may
    /// lie off the board.
    pub fn neighbor(&self, direction: Direction) -> HexPosition {
        let (dr, dc) = direction.delta();
        HexPosition::new(self.row + dr, self.col + dc)
    }

    /// All six neighbors, indexed by direction
    pub fn neighbors(&self) -> [HexPosition; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance from the board center in hex steps
    pub fn ring(&self) -> i32 {
        self.row.abs().max(self.col.abs()).max((self.row + self.col).abs())
    }

    /// Distance to another cell (in hex steps)
    pub fn distance_to(&self, other: &HexPosition) -> u32 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        dr.abs().max(dc.abs()).max((dr + dc).abs()) as u32
    }

    /// The direction leading from this cell to an adjacent one, if adjacent
    pub fn direction_to(&self, other: &HexPosition) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| self.neighbor(*dir) == *other)
    }

    /// Scale a unit direction step by `n` from this cell
    pub(crate) fn step(&self, direction: Direction, n: i32) -> HexPosition {
        let (dr, dc) = direction.delta();
        HexPosition::new(self.row + dr * n, self.col + dc * n)
    }
}

impl fmt::Display for HexPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the six sides of a cell, numbered clockwise from north-west.
///
/// Serialized as its index (0-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    /// Upper-left side
    NorthWest = 0,
    /// Upper-right side
    NorthEast = 1,
    /// Right side
    East = 2,
    /// Lower-right side
    SouthEast = 3,
    /// Lower-left side
    SouthWest = 4,
    /// Left side
    West = 5,
}

impl Direction {
    /// All directions in clockwise order starting from NorthWest
    pub const ALL: [Direction; 6] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
    ];

    /// Direction for an index, taken modulo 6
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// (row delta, col delta) to the adjacent cell on this side
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::NorthWest => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
        }
    }

    /// Rotate clockwise by `steps` sixths of a turn
    pub const fn rotate(self, steps: u8) -> Self {
        Self::from_index(self.index() + steps as usize)
    }

    /// Rotate counter-clockwise by `steps` sixths of a turn
    pub const fn rotate_back(self, steps: u8) -> Self {
        Self::from_index(self.index() + 6 - (steps as usize % 6))
    }

    /// The side facing this one across a shared cell boundary
    pub const fn opposite(self) -> Self {
        self.rotate(3)
    }

    /// Whether two sides touch at a cell corner
    pub fn is_adjacent_to(self, other: Direction) -> bool {
        let diff = (self.index() + 6 - other.index()) % 6;
        diff == 1 || diff == 5
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 6 {
            Ok(Direction::from_index(value as usize))
        } else {
            Err(format!("invalid direction index {value}, expected 0-5"))
        }
    }
}

/// Serde adapter for maps keyed by `HexPosition`.
///
/// JSON objects only take string keys, so position-keyed maps are written as
/// a sequence of `[position, value]` pairs in key order.
pub(crate) mod position_map {
    use super::HexPosition;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S, V>(map: &BTreeMap<HexPosition, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<HexPosition, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let entries: Vec<(HexPosition, V)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
