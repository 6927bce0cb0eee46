//! Game board representation: occupancy and edge geometry.
//!
//! This module contains:
//! - `Edge`: the six sides of the hexagonal board, where players sit
//! - `EdgeGeometry`: which boundary crossings belong to which edge
//! - `Board`: radius-bounded cells and the tiles placed on them

use crate::game::GameError;
use crate::hex::{Direction, HexPosition};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One of the six sides of the board (0-5, clockwise from the top).
///
/// Edge `a` is crossed by leaving a boundary cell through side `a` or
/// side `a + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Edge(u8);

impl Edge {
    pub const ALL: [Edge; 6] = [Edge(0), Edge(1), Edge(2), Edge(3), Edge(4), Edge(5)];

    pub const fn new(index: u8) -> Option<Self> {
        if index < 6 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The edge `steps` places further clockwise
    pub const fn rotate(self, steps: usize) -> Self {
        Self(((self.0 as usize + steps) % 6) as u8)
    }

    pub const fn opposite(self) -> Self {
        self.rotate(3)
    }

    /// The two cell sides that cross this edge
    pub const fn crossing_directions(self) -> [Direction; 2] {
        let first = Direction::from_index(self.0 as usize);
        [first, first.rotate(1)]
    }
}

impl From<Edge> for u8 {
    fn from(edge: Edge) -> u8 {
        edge.0
    }
}

impl TryFrom<u8> for Edge {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Edge::new(value).ok_or_else(|| format!("invalid edge {value}, expected 0-5"))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge {}", self.0)
    }
}

/// Boundary crossings of a board of a given radius, grouped by edge.
///
/// Side `a` runs from the corner cell `R·v(a)` along direction `a + 2` to the
/// corner `R·v(a + 1)`. Every cell on it is crossed through sides `a` and
/// `a + 1`, except the far corner, whose side `a + 1` points at the next
/// edge's first corner and is counted there. Corner cells therefore sit in
/// two edges' lists, each time with a different direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeGeometry {
    entry_points: [Vec<(HexPosition, Direction)>; 6],
    crossings: HashMap<(HexPosition, Direction), Edge>,
}

impl EdgeGeometry {
    pub fn new(radius: i32) -> Self {
        let center = HexPosition::new(0, 0);
        let mut crossings = HashMap::new();
        let entry_points = Edge::ALL.map(|edge| {
            let [outward, next] = edge.crossing_directions();
            let along = outward.rotate(2);
            let corner = center.step(outward, radius);
            let mut points = Vec::with_capacity(2 * radius as usize + 1);
            for t in 0..=radius {
                let cell = corner.step(along, t);
                points.push((cell, outward));
                if t < radius {
                    points.push((cell, next));
                }
            }
            for point in &points {
                crossings.insert(*point, edge);
            }
            points
        });
        Self {
            entry_points,
            crossings,
        }
    }

    pub fn entry_points(&self, edge: Edge) -> &[(HexPosition, Direction)] {
        &self.entry_points[edge.index()]
    }

    pub fn crossing_edge(&self, position: HexPosition, direction: Direction) -> Option<Edge> {
        self.crossings.get(&(position, direction)).copied()
    }
}

/// A tile committed to a board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub position: HexPosition,
    pub tile: Tile,
}

/// The hexagonal board.
///
/// Occupied cells are keyed by position; unoccupied cells are simply absent.
/// Tiles are never removed or replaced once placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardSnapshot", into = "BoardSnapshot")]
pub struct Board {
    radius: i32,
    tiles: BTreeMap<HexPosition, Tile>,
    geometry: EdgeGeometry,
}

/// Serialized form of a board: radius plus placed tiles in position order
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardSnapshot {
    radius: i32,
    tiles: Vec<PlacedTile>,
}

impl Board {
    /// Create an empty board
    pub fn new(radius: i32) -> Result<Self, GameError> {
        if radius < 1 {
            return Err(GameError::InvalidRuleset(format!(
                "board radius must be at least 1, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            tiles: BTreeMap::new(),
            geometry: EdgeGeometry::new(radius),
        })
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Check that a position lies on this board
    pub fn is_valid_position(&self, position: HexPosition) -> bool {
        position.ring() <= self.radius
    }

    /// All cells of the board in (row, col) order
    pub fn positions(&self) -> impl Iterator<Item = HexPosition> + '_ {
        let r = self.radius;
        (-r..=r).flat_map(move |row| {
            (-r..=r)
                .map(move |col| HexPosition::new(row, col))
                .filter(move |pos| pos.ring() <= r)
        })
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        (3 * self.radius * (self.radius + 1) + 1) as usize
    }

    /// The adjacent position across `direction` (not bounds checked)
    pub fn neighbor(&self, position: HexPosition, direction: Direction) -> HexPosition {
        position.neighbor(direction)
    }

    /// The adjacent position across `direction`, if it is on the board
    pub fn neighbor_on_board(&self, position: HexPosition, direction: Direction) -> Option<HexPosition> {
        let next = position.neighbor(direction);
        self.is_valid_position(next).then_some(next)
    }

    /// Boundary cells of an edge with the side through which a flow enters
    /// each from outside the board
    pub fn edge_entry_points(&self, edge: Edge) -> &[(HexPosition, Direction)] {
        self.geometry.entry_points(edge)
    }

    /// The edge crossed by leaving `position` through `direction`, or `None`
    /// if that side faces another cell
    pub fn crossing_edge(&self, position: HexPosition, direction: Direction) -> Option<Edge> {
        self.geometry.crossing_edge(position, direction)
    }

    pub fn tile_at(&self, position: HexPosition) -> Option<Tile> {
        self.tiles.get(&position).copied()
    }

    pub fn is_occupied(&self, position: HexPosition) -> bool {
        self.tiles.contains_key(&position)
    }

    /// Placed tiles in position order
    pub fn tiles(&self) -> impl Iterator<Item = PlacedTile> + '_ {
        self.tiles.iter().map(|(position, tile)| PlacedTile {
            position: *position,
            tile: *tile,
        })
    }

    pub fn empty_positions(&self) -> impl Iterator<Item = HexPosition> + '_ {
        self.positions().filter(|pos| !self.is_occupied(*pos))
    }

    /// Number of placed tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tiles.len() >= self.cell_count()
    }

    /// Check that a tile could be put at `position`
    pub fn check_placeable(&self, position: HexPosition) -> Result<(), GameError> {
        if !self.is_valid_position(position) {
            return Err(GameError::InvalidPosition);
        }
        if self.is_occupied(position) {
            return Err(GameError::PositionOccupied);
        }
        Ok(())
    }

    /// Put a tile on an empty cell
    pub fn place(&mut self, position: HexPosition, tile: Tile) -> Result<(), GameError> {
        self.check_placeable(position)?;
        self.tiles.insert(position, tile);
        Ok(())
    }

    /// A copy of this board with one more tile placed
    pub fn with_tile(&self, position: HexPosition, tile: Tile) -> Result<Board, GameError> {
        let mut board = self.clone();
        board.place(position, tile)?;
        Ok(board)
    }

    /// Remove every tile, keeping the radius
    pub(crate) fn cleared(&self) -> Board {
        Board {
            radius: self.radius,
            tiles: BTreeMap::new(),
            geometry: self.geometry.clone(),
        }
    }
}

impl TryFrom<BoardSnapshot> for Board {
    type Error = GameError;

    fn try_from(snapshot: BoardSnapshot) -> Result<Self, Self::Error> {
        let mut board = Board::new(snapshot.radius)?;
        for placed in snapshot.tiles {
            board.place(placed.position, placed.tile)?;
        }
        Ok(board)
    }
}

impl From<Board> for BoardSnapshot {
    fn from(board: Board) -> Self {
        BoardSnapshot {
            radius: board.radius,
            tiles: board.tiles().collect(),
        }
    }
}

impl fmt::Display for Board {
    /// Text rendering: `.` for an empty cell, the sharp count for a tile
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.radius;
        for row in -r..=r {
            write!(f, "{}", " ".repeat(row.unsigned_abs() as usize))?;
            for col in -r..=r {
                let pos = HexPosition::new(row, col);
                if pos.ring() > r {
                    continue;
                }
                match self.tile_at(pos) {
                    Some(tile) => write!(f, "{} ", tile.tile_type.num_sharps())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
