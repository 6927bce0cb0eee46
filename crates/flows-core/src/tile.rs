//! Tile types and their internal path segments.
//!
//! Every tile joins its six sides in three disjoint pairs, so a flow entering
//! through any side leaves through exactly one other side. The four types
//! differ only in how many of those pairs are "sharp" (join two sides that
//! touch at a corner).

use crate::hex::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of connection patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    /// Two gentle curves and a straight
    NoSharps = 0,
    /// One sharp turn and two gentle curves
    OneSharp = 1,
    /// Two sharp turns around a straight
    TwoSharps = 2,
    /// Three sharp turns
    ThreeSharps = 3,
}

impl TileType {
    pub const ALL: [TileType; 4] = [
        TileType::NoSharps,
        TileType::OneSharp,
        TileType::TwoSharps,
        TileType::ThreeSharps,
    ];

    pub fn num_sharps(self) -> usize {
        self as usize
    }

    pub fn from_num_sharps(n: usize) -> Option<Self> {
        Self::ALL.get(n).copied()
    }

    /// Partner of each side in the unrotated tile, indexed by side
    const fn base_partners(self) -> [u8; 6] {
        match self {
            // (0,2) (1,4) (3,5)
            TileType::NoSharps => [2, 4, 0, 5, 1, 3],
            // (0,5) (1,3) (2,4)
            TileType::OneSharp => [5, 3, 4, 1, 2, 0],
            // (0,5) (1,4) (2,3)
            TileType::TwoSharps => [5, 4, 3, 2, 1, 0],
            // (0,5) (1,2) (3,4)
            TileType::ThreeSharps => [5, 2, 1, 4, 3, 0],
        }
    }

    /// Rotations that give distinct connection maps, in ascending order.
    ///
    /// Symmetric types repeat themselves under some rotations; legality
    /// checks only need to try each distinct layout once.
    pub fn distinct_rotations(self) -> Vec<Rotation> {
        let mut seen: Vec<Connections> = Vec::with_capacity(6);
        let mut rotations = Vec::with_capacity(6);
        for rotation in Rotation::ALL {
            let connections = Tile::new(self, rotation).connections();
            if !seen.contains(&connections) {
                seen.push(connections);
                rotations.push(rotation);
            }
        }
        rotations
    }

    /// Some tile joining sides `a` and `b`, if `a != b`
    pub fn connecting(a: Direction, b: Direction) -> Option<Tile> {
        Self::ALL.into_iter().find_map(|tile_type| {
            Rotation::ALL
                .into_iter()
                .map(|rotation| Tile::new(tile_type, rotation))
                .find(|tile| a != b && tile.exit(a) == b)
        })
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.num_sharps())
    }
}

/// Clockwise rotation in sixths of a turn (0-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const ALL: [Rotation; 6] = [
        Rotation(0),
        Rotation(1),
        Rotation(2),
        Rotation(3),
        Rotation(4),
        Rotation(5),
    ];

    /// Create a rotation, wrapping values of 6 and above
    pub const fn new(steps: u8) -> Self {
        Self(steps % 6)
    }

    pub const fn steps(self) -> u8 {
        self.0
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> u8 {
        rotation.0
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 6 {
            Ok(Rotation(value))
        } else {
            Err(format!("invalid rotation {value}, expected 0-5"))
        }
    }
}

/// A tile type at a particular rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub tile_type: TileType,
    pub rotation: Rotation,
}

impl Tile {
    pub const fn new(tile_type: TileType, rotation: Rotation) -> Self {
        Self {
            tile_type,
            rotation,
        }
    }

    /// The full side-to-side pairing of this tile after rotation
    pub fn connections(&self) -> Connections {
        let steps = self.rotation.steps();
        let partners = self.tile_type.base_partners();
        Connections(Direction::ALL.map(|side| {
            let unrotated = side.rotate_back(steps);
            Direction::from_index(partners[unrotated.index()] as usize).rotate(steps)
        }))
    }

    /// The side a flow leaves through after entering through `entry`
    pub fn exit(&self, entry: Direction) -> Direction {
        self.connections().exit(entry)
    }
}

/// Rotated pairing of a tile's sides, indexed by entry side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connections([Direction; 6]);

impl Connections {
    pub fn exit(&self, entry: Direction) -> Direction {
        self.0[entry.index()]
    }

    /// Every (entry, exit) pair, one per side
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Direction)> + '_ {
        Direction::ALL.into_iter().map(|entry| (entry, self.exit(entry)))
    }

    /// The three segments, each as (lower side, higher side)
    pub fn segments(&self) -> [(Direction, Direction); 3] {
        let mut segments = [(Direction::NorthWest, Direction::NorthWest); 3];
        let mut n = 0;
        for (entry, exit) in self.iter() {
            if entry < exit && n < 3 {
                segments[n] = (entry, exit);
                n += 1;
            }
        }
        segments
    }

    /// Number of segments joining sides that touch at a corner
    pub fn sharp_count(&self) -> usize {
        self.segments()
            .iter()
            .filter(|(a, b)| a.is_adjacent_to(*b))
            .count()
    }
}

/// Rotated connection map of a tile
pub fn connections_for(tile: &Tile) -> Connections {
    tile.connections()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_connections_are_involutions() {
        for tile_type in TileType::ALL {
            for rotation in Rotation::ALL {
                let connections = Tile::new(tile_type, rotation).connections();
                let mut covered = HashSet::new();
                for (entry, exit) in connections.iter() {
                    assert_ne!(entry, exit, "{tile_type} r{rotation:?} has a dead end");
                    assert_eq!(
                        connections.exit(exit),
                        entry,
                        "{tile_type} r{rotation:?} is not symmetric"
                    );
                    covered.insert(exit);
                }
                assert_eq!(covered.len(), 6);
            }
        }
    }

    #[test]
    fn test_sharp_counts_survive_rotation() {
        for tile_type in TileType::ALL {
            for rotation in Rotation::ALL {
                let tile = Tile::new(tile_type, rotation);
                assert_eq!(tile.connections().sharp_count(), tile_type.num_sharps());
            }
        }
    }

    #[test]
    fn test_rotation_relabels_sides() {
        // Rotating by r maps a base pair (a, b) to (a + r, b + r).
        let tile = Tile::new(TileType::NoSharps, Rotation::new(5));
        assert_eq!(tile.exit(Direction::NorthWest), Direction::SouthEast);
        assert_eq!(tile.exit(Direction::NorthEast), Direction::West);
        assert_eq!(tile.exit(Direction::East), Direction::SouthWest);

        let base = Tile::new(TileType::OneSharp, Rotation::new(0));
        let turned = Tile::new(TileType::OneSharp, Rotation::new(1));
        for side in Direction::ALL {
            assert_eq!(turned.exit(side.rotate(1)), base.exit(side).rotate(1));
        }
    }

    #[test]
    fn test_segments() {
        let tile = Tile::new(TileType::TwoSharps, Rotation::new(0));
        assert_eq!(
            tile.connections().segments(),
            [
                (Direction::NorthWest, Direction::West),
                (Direction::NorthEast, Direction::SouthWest),
                (Direction::East, Direction::SouthEast),
            ]
        );
    }

    #[test]
    fn test_distinct_rotations() {
        let counts: Vec<usize> = TileType::ALL
            .iter()
            .map(|t| t.distinct_rotations().len())
            .collect();
        assert_eq!(counts, vec![3, 6, 3, 2]);
    }

    #[test]
    fn test_every_pair_of_sides_can_be_joined() {
        for a in Direction::ALL {
            for b in Direction::ALL {
                let tile = TileType::connecting(a, b);
                if a == b {
                    assert!(tile.is_none());
                } else {
                    assert_eq!(tile.map(|t| t.exit(a)), Some(b));
                }
            }
        }
    }

    #[test]
    fn test_rotation_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rotation>("6").is_err());
        let rotation: Rotation = serde_json::from_str("4").unwrap();
        assert_eq!(rotation.steps(), 4);
        assert_eq!(Rotation::new(7).steps(), 1);
    }
}
