//! Seating and turn order.
//!
//! Who picks an edge first is random; who moves first is not. Players pick
//! edges in a shuffled seating order, then play proceeds clockwise around
//! the board starting from the first-seated player's edge.

use crate::board::Edge;
use crate::player::PlayerId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Independent random streams drawn from one game seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngStream {
    Seating,
    /// The nth deck shuffle of the game, rematches included
    Shuffle(u32),
}

impl RngStream {
    fn id(self) -> u64 {
        match self {
            RngStream::Seating => 0,
            RngStream::Shuffle(n) => 1 + n as u64,
        }
    }
}

/// Deterministic generator for one purpose within a seeded game
pub fn seeded_rng(seed: u64, stream: RngStream) -> StdRng {
    StdRng::seed_from_u64(seed ^ stream.id().wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Shuffle player ids (given in join order) into the order they pick edges
pub fn seating_order<R: Rng + ?Sized>(players: &[PlayerId], rng: &mut R) -> Vec<PlayerId> {
    let mut order = players.to_vec();
    order.shuffle(rng);
    order
}

/// Edge choice for a player who doesn't pick one.
///
/// Prefers the lowest free edge facing another free edge, so two automatic
/// players end up across from each other.
pub fn auto_edge(claimed: &[Edge]) -> Option<Edge> {
    let free = |edge: &Edge| !claimed.contains(edge);
    Edge::ALL
        .into_iter()
        .find(|edge| free(edge) && free(&edge.opposite()))
        .or_else(|| Edge::ALL.into_iter().find(free))
}

/// Players clockwise from `first`, skipping unoccupied edges
pub fn play_order(seats: &[(PlayerId, Edge)], first: Edge) -> Vec<PlayerId> {
    (0..6)
        .map(|steps| first.rotate(steps))
        .filter_map(|edge| {
            seats
                .iter()
                .find(|(_, seat)| *seat == edge)
                .map(|(player, _)| *player)
        })
        .collect()
}
