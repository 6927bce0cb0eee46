//! Win detection after each committed placement.

use crate::board::{Board, Edge};
use crate::flow::FlowMap;
use crate::legality::has_legal_placement;
use crate::player::PlayerId;
use crate::rules::{GoalRule, Ruleset};
use crate::tile::TileType;
use serde::{Deserialize, Serialize};

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinType {
    /// One player completed a flow
    Flow,
    /// Nobody could move; no winner
    Constraint,
    /// Several players completed flows with the same tile
    Tie,
    /// Ended by request, or still running
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Winning players in play order
    pub winners: Vec<PlayerId>,
    pub win_type: WinType,
}

/// Players whose flows have reached a goal edge, or `None` if nobody has.
///
/// `seats` is in play order, and so are the winners.
pub fn detect_winners(flows: &FlowMap, seats: &[(PlayerId, Edge)], goal: GoalRule) -> Option<Outcome> {
    let winners: Vec<PlayerId> = seats
        .iter()
        .filter(|&&(player, edge)| flows.is_complete(player, edge, goal))
        .map(|(player, _)| *player)
        .collect();
    let win_type = match winners.len() {
        0 => return None,
        1 => WinType::Flow,
        _ => WinType::Tie,
    };
    Some(Outcome { winners, win_type })
}

/// Whether the player to move is stuck.
///
/// Without a tile in hand that means nothing left to draw or nowhere to put
/// it; with one, that no rotation of it fits anywhere.
pub fn is_constrained(
    board: &Board,
    rules: &Ruleset,
    deck_remaining: usize,
    in_hand: Option<TileType>,
    seats: &[(PlayerId, Edge)],
    current: usize,
) -> bool {
    if board.is_full() {
        return true;
    }
    match in_hand {
        None => deck_remaining == 0,
        Some(tile_type) => !has_legal_placement(board, rules, tile_type, seats, current),
    }
}
