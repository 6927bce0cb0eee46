//! Placement legality.
//!
//! Every check runs against a hypothetical copy of the board with the tile
//! already placed; the real board is never touched.

use crate::board::{Board, Edge};
use crate::flow::FlowMap;
use crate::game::GameError;
use crate::hex::{Direction, HexPosition};
use crate::player::PlayerId;
use crate::rules::{GoalRule, Ruleset};
use crate::tile::{Rotation, Tile, TileType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Which ruleset constraint a rejected placement broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum RuleViolation {
    /// The new tile turns the placing player's flow back out through their
    /// own edge
    SelfLoop,
    /// The given player could not keep a route to a goal edge apart from
    /// everyone else's
    Blocks(PlayerId),
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::SelfLoop => write!(f, "flow returns to its own edge"),
            RuleViolation::Blocks(player) => write!(f, "player {player} has no path left"),
        }
    }
}

/// Check whether `tile` may go at `position`.
///
/// `seats` lists (player, edge) in play order and `current` indexes the
/// placing player within it. A placement that completes any flow is always
/// allowed; otherwise the ruleset's self-loop and blocking rules apply.
pub fn check_placement(
    board: &Board,
    rules: &Ruleset,
    tile: Tile,
    position: HexPosition,
    seats: &[(PlayerId, Edge)],
    current: usize,
) -> Result<(), GameError> {
    let next = board.with_tile(position, tile)?;
    let flows = FlowMap::compute(&next, seats);

    if seats
        .iter()
        .any(|&(player, edge)| flows.is_complete(player, edge, rules.goal))
    {
        return Ok(());
    }

    if rules.forbid_self_loops {
        if let Some(&(player, own)) = seats.get(current) {
            let loops_back = flows.flows_for(player).any(|flow| {
                flow.returns_to(own) && flow.steps.iter().any(|step| step.position == position)
            });
            if loops_back {
                return Err(GameError::IllegalRotationForRule(RuleViolation::SelfLoop));
            }
        }
    }

    if rules.forbid_blocking {
        if let Some(blocked) = blocked_player(&next, seats, rules.goal) {
            return Err(GameError::IllegalRotationForRule(RuleViolation::Blocks(blocked)));
        }
    }

    Ok(())
}

pub fn is_legal_move(
    board: &Board,
    rules: &Ruleset,
    tile: Tile,
    position: HexPosition,
    seats: &[(PlayerId, Edge)],
    current: usize,
) -> bool {
    check_placement(board, rules, tile, position, seats, current).is_ok()
}

/// Every legal (position, rotation) for a tile type, trying each distinct
/// rotation once
pub fn legal_placements(
    board: &Board,
    rules: &Ruleset,
    tile_type: TileType,
    seats: &[(PlayerId, Edge)],
    current: usize,
) -> Vec<(HexPosition, Rotation)> {
    let rotations = tile_type.distinct_rotations();
    board
        .empty_positions()
        .flat_map(|position| rotations.iter().map(move |rotation| (position, *rotation)))
        .filter(|&(position, rotation)| {
            is_legal_move(board, rules, Tile::new(tile_type, rotation), position, seats, current)
        })
        .collect()
}

/// Whether any legal placement exists for a tile type; stops at the first
pub fn has_legal_placement(
    board: &Board,
    rules: &Ruleset,
    tile_type: TileType,
    seats: &[(PlayerId, Edge)],
    current: usize,
) -> bool {
    let rotations = tile_type.distinct_rotations();
    board.empty_positions().any(|position| {
        rotations.iter().any(|rotation| {
            is_legal_move(board, rules, Tile::new(tile_type, *rotation), position, seats, current)
        })
    })
}

/// Whether a flow from `own` could still reach a goal edge on its own.
///
/// Searches (cell, entry side) states from every crossing of `own`. Placed
/// tiles only allow their own exit; an empty cell may be left through any
/// other side, since some tile joins every pair of sides.
pub fn has_potential_path(board: &Board, own: Edge, goal: GoalRule) -> bool {
    find_route(board, own, goal, &Claims::new(), &Demands::new()).is_some()
}

/// The player left without a route when every seat needs one of its own.
///
/// Routes are searched one seat at a time in the given order. Each found
/// route claims the crossings it leaves cells through and asks its empty
/// cells to join the sides it uses; later routes must avoid those crossings
/// and keep every empty cell fillable by a single tile. When a seat fails,
/// the search runs once more with that seat first, and only a second failure
/// counts.
pub fn blocked_player(board: &Board, seats: &[(PlayerId, Edge)], goal: GoalRule) -> Option<PlayerId> {
    let failing = route_all(board, seats.iter().copied(), goal)?;
    let reordered = seats
        .iter()
        .copied()
        .filter(|&(player, _)| player == failing)
        .chain(seats.iter().copied().filter(|&(player, _)| player != failing));
    route_all(board, reordered, goal)
}

/// Crossings used by routed seats, as (cell, side left through)
type Claims = HashSet<(HexPosition, Direction)>;

/// Side pairs each empty cell has been asked to join
type Demands = HashMap<HexPosition, Vec<(Direction, Direction)>>;

/// One move out of a cell, linked back to the move that led into it
#[derive(Debug, Clone, Copy)]
struct Hop {
    position: HexPosition,
    entry: Direction,
    exit: Direction,
    parent: Option<usize>,
}

/// Route every seat in order; returns the first seat with no route left
fn route_all(
    board: &Board,
    order: impl Iterator<Item = (PlayerId, Edge)>,
    goal: GoalRule,
) -> Option<PlayerId> {
    let mut claims = Claims::new();
    let mut demands = Demands::new();
    for (player, own) in order {
        let Some(route) = find_route(board, own, goal, &claims, &demands) else {
            return Some(player);
        };
        for hop in route {
            claims.insert((hop.position, hop.exit));
            if !board.is_occupied(hop.position) {
                demands
                    .entry(hop.position)
                    .or_default()
                    .push((hop.entry, hop.exit));
            }
        }
    }
    None
}

fn find_route(
    board: &Board,
    own: Edge,
    goal: GoalRule,
    claims: &Claims,
    demands: &Demands,
) -> Option<Vec<Hop>> {
    let mut hops: Vec<Hop> = Vec::new();
    let mut visited: HashSet<(HexPosition, Direction)> = HashSet::new();
    let mut queue: VecDeque<(HexPosition, Direction, Option<usize>)> = VecDeque::new();
    for &(position, entry) in board.edge_entry_points(own) {
        if visited.insert((position, entry)) {
            queue.push_back((position, entry, None));
        }
    }

    while let Some((position, entry, parent)) = queue.pop_front() {
        let exits: Vec<Direction> = match board.tile_at(position) {
            Some(tile) => vec![tile.exit(entry)],
            None => Direction::ALL
                .into_iter()
                .filter(|exit| {
                    *exit != entry
                        && joinable(demands.get(&position).map(Vec::as_slice), entry, *exit)
                })
                .collect(),
        };
        for exit in exits {
            if claims.contains(&(position, exit)) {
                continue;
            }
            let hop = hops.len();
            hops.push(Hop {
                position,
                entry,
                exit,
                parent,
            });
            match board.neighbor_on_board(position, exit) {
                Some(next) => {
                    let state = (next, exit.opposite());
                    if visited.insert(state) {
                        queue.push_back((next, exit.opposite(), Some(hop)));
                    }
                }
                None => {
                    if board
                        .crossing_edge(position, exit)
                        .is_some_and(|reached| goal.accepts(own, reached))
                    {
                        return Some(trace_back(&hops, hop));
                    }
                }
            }
        }
    }
    None
}

fn trace_back(hops: &[Hop], last: usize) -> Vec<Hop> {
    let mut route = Vec::new();
    let mut cursor = Some(last);
    while let Some(index) = cursor {
        let hop = hops[index];
        route.push(hop);
        cursor = hop.parent;
    }
    route.reverse();
    route
}

/// Whether one tile can join `entry` to `exit` on top of what the cell was
/// already asked for
fn joinable(existing: Option<&[(Direction, Direction)]>, entry: Direction, exit: Direction) -> bool {
    let Some(pairs) = existing.filter(|pairs| !pairs.is_empty()) else {
        return true;
    };
    TileType::ALL.into_iter().any(|tile_type| {
        Rotation::ALL.into_iter().any(|rotation| {
            let connections = Tile::new(tile_type, rotation).connections();
            connections.exit(entry) == exit && pairs.iter().all(|&(a, b)| connections.exit(a) == b)
        })
    })
}
