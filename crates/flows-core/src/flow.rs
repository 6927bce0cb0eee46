//! Flow tracing: following a player's path from their edge through placed
//! tiles.
//!
//! Flows are always recomputed from scratch for the whole board. A single new
//! tile can join several previously dead flows at once, and boards are small
//! enough that patching incrementally is not worth the risk.

use crate::board::{Board, Edge};
use crate::hex::{position_map, Direction, HexPosition};
use crate::player::PlayerId;
use crate::rules::GoalRule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// One tile traversed by a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStep {
    pub position: HexPosition,
    /// Side the flow came in through
    pub entry: Direction,
    /// Side the flow left through
    pub exit: Direction,
}

/// Why a flow stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEnd {
    /// The next cell has no tile yet
    Open,
    /// The flow left the board across this edge
    Boundary(Edge),
    /// The flow came back to a side it had already entered through
    Loop,
}

/// A traced path, in order from its starting side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub player: PlayerId,
    pub start: (HexPosition, Direction),
    pub steps: Vec<FlowStep>,
    pub end: FlowEnd,
}

impl Flow {
    /// Number of tiles traversed
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The edge this flow left the board across, if it did
    pub fn reached_edge(&self) -> Option<Edge> {
        match self.end {
            FlowEnd::Boundary(edge) => Some(edge),
            FlowEnd::Open | FlowEnd::Loop => None,
        }
    }

    /// Whether this flow, started from `own`, has reached a goal edge
    pub fn completes(&self, own: Edge, goal: GoalRule) -> bool {
        self.reached_edge()
            .is_some_and(|reached| goal.accepts(own, reached))
    }

    /// Whether this flow turned around and left through its own edge
    pub fn returns_to(&self, own: Edge) -> bool {
        self.reached_edge() == Some(own)
    }
}

/// Follow connected tile segments from `start_pos`, entering through
/// `start_dir`.
///
/// Stops at the first empty cell, on leaving the board, or on re-entering a
/// (position, side) pair already visited. Every step consumes a distinct
/// segment, so the result never exceeds three steps per placed tile.
pub fn trace_flow(
    board: &Board,
    start_pos: HexPosition,
    start_dir: Direction,
    player: PlayerId,
) -> Flow {
    let mut steps = Vec::new();
    let mut visited = HashSet::new();
    let mut position = start_pos;
    let mut entry = start_dir;

    let end = loop {
        let Some(tile) = board.tile_at(position) else {
            break FlowEnd::Open;
        };
        if !visited.insert((position, entry)) {
            break FlowEnd::Loop;
        }
        let exit = tile.exit(entry);
        steps.push(FlowStep {
            position,
            entry,
            exit,
        });
        match board.neighbor_on_board(position, exit) {
            Some(next) => {
                position = next;
                entry = exit.opposite();
            }
            None => {
                break board
                    .crossing_edge(position, exit)
                    .map_or(FlowEnd::Open, FlowEnd::Boundary);
            }
        }
    };

    Flow {
        player,
        start: (start_pos, start_dir),
        steps,
        end,
    }
}

/// Which player's flow runs through each side of each tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowEdges(#[serde(with = "position_map")] BTreeMap<HexPosition, [Option<PlayerId>; 6]>);

impl FlowEdges {
    /// Owner of the flow through one side of a tile
    pub fn owner(&self, position: HexPosition, direction: Direction) -> Option<PlayerId> {
        self.0
            .get(&position)
            .and_then(|sides| sides[direction.index()])
    }

    /// All six sides of a tile, indexed by direction
    pub fn sides(&self, position: HexPosition) -> [Option<PlayerId>; 6] {
        self.0.get(&position).copied().unwrap_or([None; 6])
    }

    /// Sides of a tile carrying `player`'s flow
    pub fn directions_for(&self, position: HexPosition, player: PlayerId) -> Vec<Direction> {
        let sides = self.sides(position);
        Direction::ALL
            .into_iter()
            .filter(|dir| sides[dir.index()] == Some(player))
            .collect()
    }

    /// Positions with at least one flowing side
    pub fn positions(&self) -> impl Iterator<Item = HexPosition> + '_ {
        self.0.keys().copied()
    }

    /// First claim wins. Two players can only share a segment when it links
    /// their two edges, and then both flows have already left the board.
    fn claim(&mut self, position: HexPosition, direction: Direction, player: PlayerId) {
        let slot = &mut self.0.entry(position).or_insert([None; 6])[direction.index()];
        if slot.is_none() {
            *slot = Some(player);
        }
    }
}

/// Every player's flows on a board, plus the per-side ownership derived
/// from them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMap {
    flows: Vec<Flow>,
    edges: FlowEdges,
}

impl FlowMap {
    /// Trace every flow for the seated players, given in play order.
    ///
    /// One flow per entry point whose cell holds a tile; entry points in
    /// front of empty cells produce nothing.
    pub fn compute(board: &Board, seats: &[(PlayerId, Edge)]) -> FlowMap {
        let mut map = FlowMap::default();
        for &(player, edge) in seats {
            for &(position, direction) in board.edge_entry_points(edge) {
                if !board.is_occupied(position) {
                    continue;
                }
                let flow = trace_flow(board, position, direction, player);
                for step in &flow.steps {
                    map.edges.claim(step.position, step.entry, player);
                    map.edges.claim(step.position, step.exit, player);
                }
                map.flows.push(flow);
            }
        }
        trace!(flows = map.flows.len(), tiles = board.len(), "recomputed flows");
        map
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flows_for(&self, player: PlayerId) -> impl Iterator<Item = &Flow> + '_ {
        self.flows.iter().filter(move |flow| flow.player == player)
    }

    pub fn edges(&self) -> &FlowEdges {
        &self.edges
    }

    /// Length of `player`'s longest flow
    pub fn longest(&self, player: PlayerId) -> usize {
        self.flows_for(player).map(Flow::len).max().unwrap_or(0)
    }

    /// Whether any of `player`'s flows has reached a goal edge
    pub fn is_complete(&self, player: PlayerId, own: Edge, goal: GoalRule) -> bool {
        self.flows_for(player).any(|flow| flow.completes(own, goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Rotation, Tile, TileType};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOP: Edge = Edge::ALL[0];
    const BOTTOM: Edge = Edge::ALL[3];

    fn no_sharps(rotation: u8) -> Tile {
        Tile::new(TileType::NoSharps, Rotation::new(rotation))
    }

    fn two_player_seats() -> Vec<(PlayerId, Edge)> {
        vec![(1, TOP), (2, BOTTOM)]
    }

    #[test]
    fn test_single_tile_on_own_edge() {
        let mut board = Board::new(3).unwrap();
        board.place(HexPosition::new(-3, 1), no_sharps(0)).unwrap();

        let flows = FlowMap::compute(&board, &two_player_seats());
        let mine: Vec<_> = flows.flows_for(1).collect();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|f| f.len() == 1 && f.end == FlowEnd::Open));
        assert_eq!(flows.flows_for(2).count(), 0);
        assert_eq!(flows.longest(1), 1);
        assert_eq!(flows.longest(2), 0);
    }

    #[test]
    fn test_interior_tile_has_no_flows() {
        let mut board = Board::new(3).unwrap();
        board.place(HexPosition::new(0, 0), no_sharps(2)).unwrap();

        let flows = FlowMap::compute(&board, &two_player_seats());
        assert!(flows.flows().is_empty());
        assert_eq!(flows.edges().positions().count(), 0);
    }

    #[test]
    fn test_second_tile_extends_flow() {
        let mut board = Board::new(3).unwrap();
        board.place(HexPosition::new(-3, 1), no_sharps(0)).unwrap();
        let before = FlowMap::compute(&board, &two_player_seats());

        // The straight from the north-east side exits south-west into (-2, 0)
        board.place(HexPosition::new(-2, 0), no_sharps(0)).unwrap();
        let after = FlowMap::compute(&board, &two_player_seats());

        let start = (HexPosition::new(-3, 1), Direction::NorthEast);
        let find = |map: &FlowMap| map.flows_for(1).find(|f| f.start == start).cloned().unwrap();
        assert_eq!(find(&before).len(), 1);
        let extended = find(&after);
        assert_eq!(extended.len(), 2);
        assert_eq!(
            extended.steps[1],
            FlowStep {
                position: HexPosition::new(-2, 0),
                entry: Direction::NorthEast,
                exit: Direction::SouthWest,
            }
        );

        assert_eq!(
            after.edges().directions_for(HexPosition::new(-2, 0), 1),
            vec![Direction::NorthEast, Direction::SouthWest]
        );
        let claimed = after
            .edges()
            .sides(HexPosition::new(-2, 0))
            .iter()
            .filter(|side| side.is_some())
            .count();
        assert_eq!(claimed, 2);
    }

    /// Six tiles around the center, each joining its two ring neighbors
    fn ring_board() -> Board {
        let mut board = Board::new(2).unwrap();
        for k in 0..6 {
            let pos = HexPosition::new(0, 0).neighbor(Direction::from_index(k));
            board.place(pos, no_sharps(((k + 2) % 6) as u8)).unwrap();
        }
        board
    }

    #[test]
    fn test_closed_loop_terminates() {
        let board = ring_board();
        let flow = trace_flow(&board, HexPosition::new(-1, 0), Direction::SouthWest, 9);
        assert_eq!(flow.end, FlowEnd::Loop);
        assert_eq!(flow.len(), 6);
        assert_eq!(flow.steps[1].position, HexPosition::new(-1, 1));
    }

    #[test]
    fn test_flow_across_the_board() {
        // A straight column from the top corner of the top edge to the
        // bottom edge on a radius-1 board
        let mut board = Board::new(1).unwrap();
        for row in -1..=1 {
            board.place(HexPosition::new(row, 0), no_sharps(5)).unwrap();
        }
        let flows = FlowMap::compute(&board, &two_player_seats());

        let down = flows
            .flows_for(1)
            .find(|f| f.start.1 == Direction::NorthWest)
            .unwrap();
        assert_eq!(down.len(), 3);
        assert_eq!(down.end, FlowEnd::Boundary(BOTTOM));
        assert!(down.completes(TOP, GoalRule::OppositeEdge));

        let up = flows
            .flows_for(2)
            .find(|f| f.start.1 == Direction::SouthEast)
            .unwrap();
        assert_eq!(up.end, FlowEnd::Boundary(TOP));

        // Both flows run through the middle tile; the first seat keeps it
        assert_eq!(flows.edges().owner(HexPosition::new(0, 0), Direction::NorthWest), Some(1));
        assert_eq!(flows.edges().owner(HexPosition::new(0, 0), Direction::SouthEast), Some(1));
    }

    #[test]
    fn test_flow_turning_back_to_own_edge() {
        let mut board = Board::new(3).unwrap();
        // OneSharp rotated so its sharp joins the two top sides
        board
            .place(HexPosition::new(-3, 1), Tile::new(TileType::OneSharp, Rotation::new(1)))
            .unwrap();
        let flow = trace_flow(&board, HexPosition::new(-3, 1), Direction::NorthWest, 1);
        assert_eq!(flow.end, FlowEnd::Boundary(TOP));
        assert!(flow.returns_to(TOP));
        assert!(!flow.completes(TOP, GoalRule::AnyOtherEdge));
    }

    #[test]
    fn test_tracing_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = random_board(&mut rng, 3, 0.6);
        let seats = [(1, TOP), (2, Edge::ALL[2]), (3, Edge::ALL[4])];
        assert_eq!(FlowMap::compute(&board, &seats), FlowMap::compute(&board, &seats));
    }

    #[test]
    fn test_tracing_always_terminates() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let board = random_board(&mut rng, 3, 0.8);
            let limit = 3 * board.len() + 1;
            for pos in board.positions() {
                for dir in Direction::ALL {
                    let flow = trace_flow(&board, pos, dir, 1);
                    assert!(flow.len() <= limit);
                }
            }
        }
    }

    fn random_board(rng: &mut StdRng, radius: i32, fill: f64) -> Board {
        let mut board = Board::new(radius).unwrap();
        let positions: Vec<_> = board.positions().collect();
        for pos in positions {
            if rng.gen_bool(fill) {
                let tile_type = TileType::ALL[rng.gen_range(0..4)];
                let rotation = Rotation::new(rng.gen_range(0..6));
                board.place(pos, Tile::new(tile_type, rotation)).unwrap();
            }
        }
        board
    }
}
