//! Core game state machine.
//!
//! This module contains the `GameState` struct and the reducer that moves it
//! between phases. Every action is applied to a copy of the state, so a
//! rejected action leaves the original exactly as it was.

use crate::actions::{Action, ActionRecord, GameEvent};
use crate::board::{Board, Edge};
use crate::flow::{Flow, FlowMap};
use crate::hex::HexPosition;
use crate::legality::{check_placement, legal_placements, RuleViolation};
use crate::player::{Player, PlayerColor, PlayerId};
use crate::rules::Ruleset;
use crate::seating::{auto_edge, play_order, seating_order, seeded_rng, RngStream};
use crate::tile::{Rotation, Tile, TileType};
use crate::victory::{detect_winners, is_constrained, Outcome, WinType};
use crate::view::{GameView, GameViewer};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Lobby: players join and leave
    Configuring,
    /// Players pick edges in seating order
    Seating,
    /// Draw and place tiles in play order
    Playing,
    /// Game is over until a rematch
    Finished,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Position is off the board")]
    InvalidPosition,

    #[error("Position already has a tile")]
    PositionOccupied,

    #[error("Placement breaks a rule: {0}")]
    IllegalRotationForRule(RuleViolation),

    #[error("Not your turn")]
    NotPlayersTurn,

    #[error("Invalid action for current phase")]
    WrongPhase,

    #[error("Unknown player")]
    UnknownPlayer,

    #[error("Player already joined")]
    DuplicatePlayer,

    #[error("Too many players")]
    TooManyPlayers,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Invalid edge")]
    InvalidEdge,

    #[error("Edge already taken")]
    EdgeTaken,

    #[error("No tile in hand")]
    NoTileInHand,

    #[error("Tile already drawn this turn")]
    TileAlreadyDrawn,

    #[error("No tiles left to draw")]
    DeckEmpty,

    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),
}

/// A committed placement, in the order it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub player: PlayerId,
    pub position: HexPosition,
    pub tile: Tile,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Fixed for the lifetime of the game
    pub rules: Ruleset,
    /// Seed for every random draw (for deterministic replays)
    pub seed: u64,
    /// All players, in join order
    pub players: Vec<Player>,
    /// Order in which players pick edges
    pub seating_order: Vec<PlayerId>,
    /// Turn order, clockwise from the first-seated player's edge
    pub play_order: Vec<PlayerId>,
    pub board: Board,
    /// Derived from the board after every placement
    pub flows: FlowMap,
    /// Index into `play_order`
    pub current_player_index: usize,
    /// Drawn but not yet placed
    pub current_tile: Option<TileType>,
    /// Undrawn tiles; the next draw takes the last one
    pub deck: Vec<TileType>,
    /// Deck shuffles so far, rematches included
    pub shuffles: u32,
    pub rematches: u32,
    pub phase: GamePhase,
    pub history: Vec<Placement>,
    pub winners: Vec<PlayerId>,
    pub win_type: WinType,
}

impl GameState {
    /// Create an empty game in the lobby
    pub fn new(rules: Ruleset, seed: u64) -> Result<Self, GameError> {
        rules.validate()?;
        let board = Board::new(rules.radius)?;
        Ok(Self {
            rules,
            seed,
            players: Vec::new(),
            seating_order: Vec::new(),
            play_order: Vec::new(),
            board,
            flows: FlowMap::default(),
            current_player_index: 0,
            current_tile: None,
            deck: Vec::new(),
            shuffles: 0,
            rematches: 0,
            phase: GamePhase::Configuring,
            history: Vec::new(),
            winners: Vec::new(),
            win_type: WinType::None,
        })
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The player whose turn it is, while playing
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Playing => self.play_order.get(self.current_player_index).copied(),
            _ => None,
        }
    }

    /// The next player to pick an edge, while seating
    pub fn next_to_seat(&self) -> Option<PlayerId> {
        if self.phase != GamePhase::Seating {
            return None;
        }
        self.seating_order
            .iter()
            .copied()
            .find(|id| self.player(*id).is_some_and(|p| !p.is_seated()))
    }

    /// Seated players with their edges, in play order
    pub fn seats(&self) -> Vec<(PlayerId, Edge)> {
        self.play_order
            .iter()
            .filter_map(|id| self.player(*id).and_then(|p| p.edge).map(|edge| (*id, edge)))
            .collect()
    }

    pub fn flows_for(&self, player: PlayerId) -> impl Iterator<Item = &Flow> + '_ {
        self.flows.flows_for(player)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.is_finished().then(|| Outcome {
            winners: self.winners.clone(),
            win_type: self.win_type,
        })
    }

    /// The game as `viewer` may see it
    pub fn view_for(&self, viewer: GameViewer) -> GameView {
        GameView::new(self, viewer)
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(me) = self.player(player) else {
            return actions;
        };

        match self.phase {
            GamePhase::Configuring => {
                actions.push(Action::RemovePlayer { id: player });
                if self.players.len() >= self.rules.min_players {
                    actions.push(Action::StartGame);
                }
            }

            GamePhase::Seating => {
                if self.next_to_seat() != Some(player) {
                    return actions;
                }
                let claimed = self.claimed_edges();
                for edge in Edge::ALL {
                    if !claimed.contains(&edge) {
                        actions.push(Action::SelectEdge {
                            player,
                            edge: Some(edge),
                        });
                    }
                }
                if me.is_ai {
                    actions.push(Action::SelectEdge { player, edge: None });
                }
            }

            GamePhase::Playing => {
                if self.current_player() != Some(player) {
                    return actions;
                }
                match self.current_tile {
                    None => {
                        if !self.deck.is_empty() {
                            actions.push(Action::DrawTile { player });
                        }
                    }
                    Some(tile_type) => {
                        let seats = self.seats();
                        for (position, rotation) in legal_placements(
                            &self.board,
                            &self.rules,
                            tile_type,
                            &seats,
                            self.current_player_index,
                        ) {
                            actions.push(Action::PlaceTile {
                                player,
                                position,
                                rotation,
                            });
                        }
                    }
                }
                actions.push(Action::NextPlayer { player });
            }

            GamePhase::Finished => {
                if self.players.iter().all(Player::is_seated) {
                    actions.push(Action::Rematch);
                }
            }
        }

        actions
    }

    /// Apply an action to the game state.
    ///
    /// All or nothing: on error the state is left untouched.
    #[instrument(level = "debug", skip_all, fields(action = action.kind()))]
    pub fn apply_action(&mut self, action: &Action) -> Result<Vec<GameEvent>, GameError> {
        let mut next = self.clone();
        match next.transition(action) {
            Ok(events) => {
                *self = next;
                Ok(events)
            }
            Err(err) => {
                debug!(%err, "rejected action");
                Err(err)
            }
        }
    }

    fn transition(&mut self, action: &Action) -> Result<Vec<GameEvent>, GameError> {
        if self.phase == GamePhase::Finished && *action != Action::Rematch {
            return Err(GameError::WrongPhase);
        }

        match action {
            // ==================== Lobby ====================
            Action::AddPlayer {
                id,
                name,
                color,
                is_ai,
            } => {
                self.require_phase(GamePhase::Configuring)?;
                if self.player(*id).is_some() {
                    return Err(GameError::DuplicatePlayer);
                }
                if self.players.len() >= self.rules.max_players {
                    return Err(GameError::TooManyPlayers);
                }
                let color = color.unwrap_or_else(|| {
                    PlayerColor::first_unused(self.players.iter().map(|p| p.color))
                });
                self.players.push(Player::new(*id, name.clone(), color, *is_ai));
                Ok(vec![GameEvent::PlayerAdded { player: *id, color }])
            }

            Action::RemovePlayer { id } => {
                self.require_phase(GamePhase::Configuring)?;
                let index = self
                    .players
                    .iter()
                    .position(|p| p.id == *id)
                    .ok_or(GameError::UnknownPlayer)?;
                self.players.remove(index);
                Ok(vec![GameEvent::PlayerRemoved { player: *id }])
            }

            Action::StartGame => {
                self.require_phase(GamePhase::Configuring)?;
                if self.players.len() < self.rules.min_players {
                    return Err(GameError::NotEnoughPlayers);
                }
                let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
                let mut rng = seeded_rng(self.seed, RngStream::Seating);
                self.seating_order = seating_order(&ids, &mut rng);
                self.phase = GamePhase::Seating;
                Ok(vec![GameEvent::SeatingStarted {
                    order: self.seating_order.clone(),
                }])
            }

            // ==================== Seating ====================
            Action::SelectEdge { player, edge } => self.select_edge(*player, *edge),

            // ==================== Play ====================
            Action::ShuffleTiles => {
                self.require_phase(GamePhase::Playing)?;
                self.shuffle_deck();
                Ok(vec![GameEvent::TilesShuffled {
                    remaining: self.deck.len(),
                }])
            }

            Action::DrawTile { player } => {
                self.require_turn(*player)?;
                if self.current_tile.is_some() {
                    return Err(GameError::TileAlreadyDrawn);
                }
                let tile_type = self.deck.pop().ok_or(GameError::DeckEmpty)?;
                self.current_tile = Some(tile_type);

                let mut events = vec![GameEvent::TileDrawn {
                    player: *player,
                    tile_type,
                }];
                events.extend(self.check_constraint());
                Ok(events)
            }

            Action::PlaceTile {
                player,
                position,
                rotation,
            } => self.place_tile(*player, *position, *rotation),

            Action::NextPlayer { player } => {
                self.require_turn(*player)?;
                self.advance_turn();

                let mut events = vec![GameEvent::TurnPassed {
                    player: *player,
                    next_player: self.current_player().unwrap_or(*player),
                }];
                events.extend(self.check_constraint());
                Ok(events)
            }

            // ==================== Lifecycle ====================
            Action::EndGame => {
                if !matches!(self.phase, GamePhase::Seating | GamePhase::Playing) {
                    return Err(GameError::WrongPhase);
                }
                Ok(self.finish(Outcome {
                    winners: Vec::new(),
                    win_type: WinType::None,
                }))
            }

            Action::Rematch => self.rematch(),
        }
    }

    fn select_edge(&mut self, player: PlayerId, edge: Option<Edge>) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(GamePhase::Seating)?;
        let is_ai = self.player(player).ok_or(GameError::UnknownPlayer)?.is_ai;
        if self.next_to_seat() != Some(player) {
            return Err(GameError::NotPlayersTurn);
        }

        let claimed = self.claimed_edges();
        let edge = match edge {
            Some(edge) => edge,
            None if is_ai => auto_edge(&claimed).ok_or(GameError::InvalidEdge)?,
            None => return Err(GameError::InvalidEdge),
        };
        if claimed.contains(&edge) {
            return Err(GameError::EdgeTaken);
        }

        if let Some(p) = self.player_mut(player) {
            p.edge = Some(edge);
        }
        let mut events = vec![GameEvent::EdgeSelected { player, edge }];

        if self.players.iter().all(Player::is_seated) {
            events.extend(self.begin_play()?);
        }
        Ok(events)
    }

    fn begin_play(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let first = self
            .seating_order
            .first()
            .and_then(|id| self.player(*id))
            .and_then(|p| p.edge)
            .ok_or(GameError::WrongPhase)?;
        let seats: Vec<(PlayerId, Edge)> = self
            .players
            .iter()
            .filter_map(|p| p.edge.map(|edge| (p.id, edge)))
            .collect();
        self.play_order = play_order(&seats, first);
        self.deck = self.rules.deck.build();
        self.shuffle_deck();
        self.current_player_index = 0;
        self.current_tile = None;
        self.phase = GamePhase::Playing;

        info!(order = ?self.play_order, tiles = self.deck.len(), "play started");
        Ok(vec![GameEvent::PlayStarted {
            order: self.play_order.clone(),
        }])
    }

    fn place_tile(
        &mut self,
        player: PlayerId,
        position: HexPosition,
        rotation: Rotation,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.require_turn(player)?;
        let tile_type = self.current_tile.ok_or(GameError::NoTileInHand)?;
        let tile = Tile::new(tile_type, rotation);
        let seats = self.seats();
        check_placement(
            &self.board,
            &self.rules,
            tile,
            position,
            &seats,
            self.current_player_index,
        )?;

        self.board.place(position, tile)?;
        self.current_tile = None;
        self.history.push(Placement {
            player,
            position,
            tile,
        });
        self.flows = FlowMap::compute(&self.board, &seats);

        let mut events = vec![GameEvent::TilePlaced {
            player,
            position,
            tile,
        }];
        if let Some(outcome) = detect_winners(&self.flows, &seats, self.rules.goal) {
            events.extend(self.finish(outcome));
            return Ok(events);
        }

        self.advance_turn();
        events.extend(self.check_constraint());
        Ok(events)
    }

    fn rematch(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase(GamePhase::Finished)?;
        if !self.players.iter().all(Player::is_seated) || self.play_order.is_empty() {
            return Err(GameError::WrongPhase);
        }

        self.board = self.board.cleared();
        self.flows = FlowMap::default();
        self.history.clear();
        self.deck = self.rules.deck.build();
        self.shuffle_deck();
        self.current_player_index = 0;
        self.current_tile = None;
        self.winners.clear();
        self.win_type = WinType::None;
        self.rematches += 1;
        self.phase = GamePhase::Playing;

        info!(rematch = self.rematches, "rematch started");
        Ok(vec![GameEvent::RematchStarted {
            rematch: self.rematches,
        }])
    }

    fn require_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase)
        }
    }

    fn require_turn(&self, player: PlayerId) -> Result<(), GameError> {
        self.require_phase(GamePhase::Playing)?;
        if self.player(player).is_none() {
            return Err(GameError::UnknownPlayer);
        }
        if self.current_player() != Some(player) {
            return Err(GameError::NotPlayersTurn);
        }
        Ok(())
    }

    fn claimed_edges(&self) -> Vec<Edge> {
        self.players.iter().filter_map(|p| p.edge).collect()
    }

    fn shuffle_deck(&mut self) {
        let mut rng = seeded_rng(self.seed, RngStream::Shuffle(self.shuffles));
        self.deck.shuffle(&mut rng);
        self.shuffles += 1;
    }

    fn advance_turn(&mut self) {
        if !self.play_order.is_empty() {
            self.current_player_index = (self.current_player_index + 1) % self.play_order.len();
        }
    }

    /// End the game if the player to move can do nothing useful
    fn check_constraint(&mut self) -> Vec<GameEvent> {
        let seats = self.seats();
        if is_constrained(
            &self.board,
            &self.rules,
            self.deck.len(),
            self.current_tile,
            &seats,
            self.current_player_index,
        ) {
            self.finish(Outcome {
                winners: Vec::new(),
                win_type: WinType::Constraint,
            })
        } else {
            Vec::new()
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Vec<GameEvent> {
        self.phase = GamePhase::Finished;
        self.winners = outcome.winners;
        self.win_type = outcome.win_type;
        info!(winners = ?self.winners, win_type = ?self.win_type, "game finished");
        vec![GameEvent::GameFinished {
            winners: self.winners.clone(),
            win_type: self.win_type,
        }]
    }
}

/// Apply one action to a state, returning the new state
#[instrument(level = "debug", skip_all, fields(action = action.kind()))]
pub fn apply(state: &GameState, action: &Action) -> Result<GameState, GameError> {
    let mut next = state.clone();
    if let Err(err) = next.transition(action) {
        debug!(%err, "rejected action");
        return Err(err);
    }
    Ok(next)
}

/// Rebuild a game from its action log
pub fn replay(rules: Ruleset, seed: u64, records: &[ActionRecord]) -> Result<GameState, GameError> {
    records
        .iter()
        .try_fold(GameState::new(rules, seed)?, |state, record| {
            apply(&state, &record.action)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DeckComposition;
    use pretty_assertions::assert_eq;

    fn add(id: PlayerId, is_ai: bool) -> Action {
        Action::AddPlayer {
            id,
            name: format!("Player {id}"),
            color: None,
            is_ai,
        }
    }

    fn lobby(rules: Ruleset, ids: &[PlayerId]) -> GameState {
        let mut game = GameState::new(rules, 99).unwrap();
        for id in ids {
            game.apply_action(&add(*id, false)).unwrap();
        }
        game
    }

    /// Two players: the first to pick sits at the top, the other at the bottom
    fn playing(rules: Ruleset) -> GameState {
        let mut game = lobby(rules, &[1, 2]);
        game.apply_action(&Action::StartGame).unwrap();
        for edge in [0, 3] {
            let player = game.next_to_seat().unwrap();
            game.apply_action(&Action::SelectEdge {
                player,
                edge: Edge::new(edge),
            })
            .unwrap();
        }
        game
    }

    #[test]
    fn test_new_game_starts_in_lobby() {
        let game = GameState::new(Ruleset::default(), 1).unwrap();
        assert_eq!(game.phase, GamePhase::Configuring);
        assert!(game.players.is_empty());
        assert_eq!(game.current_player(), None);
        assert!(GameState::new(Ruleset { radius: 0, ..Ruleset::default() }, 1).is_err());
    }

    #[test]
    fn test_lobby_rules() {
        let mut game = lobby(Ruleset::default(), &[1]);
        assert_eq!(game.players[0].color, PlayerColor::Red);
        assert_eq!(game.apply_action(&add(1, false)), Err(GameError::DuplicatePlayer));
        assert_eq!(game.apply_action(&Action::StartGame), Err(GameError::NotEnoughPlayers));
        assert_eq!(
            game.apply_action(&Action::RemovePlayer { id: 5 }),
            Err(GameError::UnknownPlayer)
        );

        for id in 2..=6 {
            game.apply_action(&add(id, false)).unwrap();
        }
        assert_eq!(game.players[1].color, PlayerColor::Blue);
        assert_eq!(game.apply_action(&add(7, false)), Err(GameError::TooManyPlayers));

        game.apply_action(&Action::RemovePlayer { id: 3 }).unwrap();
        assert_eq!(game.players.len(), 5);
        assert!(game.player(3).is_none());
    }

    #[test]
    fn test_seating_follows_seating_order() {
        let mut game = lobby(Ruleset::default(), &[1, 2, 3]);
        game.apply_action(&Action::StartGame).unwrap();
        assert_eq!(game.phase, GamePhase::Seating);
        assert_eq!(game.seating_order.len(), 3);

        let first = game.seating_order[0];
        let second = game.seating_order[1];
        assert_eq!(game.next_to_seat(), Some(first));
        assert_eq!(
            game.apply_action(&Action::SelectEdge {
                player: second,
                edge: Edge::new(0),
            }),
            Err(GameError::NotPlayersTurn)
        );
        // Humans have to name an edge
        assert_eq!(
            game.apply_action(&Action::SelectEdge { player: first, edge: None }),
            Err(GameError::InvalidEdge)
        );

        game.apply_action(&Action::SelectEdge {
            player: first,
            edge: Edge::new(2),
        })
        .unwrap();
        assert_eq!(
            game.apply_action(&Action::SelectEdge {
                player: second,
                edge: Edge::new(2),
            }),
            Err(GameError::EdgeTaken)
        );
    }

    #[test]
    fn test_ai_edge_is_assigned() {
        let mut game = GameState::new(Ruleset::default(), 3).unwrap();
        game.apply_action(&add(1, true)).unwrap();
        game.apply_action(&add(2, true)).unwrap();
        game.apply_action(&Action::StartGame).unwrap();
        for _ in 0..2 {
            let player = game.next_to_seat().unwrap();
            game.apply_action(&Action::SelectEdge { player, edge: None })
                .unwrap();
        }
        assert_eq!(game.phase, GamePhase::Playing);
        let first = game.player(game.seating_order[0]).unwrap();
        let second = game.player(game.seating_order[1]).unwrap();
        assert_eq!(first.edge, Edge::new(0));
        assert_eq!(second.edge, Edge::new(1));
    }

    #[test]
    fn test_play_starts_after_seating() {
        let game = playing(Ruleset::default());
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.play_order, game.seating_order);
        assert_eq!(game.deck.len(), 40);
        assert_eq!(game.shuffles, 1);
        assert_eq!(game.current_player(), Some(game.play_order[0]));
    }

    #[test]
    fn test_turn_enforcement() {
        let mut game = playing(Ruleset::default());
        let current = game.current_player().unwrap();
        let other = game.play_order[1];

        assert_eq!(
            game.apply_action(&Action::DrawTile { player: other }),
            Err(GameError::NotPlayersTurn)
        );
        assert_eq!(
            game.apply_action(&Action::DrawTile { player: 42 }),
            Err(GameError::UnknownPlayer)
        );
        assert_eq!(
            game.apply_action(&Action::PlaceTile {
                player: current,
                position: HexPosition::new(0, 0),
                rotation: Rotation::new(0),
            }),
            Err(GameError::NoTileInHand)
        );

        game.apply_action(&Action::DrawTile { player: current }).unwrap();
        assert_eq!(game.deck.len(), 39);
        assert_eq!(
            game.apply_action(&Action::DrawTile { player: current }),
            Err(GameError::TileAlreadyDrawn)
        );
    }

    #[test]
    fn test_placement_advances_turn() {
        let rules = Ruleset {
            deck: DeckComposition::only(TileType::NoSharps, 10),
            ..Ruleset::default()
        };
        let mut game = playing(rules);
        let current = game.current_player().unwrap();
        game.apply_action(&Action::DrawTile { player: current }).unwrap();
        let events = game
            .apply_action(&Action::PlaceTile {
                player: current,
                position: HexPosition::new(0, 0),
                rotation: Rotation::new(1),
            })
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(game.history.len(), 1);
        assert_eq!(game.current_tile, None);
        assert_eq!(game.current_player(), Some(game.play_order[1]));
        assert!(game.board.is_occupied(HexPosition::new(0, 0)));
    }

    #[test]
    fn test_pass_hands_tile_on() {
        let mut game = playing(Ruleset::default());
        let current = game.current_player().unwrap();
        game.apply_action(&Action::DrawTile { player: current }).unwrap();
        let held = game.current_tile;
        game.apply_action(&Action::NextPlayer { player: current }).unwrap();
        assert_eq!(game.current_player(), Some(game.play_order[1]));
        assert_eq!(game.current_tile, held);
    }

    #[test]
    fn test_end_game_and_finished_phase() {
        let mut game = playing(Ruleset::default());
        game.apply_action(&Action::EndGame).unwrap();
        assert!(game.is_finished());
        assert_eq!(game.win_type, WinType::None);
        assert_eq!(game.apply_action(&Action::ShuffleTiles), Err(GameError::WrongPhase));
        assert_eq!(game.apply_action(&Action::EndGame), Err(GameError::WrongPhase));

        let mut fresh = lobby(Ruleset::default(), &[1, 2]);
        assert_eq!(fresh.apply_action(&Action::EndGame), Err(GameError::WrongPhase));
        assert_eq!(fresh.apply_action(&Action::Rematch), Err(GameError::WrongPhase));
    }

    #[test]
    fn test_valid_actions() {
        let mut game = playing(Ruleset {
            radius: 1,
            deck: DeckComposition::only(TileType::NoSharps, 4),
            ..Ruleset::default()
        });
        let current = game.current_player().unwrap();
        let other = game.play_order[1];
        assert!(game.valid_actions(other).is_empty());
        assert_eq!(
            game.valid_actions(current),
            vec![
                Action::DrawTile { player: current },
                Action::NextPlayer { player: current },
            ]
        );

        game.apply_action(&Action::DrawTile { player: current }).unwrap();
        let placements = game
            .valid_actions(current)
            .into_iter()
            .filter(|a| matches!(a, Action::PlaceTile { .. }))
            .count();
        assert_eq!(placements, 7 * 3);
    }

    #[test]
    fn test_rejected_action_leaves_state_unchanged() {
        let mut game = playing(Ruleset::default());
        let before = game.clone();
        let other = game.play_order[1];
        assert!(game.apply_action(&Action::NextPlayer { player: other }).is_err());
        assert_eq!(game, before);

        assert!(apply(&game, &Action::StartGame).is_err());
        assert_eq!(game, before);
    }

    #[test]
    fn test_apply_returns_next_state() {
        let game = playing(Ruleset::default());
        let current = game.current_player().unwrap();
        let action = Action::DrawTile { player: current };

        let next = apply(&game, &action).unwrap();
        assert_eq!(game.current_tile, None);
        assert_eq!(next.deck.len(), game.deck.len() - 1);

        let mut in_place = game.clone();
        in_place.apply_action(&action).unwrap();
        assert_eq!(next, in_place);
    }

    #[test]
    fn test_state_json_keys_are_camel_case() {
        let mut game = playing(Ruleset::default());
        let current = game.current_player().unwrap();
        game.apply_action(&Action::DrawTile { player: current }).unwrap();
        let value = serde_json::to_value(&game).unwrap();

        assert_eq!(value["rules"]["forbidBlocking"], true);
        assert_eq!(value["rules"]["maxPlayers"], 6);
        assert_eq!(value["rules"]["deck"]["noSharps"], 10);
        assert_eq!(value["rules"]["goal"], "opposite_edge");
        assert_eq!(value["players"][0]["isAi"], false);
        assert!(value["currentTile"].is_string());

        let event = serde_json::to_value(GameEvent::TurnPassed {
            player: 1,
            next_player: 2,
        })
        .unwrap();
        assert_eq!(event["TurnPassed"]["nextPlayer"], 2);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(GameError::NotPlayersTurn.to_string(), "Not your turn");
        assert_eq!(
            GameError::IllegalRotationForRule(RuleViolation::Blocks(2)).to_string(),
            "Placement breaks a rule: player 2 has no path left"
        );
    }
}
