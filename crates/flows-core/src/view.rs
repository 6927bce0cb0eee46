//! What each participant is allowed to see and do.
//!
//! A drawn tile stays private to the player holding it until it is placed.
//! The seed and the deck order never leave the engine, since together they
//! give away every future draw.

use crate::actions::{Action, GameEvent};
use crate::board::Board;
use crate::flow::FlowMap;
use crate::game::{GamePhase, GameState};
use crate::player::{Player, PlayerId};
use crate::tile::TileType;
use crate::victory::WinType;
use serde::{Deserialize, Serialize};

/// Who is looking at a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum GameViewer {
    /// A seated or joining player
    Player(PlayerId),
    Spectator,
    /// The host: sees everything and may act for anyone
    Admin,
}

impl GameViewer {
    /// Whether this viewer may see the tile `player` holds
    pub fn sees_hand_of(self, player: PlayerId) -> bool {
        match self {
            GameViewer::Player(id) => id == player,
            GameViewer::Spectator => false,
            GameViewer::Admin => true,
        }
    }
}

impl Action {
    /// Whether `viewer` may submit this action at all. Whether it is legal
    /// right now is up to the reducer.
    pub fn performable(&self, viewer: GameViewer) -> bool {
        match viewer {
            GameViewer::Player(id) => self.actor() == Some(id),
            GameViewer::Spectator => false,
            GameViewer::Admin => true,
        }
    }
}

impl GameEvent {
    /// Whether `viewer` may see this event
    pub fn visible(&self, viewer: GameViewer) -> bool {
        match self {
            GameEvent::TileDrawn { player, .. } => viewer.sees_hand_of(*player),
            _ => true,
        }
    }
}

/// The events of one action that `viewer` may see, in order
pub fn events_for_viewer(
    events: &[GameEvent],
    viewer: GameViewer,
) -> impl Iterator<Item = &GameEvent> + '_ {
    events.iter().filter(move |event| event.visible(viewer))
}

/// A game as one viewer may see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub viewer: GameViewer,
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub seating_order: Vec<PlayerId>,
    pub play_order: Vec<PlayerId>,
    pub board: Board,
    pub flows: FlowMap,
    pub current_player: Option<PlayerId>,
    /// Only shown to the player holding it
    pub current_tile: Option<TileType>,
    pub tiles_remaining: usize,
    pub winners: Vec<PlayerId>,
    pub win_type: WinType,
}

impl GameView {
    pub fn new(game: &GameState, viewer: GameViewer) -> Self {
        let current_player = game.current_player();
        let current_tile = game
            .current_tile
            .filter(|_| current_player.is_some_and(|holder| viewer.sees_hand_of(holder)));
        Self {
            viewer,
            phase: game.phase,
            players: game.players.clone(),
            seating_order: game.seating_order.clone(),
            play_order: game.play_order.clone(),
            board: game.board.clone(),
            flows: game.flows.clone(),
            current_player,
            current_tile,
            tiles_remaining: game.deck.len(),
            winners: game.winners.clone(),
            win_type: game.win_type,
        }
    }
}
