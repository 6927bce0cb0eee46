//! Actions accepted by the reducer and the events they produce.
//!
//! `Action` is the unit of the persisted game log: an append-only sequence of
//! `ActionRecord`s, replayed in order from an empty state, rebuilds the game.

use crate::board::Edge;
use crate::hex::HexPosition;
use crate::player::{PlayerColor, PlayerId};
use crate::tile::{Rotation, Tile, TileType};
use crate::victory::WinType;
use serde::{Deserialize, Serialize};

/// Every state transition a client can request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // ==================== Lobby ====================
    AddPlayer {
        id: PlayerId,
        name: String,
        /// Picks the first unused color when absent
        #[serde(default)]
        color: Option<PlayerColor>,
        #[serde(default)]
        is_ai: bool,
    },
    RemovePlayer {
        id: PlayerId,
    },
    /// Close the lobby and draw the seating order
    StartGame,

    // ==================== Seating ====================
    /// Claim an edge; AI players may leave it to the engine
    SelectEdge {
        player: PlayerId,
        #[serde(default)]
        edge: Option<Edge>,
    },

    // ==================== Play ====================
    ShuffleTiles,
    DrawTile {
        player: PlayerId,
    },
    PlaceTile {
        player: PlayerId,
        position: HexPosition,
        rotation: Rotation,
    },
    /// Pass without placing
    NextPlayer {
        player: PlayerId,
    },

    // ==================== Lifecycle ====================
    EndGame,
    /// Start a new game with the same players and seats
    Rematch,
}

impl Action {
    /// The player on whose behalf the action is taken, if any
    pub fn actor(&self) -> Option<PlayerId> {
        match self {
            Action::AddPlayer { id, .. } | Action::RemovePlayer { id } => Some(*id),
            Action::SelectEdge { player, .. }
            | Action::DrawTile { player }
            | Action::PlaceTile { player, .. }
            | Action::NextPlayer { player } => Some(*player),
            Action::StartGame | Action::ShuffleTiles | Action::EndGame | Action::Rematch => None,
        }
    }

    /// Wire name of the action
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddPlayer { .. } => "ADD_PLAYER",
            Action::RemovePlayer { .. } => "REMOVE_PLAYER",
            Action::StartGame => "START_GAME",
            Action::SelectEdge { .. } => "SELECT_EDGE",
            Action::ShuffleTiles => "SHUFFLE_TILES",
            Action::DrawTile { .. } => "DRAW_TILE",
            Action::PlaceTile { .. } => "PLACE_TILE",
            Action::NextPlayer { .. } => "NEXT_PLAYER",
            Action::EndGame => "END_GAME",
            Action::Rematch => "REMATCH",
        }
    }
}

/// Persisted form of an action: `{type, payload, playerId, timestamp, sequence}`.
///
/// Timestamp and sequence belong to whoever stores the log; the reducer only
/// reads the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(flatten)]
    pub action: Action,
    pub player_id: Option<PlayerId>,
    pub timestamp: u64,
    pub sequence: u64,
}

impl ActionRecord {
    pub fn new(action: Action, timestamp: u64, sequence: u64) -> Self {
        Self {
            player_id: action.actor(),
            action,
            timestamp,
            sequence,
        }
    }
}

/// What a successful action did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum GameEvent {
    PlayerAdded {
        player: PlayerId,
        color: PlayerColor,
    },
    PlayerRemoved {
        player: PlayerId,
    },
    /// Lobby closed; players pick edges in this order
    SeatingStarted {
        order: Vec<PlayerId>,
    },
    EdgeSelected {
        player: PlayerId,
        edge: Edge,
    },
    /// Everyone is seated; turns follow this order
    PlayStarted {
        order: Vec<PlayerId>,
    },
    TilesShuffled {
        remaining: usize,
    },
    TileDrawn {
        player: PlayerId,
        tile_type: TileType,
    },
    TilePlaced {
        player: PlayerId,
        position: HexPosition,
        tile: Tile,
    },
    TurnPassed {
        player: PlayerId,
        next_player: PlayerId,
    },
    GameFinished {
        winners: Vec<PlayerId>,
        win_type: WinType,
    },
    RematchStarted {
        rematch: u32,
    },
}
