//! Flows - rules engine for a hex-tile connection game
//!
//! This crate provides the core game logic for Flows, including:
//! - Hex coordinate system and a radius-bounded hexagonal board
//! - Tiles that join their six sides in three pairs, at six rotations
//! - Flow tracing from each player's board edge through placed tiles
//! - Placement legality, seating, turn order and win detection
//! - Game state machine driven by serializable actions
//!
//! # Architecture
//!
//! The engine does no I/O and keeps no global state. A game is a
//! `GameState` value plus a log of `Action`s; replaying the log under the
//! same ruleset and seed rebuilds the state exactly. Storage, transport and
//! rendering live outside this crate.
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and cell sides
//! - [`tile`]: Tile types, rotations and connection maps
//! - [`board`]: Board cells, edges and placed tiles
//! - [`flow`]: Flow tracing and per-side ownership
//! - [`legality`]: Placement validation
//! - [`seating`]: Seeded seating order and clockwise play order
//! - [`victory`]: Win and stalemate detection
//! - [`rules`]: Ruleset configuration
//! - [`actions`]: Actions, persisted records and events
//! - [`game`]: Game state machine
//! - [`view`]: Per-viewer visibility of hands, events and state

pub mod actions;
pub mod board;
pub mod flow;
pub mod game;
pub mod hex;
pub mod legality;
pub mod player;
pub mod rules;
pub mod seating;
pub mod tile;
pub mod victory;
pub mod view;

// Re-export commonly used types
pub use actions::{Action, ActionRecord, GameEvent};
pub use board::{Board, Edge, PlacedTile};
pub use flow::{trace_flow, Flow, FlowEdges, FlowEnd, FlowMap, FlowStep};
pub use game::{apply, replay, GameError, GamePhase, GameState, Placement};
pub use hex::{Direction, HexPosition};
pub use legality::{
    blocked_player, check_placement, has_potential_path, is_legal_move, legal_placements,
    RuleViolation,
};
pub use player::{Player, PlayerColor, PlayerId};
pub use rules::{DeckComposition, GoalRule, Ruleset};
pub use seating::{play_order, seating_order, seeded_rng, RngStream};
pub use tile::{connections_for, Connections, Rotation, Tile, TileType};
pub use victory::{detect_winners, Outcome, WinType};
pub use view::{events_for_viewer, GameView, GameViewer};
