//! Player identity, display color, and seat.

use crate::board::Edge;
use serde::{Deserialize, Serialize};

/// Stable player identifier, chosen by whoever adds the player
pub type PlayerId = u32;

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
    ];

    /// First color not in `used`, falling back to red once all are taken
    pub fn first_unused(used: impl IntoIterator<Item = PlayerColor>) -> Self {
        let used: Vec<PlayerColor> = used.into_iter().collect();
        Self::ALL
            .into_iter()
            .find(|color| !used.contains(color))
            .unwrap_or(PlayerColor::Red)
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xE74C3C,
            PlayerColor::Blue => 0x3498DB,
            PlayerColor::Green => 0x27AE60,
            PlayerColor::Yellow => 0xF1C40F,
            PlayerColor::Purple => 0x8E44AD,
            PlayerColor::Orange => 0xE67E22,
        }
    }
}

/// A participant in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    /// Board edge, assigned during seating and fixed afterwards
    pub edge: Option<Edge>,
    pub is_ai: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: PlayerColor, is_ai: bool) -> Self {
        Self {
            id,
            name,
            color,
            edge: None,
            is_ai,
        }
    }

    pub fn is_seated(&self) -> bool {
        self.edge.is_some()
    }
}
