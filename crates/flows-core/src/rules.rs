//! Ruleset configuration.
//!
//! A `Ruleset` is fixed when the game state is created and travels with it, so
//! a replay of the action log under the same ruleset and seed is exact.

use crate::board::Edge;
use crate::game::GameError;
use crate::tile::TileType;
use serde::{Deserialize, Serialize};

/// Largest supported board radius
pub const MAX_RADIUS: i32 = 8;

/// Which edges a flow must reach to win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalRule {
    /// Only the edge directly across the board
    #[default]
    OppositeEdge,
    /// Any edge other than the player's own. A corner tile with a sharp turn
    /// already reaches the neighboring edge, so this suits small boards only.
    AnyOtherEdge,
}

impl GoalRule {
    /// Whether a flow from `own` that leaves the board across `reached` wins
    pub fn accepts(self, own: Edge, reached: Edge) -> bool {
        match self {
            GoalRule::AnyOtherEdge => reached != own,
            GoalRule::OppositeEdge => reached == own.opposite(),
        }
    }
}

/// Number of tiles of each type in a fresh deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckComposition {
    pub no_sharps: u8,
    pub one_sharp: u8,
    pub two_sharps: u8,
    pub three_sharps: u8,
}

impl Default for DeckComposition {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl DeckComposition {
    /// The same number of tiles of every type
    pub const fn uniform(count: u8) -> Self {
        Self {
            no_sharps: count,
            one_sharp: count,
            two_sharps: count,
            three_sharps: count,
        }
    }

    /// A deck made only of one tile type
    pub fn only(tile_type: TileType, count: u8) -> Self {
        let mut deck = Self::uniform(0);
        match tile_type {
            TileType::NoSharps => deck.no_sharps = count,
            TileType::OneSharp => deck.one_sharp = count,
            TileType::TwoSharps => deck.two_sharps = count,
            TileType::ThreeSharps => deck.three_sharps = count,
        }
        deck
    }

    pub fn count(&self, tile_type: TileType) -> u8 {
        match tile_type {
            TileType::NoSharps => self.no_sharps,
            TileType::OneSharp => self.one_sharp,
            TileType::TwoSharps => self.two_sharps,
            TileType::ThreeSharps => self.three_sharps,
        }
    }

    pub fn total(&self) -> usize {
        TileType::ALL.iter().map(|t| self.count(*t) as usize).sum()
    }

    /// The unshuffled deck, grouped by type
    pub fn build(&self) -> Vec<TileType> {
        TileType::ALL
            .iter()
            .flat_map(|t| std::iter::repeat(*t).take(self.count(*t) as usize))
            .collect()
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ruleset {
    /// Board radius in cells from the center
    pub radius: i32,
    /// Tiles in a fresh deck
    pub deck: DeckComposition,
    /// Which edges count as a completed flow
    pub goal: GoalRule,
    /// Reject placements that send the placing player's flow back out
    /// through their own edge
    pub forbid_self_loops: bool,
    /// Reject placements that leave some player with no possible route to
    /// a goal edge
    pub forbid_blocking: bool,
    pub min_players: usize,
    pub max_players: usize,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            radius: 3,
            deck: DeckComposition::default(),
            goal: GoalRule::default(),
            forbid_self_loops: true,
            forbid_blocking: true,
            min_players: 2,
            max_players: 6,
        }
    }
}

impl Ruleset {
    /// Parse a ruleset from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let rules: Ruleset =
            serde_json::from_str(json).map_err(|e| GameError::InvalidRuleset(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(1..=MAX_RADIUS).contains(&self.radius) {
            return Err(GameError::InvalidRuleset(format!(
                "radius must be between 1 and {MAX_RADIUS}, got {}",
                self.radius
            )));
        }
        if self.min_players < 2 || self.min_players > self.max_players || self.max_players > 6 {
            return Err(GameError::InvalidRuleset(format!(
                "player limits {}..={} must satisfy 2 <= min <= max <= 6",
                self.min_players, self.max_players
            )));
        }
        if self.deck.total() == 0 {
            return Err(GameError::InvalidRuleset("deck has no tiles".into()));
        }
        Ok(())
    }
}
