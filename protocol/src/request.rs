//! Battle request payloads
//!
//! These types represent the JSON snapshot embedded after a `|request|`
//! marker, telling one side which actions are currently legal.

use crate::ParseError;
use serde::Deserialize;

/// A battle request asking one side to make a decision
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    pub rqid: Option<u64>,

    /// Active combatants and their available moves
    #[serde(default)]
    pub active: Option<Vec<ActiveSlot>>,

    /// Information about the side's team
    pub side: Option<SideInfo>,

    /// Which slots must switch out
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,

    /// Whether this is team preview
    #[serde(default)]
    pub team_preview: bool,

    /// Whether we're waiting for the other side
    #[serde(default)]
    pub wait: bool,
}

impl BattleRequest {
    /// Decode a request payload from its raw JSON text
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(|e| ParseError::InvalidFormat(e.to_string()))
    }

    /// Check if the lead slot is being forced to switch
    pub fn is_force_switch(&self) -> bool {
        self.force_switch
            .as_ref()
            .and_then(|fs| fs.first())
            .copied()
            .unwrap_or(false)
    }

    /// Check if this request requires a decision
    pub fn needs_decision(&self) -> bool {
        !self.wait && (self.team_preview || self.force_switch.is_some() || self.active.is_some())
    }
}

/// An active combatant slot in a request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSlot {
    /// Available moves
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    /// Whether the combatant is trapped
    #[serde(default)]
    pub trapped: bool,

    /// Whether the combatant might be trapped
    #[serde(default)]
    pub maybe_trapped: bool,
}

/// A move slot on an active combatant
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    /// Display name of the move
    #[serde(rename = "move")]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    #[serde(default)]
    pub id: String,

    /// Current PP
    #[serde(default)]
    pub pp: u32,

    /// Maximum PP
    #[serde(rename = "maxpp", default)]
    pub max_pp: u32,

    /// Target type (normal, self, allySide, etc.)
    #[serde(default)]
    pub target: String,

    /// Whether the move is disabled
    #[serde(default)]
    pub disabled: bool,
}

/// Information about one side's team
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideInfo {
    /// Side's display name
    pub name: String,

    /// Side ID (p1 or p2)
    pub id: String,

    /// Combatants on this side
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

/// A combatant on one side's team
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Identifier (e.g. "p1: Pikachu")
    pub ident: String,

    /// Details string (species, level, gender)
    pub details: String,

    /// Current condition (HP/MaxHP status)
    pub condition: String,

    /// Whether this combatant is currently active
    #[serde(default)]
    pub active: bool,

    /// Known moves
    #[serde(default)]
    pub moves: Vec<String>,

    /// Base ability
    #[serde(default)]
    pub base_ability: String,

    /// Held item
    #[serde(default)]
    pub item: String,
}

impl SidePokemon {
    pub fn is_fainted(&self) -> bool {
        self.condition == "0 fnt" || self.condition.ends_with(" fnt")
    }

    /// Get the species name from details
    pub fn species(&self) -> &str {
        self.details.split(',').next().unwrap_or(&self.details)
    }
}
