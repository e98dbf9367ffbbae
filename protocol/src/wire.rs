//! Commands written to the simulator process
//!
//! Verb casing and spelling are defined by the engine and passed through
//! unmodified.

use crate::ident::SideAxis;
use serde::Serialize;

/// One side's bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSpec {
    /// Display name for the side
    pub name: String,
    /// Team specification in the engine's own packed format, passed through
    pub team: String,
}

impl PlayerSpec {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
        }
    }
}

/// Commands the session layer writes to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// >battleInit {"formatid": FORMAT}
    BattleInit { format: String },

    /// >p1player {"name": NAME, "team": TEAM}
    Player { axis: SideAxis, spec: PlayerSpec },

    /// >p1 move 2, >p1 switch 3, >p1 team 123456
    Choice { axis: SideAxis, choice: String },

    /// Pass-through command text, framed with a leading `>`
    Raw(String),
}

impl EngineCommand {
    /// Serialize command to wire format
    pub fn to_wire_format(&self) -> String {
        match self {
            Self::BattleInit { format } => {
                format!(">battleInit {}", serde_json::json!({ "formatid": format }))
            }
            Self::Player { axis, spec } => {
                format!(
                    ">{}player {}",
                    axis.as_str(),
                    serde_json::json!({ "name": spec.name, "team": spec.team })
                )
            }
            Self::Choice { axis, choice } => format!(">{} {}", axis.as_str(), choice),
            Self::Raw(text) => {
                if text.starts_with('>') {
                    text.clone()
                } else {
                    format!(">{}", text)
                }
            }
        }
    }
}
