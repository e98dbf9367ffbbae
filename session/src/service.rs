//! Service facade for the UI-facing transport adapter
//!
//! Mirrors the HTTP-shaped API as serializable reply values; the transport
//! layer maps them onto whatever wire it speaks. No method here panics or
//! throws past the typed error.

use serde::Serialize;

use ringside_protocol::PlayerSpec;

use crate::SessionError;
use crate::engine::EngineConfig;
use crate::registry::{SessionRegistry, TurnOutcome};
use crate::session::{SessionId, SessionState};

/// Reply for a session-scoped call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReply {
    pub events: Vec<String>,
    pub state: SessionState,
    pub player_force_switch: bool,
    pub cpu_force_switch: bool,
    pub team_preview_pending: bool,
}

impl From<TurnOutcome> for SessionReply {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            events: outcome.events,
            state: outcome.state,
            player_force_switch: outcome.player_force_switch,
            cpu_force_switch: outcome.cpu_force_switch,
            team_preview_pending: outcome.team_preview_pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReply {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndReply {
    pub ok: bool,
}

/// Error kinds surfaced to the transport layer as `{"error": KIND}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    SessionNotFound,
    InvalidState,
    EngineWriteFailure,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReply {
    pub error: ErrorKind,
}

impl SessionError {
    /// Map to the structured reply shape for the transport layer.
    pub fn reply(&self) -> ErrorReply {
        let error = match self {
            SessionError::NotFound(_) => ErrorKind::SessionNotFound,
            SessionError::InvalidState { .. } => ErrorKind::InvalidState,
            SessionError::EngineWrite(_) => ErrorKind::EngineWriteFailure,
        };
        ErrorReply { error }
    }
}

/// Front door for battle session management.
pub struct BattleService {
    registry: SessionRegistry,
}

impl BattleService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Create a session in the Setup state.
    pub async fn start(&self, format: &str) -> anyhow::Result<StartReply> {
        Ok(StartReply {
            session_id: self.registry.create(format).await?,
        })
    }

    /// Bootstrap both sides and transition the session to Active.
    pub async fn initialize(
        &self,
        id: &SessionId,
        side_a: PlayerSpec,
        side_b: PlayerSpec,
    ) -> Result<SessionReply, SessionError> {
        Ok(self.registry.initialize(id, side_a, side_b).await?.into())
    }

    /// Relay a command to the engine and return the new events.
    pub async fn command(&self, id: &SessionId, text: &str) -> Result<SessionReply, SessionError> {
        Ok(self.registry.dispatch(id, text).await?.into())
    }

    /// Read-only snapshot; no engine write.
    pub async fn status(&self, id: &SessionId) -> Result<SessionReply, SessionError> {
        Ok(self.registry.status(id).await?.into())
    }

    /// End the session, removing it from the registry.
    pub async fn end(&self, id: &SessionId) -> Result<EndReply, SessionError> {
        self.registry.end(id).await?;
        Ok(EndReply { ok: true })
    }
}
