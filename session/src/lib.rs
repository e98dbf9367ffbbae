use thiserror::Error;

pub mod engine;
pub mod registry;
pub mod service;
pub mod session;

pub use engine::{EngineConfig, EngineLink};
pub use registry::{SessionRegistry, TurnOutcome};
pub use service::{BattleService, EndReply, ErrorKind, ErrorReply, SessionReply, StartReply};
pub use session::{BattleSession, SessionId, SessionState};

#[cfg(test)]
mod tests;

/// Errors surfaced by session-lifecycle operations.
///
/// These are typed results so callers can branch deterministically; nothing
/// in the session layer panics on a caller mistake.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("session {id} is {state:?}; this call requires a different state")]
    InvalidState { id: SessionId, state: SessionState },

    #[error("failed to write to the simulator: {0}")]
    EngineWrite(String),
}
