//! Concurrency-safe store of live sessions and the command dispatcher

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use ringside_protocol::{EngineCommand, PlayerSpec, SideAxis};

use crate::SessionError;
use crate::engine::{EngineConfig, EngineLink};
use crate::session::{BattleSession, SessionId, SessionState};

/// Outcome of a session call: the newly produced events plus the updated
/// turn-flow flags.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub events: Vec<String>,
    pub state: SessionState,
    pub player_force_switch: bool,
    pub cpu_force_switch: bool,
    pub team_preview_pending: bool,
}

/// Keyed store of active battle sessions.
///
/// The registry map is the only state shared across callers. Each session
/// sits behind its own mutex, so commands for the same session run one at a
/// time in submission order while different sessions proceed independently.
pub struct SessionRegistry {
    config: EngineConfig,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<BattleSession>>>>,
}

impl SessionRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session in the Setup state with its own engine process.
    pub async fn create(&self, format: &str) -> Result<SessionId> {
        let engine = EngineLink::spawn(&self.config)?;
        Ok(self.create_with_engine(format, engine).await)
    }

    /// Create a session over a pre-built engine link.
    pub async fn create_with_engine(&self, format: &str, engine: EngineLink) -> SessionId {
        let session = BattleSession::new(format, engine);
        let id = session.id.clone();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session = %id, format, "session created");
        id
    }

    async fn lookup(&self, id: &SessionId) -> Result<Arc<Mutex<BattleSession>>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Bootstrap the engine with both sides and move the session to Active.
    pub async fn initialize(
        &self,
        id: &SessionId,
        side_a: PlayerSpec,
        side_b: PlayerSpec,
    ) -> Result<TurnOutcome, SessionError> {
        let slot = self.lookup(id).await?;
        let mut session = slot.lock().await;
        if session.state != SessionState::Setup {
            return Err(SessionError::InvalidState {
                id: id.clone(),
                state: session.state,
            });
        }

        let format = session.format.clone();
        session
            .engine
            .send(&EngineCommand::BattleInit { format }.to_wire_format())?;
        session.engine.send(
            &EngineCommand::Player {
                axis: SideAxis::P1,
                spec: side_a,
            }
            .to_wire_format(),
        )?;
        session.engine.send(
            &EngineCommand::Player {
                axis: SideAxis::P2,
                spec: side_b,
            }
            .to_wire_format(),
        )?;
        session.state = SessionState::Active;

        let chunks = session.engine.drain(self.config.settle, self.config.idle).await;
        let events = session.absorb(&chunks);
        Ok(outcome(&session, events))
    }

    /// Relay one command to the engine and return the newly produced
    /// events. An engine that stays silent for the settle window yields an
    /// empty event list with flags unchanged, never an error.
    pub async fn dispatch(
        &self,
        id: &SessionId,
        command_text: &str,
    ) -> Result<TurnOutcome, SessionError> {
        let slot = self.lookup(id).await?;
        let mut session = slot.lock().await;
        if session.state != SessionState::Active {
            return Err(SessionError::InvalidState {
                id: id.clone(),
                state: session.state,
            });
        }

        session
            .engine
            .send(&EngineCommand::Raw(command_text.to_string()).to_wire_format())?;

        let chunks = session.engine.drain(self.config.settle, self.config.idle).await;
        let events = session.absorb(&chunks);
        Ok(outcome(&session, events))
    }

    /// Read-only snapshot of the full event log and flags; no engine write.
    pub async fn status(&self, id: &SessionId) -> Result<TurnOutcome, SessionError> {
        let slot = self.lookup(id).await?;
        let session = slot.lock().await;
        let events = session.events().to_vec();
        Ok(outcome(&session, events))
    }

    /// Close the engine (best effort) and drop the session. Locks the
    /// session first, so an outstanding dispatch finishes before its engine
    /// handle is torn down; the entry is removed regardless of the close
    /// outcome.
    pub async fn end(&self, id: &SessionId) -> Result<(), SessionError> {
        let slot = self.lookup(id).await?;
        {
            let mut session = slot.lock().await;
            session.engine.shutdown().await;
        }
        self.sessions.write().await.remove(id);
        debug!(session = %id, "session ended");
        Ok(())
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn outcome(session: &BattleSession, events: Vec<String>) -> TurnOutcome {
    TurnOutcome {
        events,
        state: session.state,
        player_force_switch: session.request.player_force_switch,
        cpu_force_switch: session.request.cpu_force_switch,
        team_preview_pending: session.request.team_preview_pending,
    }
}
