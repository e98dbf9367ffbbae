//! One live battle session

use std::fmt;

use ringside_flow::{BattleEvent, ParserContext, RequestState, translate};
use ringside_protocol::tokenize;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::EngineLink;

/// Opaque session identifier, generated at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Setup,
    Active,
    Completed,
}

/// A live battle against one engine process.
///
/// The event log is append-only; entries are never reordered, mutated, or
/// re-translated.
pub struct BattleSession {
    pub id: SessionId,
    pub format: String,
    pub state: SessionState,
    event_log: Vec<String>,
    ctx: ParserContext,
    pub request: RequestState,
    pub(crate) engine: EngineLink,
}

impl BattleSession {
    pub(crate) fn new(format: &str, engine: EngineLink) -> Self {
        Self {
            id: SessionId::generate(),
            format: format.to_string(),
            state: SessionState::Setup,
            event_log: Vec::new(),
            ctx: ParserContext::new(),
            request: RequestState::new(),
            engine,
        }
    }

    pub fn events(&self) -> &[String] {
        &self.event_log
    }

    /// Fold a batch of raw output chunks into the session: request-state
    /// scan, line translation, and event aggregation. Returns the events
    /// this batch appended.
    pub fn absorb(&mut self, chunks: &[String]) -> Vec<String> {
        let mut appended = Vec::new();
        for chunk in chunks {
            if self.request.scan_chunk(chunk) {
                self.state = SessionState::Completed;
            }
            for raw in chunk.lines() {
                let Some(line) = tokenize(raw) else {
                    continue;
                };
                for event in translate(&line, &mut self.ctx) {
                    self.append(event, &mut appended);
                }
            }
        }
        appended
    }

    /// Append one event, dropping consecutive exact duplicates. Turn, win,
    /// and tie events are always retained.
    fn append(&mut self, event: BattleEvent, appended: &mut Vec<String>) {
        if !event.always_kept() && self.event_log.last() == Some(&event.text) {
            return;
        }
        self.event_log.push(event.text.clone());
        appended.push(event.text);
    }
}
