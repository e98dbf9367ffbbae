//! Per-session parser state carried across protocol lines

use std::collections::{HashMap, HashSet};

use ringside_protocol::SideAxis;

/// Mutable cross-line state for one battle session.
///
/// Owned exclusively by its session and mutated as lines are translated;
/// never shared across sessions.
#[derive(Debug, Default)]
pub struct ParserContext {
    /// Actor and target idents of the move currently resolving.
    pub current_move: Option<(String, String)>,

    /// Effectiveness annotations waiting for their damage line, keyed by
    /// subject ident. Flushed into the next damage event for the same
    /// target only; discarded at move and turn boundaries.
    pub pending_effectiveness: Vec<(String, String)>,

    /// Weather label, overwritten on `-weather`, cleared when it ends.
    pub active_weather: Option<String>,

    /// Labels added on `-fieldstart`, removed on `-fieldend`.
    pub field_conditions: HashSet<String>,

    /// Per-side condition labels, keyed by the normalized side axis.
    pub side_conditions: HashMap<SideAxis, HashSet<String>>,

    /// True between `clearpoke` and `start`.
    pub team_preview_active: bool,

    /// Set by a `split` marker; consumed by exactly the next `-damage`.
    pub suppress_next_damage: bool,

    /// Current turn counter.
    pub turn: u32,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-turn state at an `upkeep` or `turn` boundary. Pending
    /// annotations are discarded even if unconsumed, so they cannot leak
    /// into a future turn.
    pub fn turn_boundary(&mut self) {
        self.current_move = None;
        self.pending_effectiveness.clear();
        self.suppress_next_damage = false;
    }

    /// Clear the in-flight move at a faint or switch.
    pub fn move_ended(&mut self) {
        self.current_move = None;
        self.pending_effectiveness.clear();
    }

    pub fn side_conditions_mut(&mut self, axis: SideAxis) -> &mut HashSet<String> {
        self.side_conditions.entry(axis).or_default()
    }

    /// Whether the in-flight move targets `subject`.
    pub fn move_targets(&self, subject: &str) -> bool {
        matches!(&self.current_move, Some((_, target)) if target.as_str() == subject)
    }

    /// Pull the annotations buffered for `subject` and clear the buffer.
    /// Anything buffered for another subject is dropped with it.
    pub fn take_effectiveness_for(&mut self, subject: &str) -> Vec<String> {
        let taken = self
            .pending_effectiveness
            .iter()
            .filter(|(s, _)| s.as_str() == subject)
            .map(|(_, text)| text.clone())
            .collect();
        self.pending_effectiveness.clear();
        taken
    }
}
