//! Effects produced by state transitions

use crate::backend::{Intent, Parameters};
use crate::conversation::Turn;

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a turn to the conversation store
    AppendTurn { turn: Turn },

    /// Call the NLU service (spawned, reports back as an event)
    ResolveIntent { text: String },

    /// Call the command service (spawned, reports back as an event)
    ExecuteCommand {
        intent: Intent,
        parameters: Parameters,
    },
}

impl Effect {
    pub fn append(turn: Turn) -> Self {
        Effect::AppendTurn { turn }
    }
}
