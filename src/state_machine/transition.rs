//! Pure state transition function

use super::{Effect, Event, PipelineState, SessionContext, Stage};
use crate::backend::IntentResolution;
use crate::conversation::{Annotation, Turn};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: PipelineState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: PipelineState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. A refused event leaves the state and the
/// conversation untouched.
#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Still working on the previous message")]
    Busy,
    #[error("Message is empty")]
    EmptyInput,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(
    state: &PipelineState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + UserSubmit -> Resolving. The user turn goes in before any
        // network activity.
        (PipelineState::Idle, Event::UserSubmit { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            Ok(TransitionResult::new(PipelineState::Resolving)
                .with_effect(Effect::append(Turn::user(text)))
                .with_effect(Effect::ResolveIntent {
                    text: text.to_string(),
                }))
        }

        // One run at a time; extra submissions are dropped, not queued
        (_, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        // Resolving + IntentResolved -> Executing, even when nothing matched
        (PipelineState::Resolving, Event::IntentResolved { resolution }) => {
            let effect = Effect::ExecuteCommand {
                intent: resolution.intent.clone(),
                parameters: resolution.entities.clone(),
            };
            Ok(TransitionResult::new(PipelineState::Executing { resolution }).with_effect(effect))
        }

        // Executing + CommandExecuted -> Idle with the annotated result turn
        (PipelineState::Executing { resolution }, Event::CommandExecuted { result }) => {
            let turn = Turn::annotated(result.render(), annotate(resolution));
            Ok(TransitionResult::new(PipelineState::Idle).with_effect(Effect::append(turn)))
        }

        // Failure at the in-flight stage -> Idle with the generic failure turn
        (PipelineState::Resolving, Event::StageFailed { stage: Stage::Resolve, .. })
        | (PipelineState::Executing { .. }, Event::StageFailed { stage: Stage::Execute, .. }) => {
            Ok(TransitionResult::new(PipelineState::Idle)
                .with_effect(Effect::append(Turn::assistant(&context.failure_text))))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} while {}",
            state.as_str()
        ))),
    }
}

fn annotate(resolution: &IntentResolution) -> Annotation {
    Annotation {
        intent: resolution.intent.label().to_string(),
        confidence: resolution.confidence,
        matched_keywords: resolution.matched_keywords.clone(),
    }
}
