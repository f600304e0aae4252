//! Pipeline state types

use crate::backend::IntentResolution;
use crate::conversation::{DEFAULT_GREETING, FAILURE_TEXT};

/// Pipeline state for one session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    /// Ready for user input, no remote call in flight
    #[default]
    Idle,

    /// Parse request in flight
    Resolving,

    /// Execute request in flight; the resolution is kept for the annotation
    Executing { resolution: IntentResolution },
}

impl PipelineState {
    /// The busy ("thinking") flag shown to the presentation layer
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineState::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Resolving => "resolving",
            PipelineState::Executing { .. } => "executing",
        }
    }
}

/// Per-session constants, fixed when the session starts
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub greeting: String,
    pub failure_text: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            greeting: DEFAULT_GREETING.to_string(),
            failure_text: FAILURE_TEXT.to_string(),
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }
}
