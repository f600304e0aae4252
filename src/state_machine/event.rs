//! Events that drive the pipeline

use crate::backend::{BackendErrorKind, ExecutionResult, IntentResolution};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// Raw text from the input box, not yet trimmed
    UserSubmit { text: String },

    /// Parse stage returned a well-formed response
    IntentResolved { resolution: IntentResolution },

    /// Execute stage returned a well-formed response
    CommandExecuted { result: ExecutionResult },

    /// Either remote stage failed
    StageFailed {
        stage: Stage,
        error_kind: BackendErrorKind,
        /// Diagnostic detail, logged but never shown in the conversation
        message: String,
    },
}

/// Which remote call an outcome belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Execute,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Execute => "execute",
        }
    }
}
