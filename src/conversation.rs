//! Conversation history
//!
//! An append-only log of turns. Turns are plain values: once a turn is in
//! the store nothing hands out mutable access to it again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Greeting seeded into every new session
pub const DEFAULT_GREETING: &str =
    "Hi! I can help with flights, hotels, cars, and packages. What do you need?";

/// Text of the assistant turn appended when either remote stage fails
pub const FAILURE_TEXT: &str = "Something went wrong. Please try again.";

/// Label shown in place of an intent the parser could not resolve
pub const UNKNOWN_INTENT_LABEL: &str = "unknown";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Intent metadata attached to assistant turns produced by a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Resolved intent name, or [`UNKNOWN_INTENT_LABEL`]
    pub intent: String,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

impl Annotation {
    /// Intent badge text, e.g. `search_flights 92%`
    #[allow(clippy::cast_possible_truncation)] // confidence is a ratio, the percentage fits easily
    pub fn badge(&self) -> String {
        let pct = (self.confidence * 100.0).round() as i64;
        format!("{} {pct}%", self.intent)
    }

    /// `Keywords: a, b` line, only when the parser matched any
    pub fn keywords_line(&self) -> Option<String> {
        if self.matched_keywords.is_empty() {
            None
        } else {
            Some(format!("Keywords: {}", self.matched_keywords.join(", ")))
        }
    }
}

/// One entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            annotation: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            annotation: None,
        }
    }

    pub fn annotated(text: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            annotation: Some(annotation),
        }
    }
}

/// Ordered, append-only turn log for one session
#[derive(Debug, Clone)]
pub struct ConversationStore {
    turns: Vec<Turn>,
}

impl ConversationStore {
    /// Create a store holding only the greeting turn
    pub fn seeded(greeting: &str) -> Self {
        Self {
            turns: vec![Turn::assistant(greeting)],
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Owned copy for readers outside the pipeline task
    pub fn snapshot(&self) -> Arc<[Turn]> {
        Arc::from(self.all())
    }
}
