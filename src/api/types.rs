//! API request and response types

use crate::conversation::{Role, Turn};
use crate::runtime::{SessionHandle, SessionSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for chat action
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub queued: bool,
}

/// Session identity
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SessionHandle> for SessionInfo {
    fn from(handle: &SessionHandle) -> Self {
        Self {
            id: handle.id.clone(),
            created_at: handle.created_at,
        }
    }
}

/// Session summary for listings
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub turn_count: usize,
    pub thinking: bool,
}

/// Response with the list of sessions
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

/// Response with a session and its turns
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: SessionInfo,
    pub turns: Vec<TurnView>,
    pub thinking: bool,
}

impl SessionResponse {
    pub fn new(handle: &SessionHandle, snapshot: &SessionSnapshot) -> Self {
        Self {
            session: handle.into(),
            turns: snapshot.turns.iter().map(TurnView::from).collect(),
            thinking: snapshot.thinking,
        }
    }
}

/// A turn as shown to clients, with display strings precomputed
#[derive(Debug, Serialize, Deserialize)]
pub struct TurnView {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotationView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnotationView {
    pub intent: String,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub badge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_line: Option<String>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text.clone(),
            annotation: turn.annotation.as_ref().map(|a| AnnotationView {
                intent: a.intent.clone(),
                confidence: a.confidence,
                matched_keywords: a.matched_keywords.clone(),
                badge: a.badge(),
                keywords_line: a.keywords_line(),
            }),
        }
    }
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
