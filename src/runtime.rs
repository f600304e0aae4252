//! Runtime for chat sessions
//!
//! Each session gets its own pipeline task, conversation store and
//! channels. Sessions share nothing but the backend clients.

mod executor;
pub mod traits;


pub use executor::PipelineRuntime;
pub use traits::*;

use crate::conversation::Turn;
use crate::state_machine::{Event, SessionContext};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, RwLock};

/// Runtime type used by the server: backend clients behind trait objects
pub type SharedRuntime = PipelineRuntime<Arc<dyn IntentResolver>, Arc<dyn CommandExecutor>>;

/// Read-only view of a session, republished after every transition
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub turns: Arc<[Turn]>,
    /// Busy flag; the presentation layer disables sending while set
    pub thinking: bool,
    pub state: &'static str,
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init {
        turns: Arc<[Turn]>,
        thinking: bool,
    },
    Turn {
        turn: Turn,
    },
    StateChange {
        thinking: bool,
    },
    /// A submission bounced off the entry guard
    Rejected {
        reason: String,
    },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: String,
    pub created_at: DateTime<Utc>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Current snapshot plus a receiver for everything published after it.
    /// The runtime publishes under the snapshot's write lock, so holding the
    /// read lock while subscribing leaves no gap and no overlap.
    pub fn subscribe(&self) -> (SessionSnapshot, broadcast::Receiver<SseEvent>) {
        let snapshot = self.snapshot_rx.borrow();
        let events = self.broadcast_tx.subscribe();
        (snapshot.clone(), events)
    }

    /// Hand raw input to the pipeline. Acceptance is decided by the
    /// pipeline's entry guard, not here.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), String> {
        self.event_tx
            .send(Event::UserSubmit { text: text.into() })
            .await
            .map_err(|_| "Session is not running".to_string())
    }
}

/// Registry of live sessions
pub struct SessionManager {
    resolver: Arc<dyn IntentResolver>,
    executor: Arc<dyn CommandExecutor>,
    greeting: String,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(
        resolver: Arc<dyn IntentResolver>,
        executor: Arc<dyn CommandExecutor>,
        greeting: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            executor,
            greeting: greeting.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session seeded with the greeting
    pub async fn create_session(&self) -> SessionHandle {
        let id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&id).with_greeting(&self.greeting);

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            turns: Arc::from(Vec::new()),
            thinking: false,
            state: "idle",
        });

        let runtime: SharedRuntime = PipelineRuntime::new(
            context,
            Arc::clone(&self.resolver),
            Arc::clone(&self.executor),
            event_rx,
            &event_tx,
            broadcast_tx.clone(),
            snapshot_tx,
        );
        tokio::spawn(runtime.run());

        let handle = SessionHandle {
            id: id.clone(),
            created_at: Utc::now(),
            event_tx,
            broadcast_tx,
            snapshot_rx,
        };

        self.sessions.write().await.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, "Session created");

        handle
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// All sessions, oldest first
    pub async fn list(&self) -> Vec<SessionHandle> {
        let mut handles: Vec<SessionHandle> =
            self.sessions.read().await.values().cloned().collect();
        handles.sort_by_key(|h| h.created_at);
        handles
    }

    /// Forget a session. Its pipeline stops once in-flight calls and
    /// outstanding handles are gone.
    pub async fn remove(&self, id: &str) -> Option<SessionHandle> {
        let removed = self.sessions.write().await.remove(id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }
}
