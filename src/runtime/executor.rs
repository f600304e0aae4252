//! Pipeline runtime executor

use super::traits::{CommandExecutor, IntentResolver};
use super::{SessionSnapshot, SseEvent};

use crate::backend::{BackendError, BackendErrorKind};
use crate::conversation::ConversationStore;
use crate::state_machine::{
    transition, Effect, Event, PipelineState, SessionContext, Stage, TransitionError,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Owns one session's state and conversation. Remote calls run as spawned
/// tasks and report back through `event_tx`, so the loop keeps answering
/// (and rejecting) submissions while a call is in flight.
///
/// The runtime only keeps a weak sender to itself. It stops once every
/// session handle is dropped and no stage call is still in flight.
pub struct PipelineRuntime<R, X>
where
    R: IntentResolver + 'static,
    X: CommandExecutor + 'static,
{
    context: SessionContext,
    state: PipelineState,
    store: ConversationStore,
    resolver: Arc<R>,
    executor: Arc<X>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<R, X> PipelineRuntime<R, X>
where
    R: IntentResolver + 'static,
    X: CommandExecutor + 'static,
{
    pub fn new(
        context: SessionContext,
        resolver: R,
        executor: X,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let store = ConversationStore::seeded(&context.greeting);
        let runtime = Self {
            context,
            state: PipelineState::Idle,
            store,
            resolver: Arc::new(resolver),
            executor: Arc::new(executor),
            event_rx,
            event_tx: event_tx.downgrade(),
            broadcast_tx,
            snapshot_tx,
        };
        runtime.publish(Vec::new());
        runtime
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting pipeline runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(session_id = %self.context.session_id, "Pipeline runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        if let Event::StageFailed {
            stage,
            error_kind,
            message,
        } = &event
        {
            tracing::warn!(
                session_id = %self.context.session_id,
                stage = stage.as_str(),
                kind = error_kind.as_str(),
                error = %message,
                "Pipeline stage failed"
            );
        }

        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                self.reject(&e);
                return;
            }
        };

        let was_busy = self.state.is_busy();
        self.state = result.new_state;

        let mut outgoing = Vec::new();
        for effect in result.effects {
            if let Some(event) = self.execute_effect(effect) {
                outgoing.push(event);
            }
        }
        tracing::debug!(
            session_id = %self.context.session_id,
            state = self.state.as_str(),
            turns = self.store.len(),
            "Pipeline transition"
        );

        let thinking = self.state.is_busy();
        if was_busy != thinking {
            outgoing.push(SseEvent::StateChange { thinking });
        }
        self.publish(outgoing);
    }

    fn reject(&self, error: &TransitionError) {
        match error {
            TransitionError::InvalidTransition(detail) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    detail = %detail,
                    "Ignoring event not valid in current state"
                );
            }
            TransitionError::Busy | TransitionError::EmptyInput => {
                tracing::info!(
                    session_id = %self.context.session_id,
                    reason = %error,
                    "Submission rejected"
                );
                let _ = self.broadcast_tx.send(SseEvent::Rejected {
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Apply one effect. Returns the stream event it produces, if any; the
    /// caller sends it together with the next snapshot.
    fn execute_effect(&mut self, effect: Effect) -> Option<SseEvent> {
        match effect {
            Effect::AppendTurn { turn } => {
                self.store.append(turn.clone());
                Some(SseEvent::Turn { turn })
            }
            Effect::ResolveIntent { text } => {
                let resolver = Arc::clone(&self.resolver);
                self.spawn_stage(Stage::Resolve, async move {
                    let resolution = resolver.resolve(&text).await?;
                    Ok::<_, BackendError>(Event::IntentResolved { resolution })
                });
                None
            }
            Effect::ExecuteCommand { intent, parameters } => {
                let executor = Arc::clone(&self.executor);
                self.spawn_stage(Stage::Execute, async move {
                    let result = executor.execute(&intent, &parameters).await?;
                    Ok::<_, BackendError>(Event::CommandExecuted { result })
                });
                None
            }
        }
    }

    /// Run one remote call in the background and feed its outcome back as an
    /// event. A panicking call still reports a failure so the session can
    /// leave the busy state.
    fn spawn_stage<F>(&self, stage: Stage, call: F)
    where
        F: Future<Output = Result<Event, BackendError>> + Send + 'static,
    {
        // Every handle is gone; nobody is left to read the outcome
        let Some(event_tx) = self.event_tx.upgrade() else {
            tracing::debug!(
                session_id = %self.context.session_id,
                stage = stage.as_str(),
                "Session closed, skipping stage call"
            );
            return;
        };

        tokio::spawn(async move {
            let event = match tokio::spawn(call).await {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => Event::StageFailed {
                    stage,
                    error_kind: e.kind,
                    message: e.message,
                },
                Err(join_error) => Event::StageFailed {
                    stage,
                    error_kind: BackendErrorKind::Transport,
                    message: format!("{} call aborted: {join_error}", stage.as_str()),
                },
            };

            // A strong sender keeps the loop alive until this arrives
            let _ = event_tx.send(event).await;
        });
    }

    /// Replace the snapshot and send `events` while holding the snapshot's
    /// write lock. A subscriber that reads the snapshot under its read lock
    /// (`SessionHandle::subscribe`) therefore sees each event either in the
    /// snapshot or on its receiver, never neither and never both.
    fn publish(&self, events: Vec<SseEvent>) {
        let snapshot = SessionSnapshot {
            turns: self.store.snapshot(),
            thinking: self.state.is_busy(),
            state: self.state.as_str(),
        };
        self.snapshot_tx.send_modify(|current| {
            *current = snapshot;
            for event in events {
                let _ = self.broadcast_tx.send(event);
            }
        });
    }
}
