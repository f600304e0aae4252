//! Trait abstractions for the two remote stages
//!
//! These traits enable testing the runtime with mock implementations.

use crate::backend::{
    BackendClient, BackendError, ExecutionResult, Intent, IntentResolution, Parameters,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Parse stage: free text to intent and entities
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(&self, text: &str) -> Result<IntentResolution, BackendError>;
}

/// Execute stage: run the command behind an intent
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        intent: &Intent,
        parameters: &Parameters,
    ) -> Result<ExecutionResult, BackendError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: IntentResolver + ?Sized> IntentResolver for Arc<T> {
    async fn resolve(&self, text: &str) -> Result<IntentResolution, BackendError> {
        (**self).resolve(text).await
    }
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for Arc<T> {
    async fn execute(
        &self,
        intent: &Intent,
        parameters: &Parameters,
    ) -> Result<ExecutionResult, BackendError> {
        (**self).execute(intent, parameters).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use the HTTP backend as the parse stage
#[derive(Clone)]
pub struct HttpIntentResolver {
    client: Arc<BackendClient>,
}

impl HttpIntentResolver {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntentResolver for HttpIntentResolver {
    async fn resolve(&self, text: &str) -> Result<IntentResolution, BackendError> {
        let start = Instant::now();
        let result = self.client.parse(text).await;
        let duration = start.elapsed();

        match &result {
            Ok(resolution) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    intent = %resolution.intent.label(),
                    confidence = resolution.confidence,
                    entities = resolution.entities.len(),
                    "Parse request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Parse request failed"
                );
            }
        }

        result
    }
}

/// Adapter to use the HTTP backend as the execute stage
#[derive(Clone)]
pub struct HttpCommandExecutor {
    client: Arc<BackendClient>,
}

impl HttpCommandExecutor {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandExecutor for HttpCommandExecutor {
    async fn execute(
        &self,
        intent: &Intent,
        parameters: &Parameters,
    ) -> Result<ExecutionResult, BackendError> {
        let start = Instant::now();
        let result = self.client.execute(intent, parameters).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    intent = %intent.label(),
                    "Execute request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    intent = %intent.label(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Execute request failed"
                );
            }
        }

        result
    }
}
