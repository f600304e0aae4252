//! reqwest-based client for both remote stages

use super::types::{
    ExecuteRequest, ExecuteResponse, ExecutionResult, Intent, IntentResolution, Parameters,
    ParseRequest, ParseResponse,
};
use super::BackendError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

const PARSE_PATH: &str = "/nlu/parse";
const EXECUTE_PATH: &str = "/execute";

/// Connection settings for the backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Upper bound on each request, connect through body
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the NLU parse and command execute endpoints
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify free text into an intent with entities
    pub async fn parse(&self, text: &str) -> Result<IntentResolution, BackendError> {
        let response: ParseResponse = self.post_json(PARSE_PATH, &ParseRequest { text }).await?;
        Ok(response.into())
    }

    /// Run the command mapped to `intent`
    pub async fn execute(
        &self,
        intent: &Intent,
        parameters: &Parameters,
    ) -> Result<ExecutionResult, BackendError> {
        let response: ExecuteResponse = self
            .post_json(EXECUTE_PATH, &ExecuteRequest { intent, parameters })
            .await?;
        Ok(ExecutionResult {
            result: response.result,
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    BackendError::transport(format!("Connection failed: {e}"))
                } else {
                    BackendError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(BackendError::transport(format!("HTTP {status}: {body}")));
        }

        serde_json::from_str(&body).map_err(|e| {
            BackendError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}
