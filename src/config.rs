//! Service configuration from the environment

use crate::backend::{BackendConfig, DEFAULT_BACKEND_URL};
use crate::conversation::DEFAULT_GREETING;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the chat service
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub backend: BackendConfig,
    pub port: u16,
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            port: DEFAULT_PORT,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("BACKEND_URL")
            .or_else(|| lookup("VITE_BACKEND_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let timeout_secs = lookup("BACKEND_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let port = lookup("TRAVEL_CHAT_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let greeting = lookup("TRAVEL_CHAT_GREETING")
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        Self {
            backend: BackendConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            port,
            greeting,
        }
    }
}
