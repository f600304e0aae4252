//! Request/response types for the NLU and command services

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::conversation::UNKNOWN_INTENT_LABEL;

/// Parameter mapping extracted by the parser and handed to the executor
pub type Parameters = Map<String, Value>;

/// Intent identifier as resolved by the NLU service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Intent {
    Named(String),
    /// The parser found no match
    #[default]
    Unresolved,
}

impl Intent {
    /// Normalize the wire value. Null and absent mean no match; any string,
    /// even an empty one, is passed on to the executor as-is.
    pub fn from_wire(raw: Option<String>) -> Self {
        raw.map_or(Intent::Unresolved, Intent::Named)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Intent::Named(name) => Some(name),
            Intent::Unresolved => None,
        }
    }

    /// Display label, `unknown` when unresolved or empty
    pub fn label(&self) -> &str {
        self.name()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_INTENT_LABEL)
    }
}

impl Serialize for Intent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

/// Normalized result of the parse stage
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntentResolution {
    pub intent: Intent,
    pub confidence: f64,
    pub entities: Parameters,
    pub matched_keywords: Vec<String>,
}

impl From<ParseResponse> for IntentResolution {
    fn from(resp: ParseResponse) -> Self {
        Self {
            intent: Intent::from_wire(resp.intent),
            confidence: resp.confidence.unwrap_or(0.0),
            entities: resp.entities.unwrap_or_default(),
            matched_keywords: resp.matched_keywords.unwrap_or_default(),
        }
    }
}

/// Opaque payload returned by the command service
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub result: Value,
}

impl ExecutionResult {
    /// Pretty-printed JSON with two-space indentation
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.result).unwrap_or_else(|_| "null".to_string())
    }
}

// Wire types

#[derive(Debug, Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseResponse {
    intent: Option<String>,
    confidence: Option<f64>,
    entities: Option<Parameters>,
    matched_keywords: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExecuteRequest<'a> {
    pub intent: &'a Intent,
    pub parameters: &'a Parameters,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecuteResponse {
    /// Required; `null` is a legitimate payload but a missing key is not
    pub result: Value,
}
