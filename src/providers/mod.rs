/*!
 * Model client implementations.
 *
 * - `openai`: OpenAI Responses API with strict structured output
 * - `mock`: scripted client for tests and benchmarks
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::models::TranslationItem;

/// Task name sent with every request
pub const TASK_TRANSLATE_ITEMS: &str = "translate_items";

/// Rules block of a translation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadRules {
    pub keep_placeholders: bool,
    pub no_html: bool,
    pub allow_empty_parts: bool,
    pub use_neighbor_context: bool,
    pub consistent_style: bool,
}

/// One item as the model sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadItem {
    pub id: String,
    pub text: String,
    pub hint: String,
    pub context_prev: String,
    pub context_next: String,
    pub section: String,
}

impl From<&TranslationItem> for PayloadItem {
    fn from(item: &TranslationItem) -> Self {
        Self {
            id: item.id.clone(),
            text: item.text.clone(),
            hint: item.hint.clone().unwrap_or_default(),
            context_prev: item.context_prev.clone(),
            context_next: item.context_next.clone(),
            section: item.block_id.clone().unwrap_or_default(),
        }
    }
}

/// The user message of a translation request, serialized as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub task: String,
    pub target_language: String,
    pub rules: PayloadRules,
    pub items: Vec<PayloadItem>,
    pub glossary: BTreeMap<String, String>,
}

/// Token usage reported by the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Normalized response of one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientResponse {
    /// Output text, expected to be the translations JSON
    pub raw_text: String,
    /// Response status as reported, e.g. `completed` or `incomplete`
    pub status: Option<String>,
    /// Why the response is incomplete, if it is
    pub incomplete_details: Option<String>,
    /// Token usage, if reported
    pub usage: Option<TokenUsage>,
}

impl ClientResponse {
    /// Completed response carrying `raw_text`
    pub fn completed(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            status: Some("completed".to_string()),
            ..Default::default()
        }
    }

    /// Whether the model stopped before finishing its output
    pub fn is_incomplete(&self) -> bool {
        self.status.as_deref() == Some("incomplete") || self.incomplete_details.is_some()
    }
}

/// JSON schema the model output must match
pub fn translations_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "translations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "id": {"type": "string"},
                        "text": {"type": "string"}
                    },
                    "required": ["id", "text"]
                }
            }
        },
        "required": ["translations"]
    })
}

/// A model client able to translate one batch payload
///
/// Implementations only transport and normalize; validation of the answer
/// belongs to the caller.
#[async_trait]
pub trait TranslationClient: Send + Sync + Debug {
    /// Send one payload and return the normalized response
    async fn translate_payload(&self, payload: &TranslationPayload) -> Result<ClientResponse, ProviderError>;
}

pub mod mock;
pub mod openai;

pub use mock::MockClient;
pub use openai::OpenAIClient;
