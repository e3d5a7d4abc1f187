/*!
 * Mock client for testing.
 *
 * - `MockClient::working()`: translates every item by tagging it with the
 *   target language
 * - `MockClient::echo()`: returns every item unchanged
 * - `MockClient::failing()`: always fails with a transport error
 * - `MockClient::incomplete()`: always reports an incomplete response
 * - `MockClient::fail_above(n)`: answers with a broken payload for batches
 *   larger than `n` items
 * - `MockClient::fail_first(n)`: fails the first `n` requests, then works
 *
 * Every payload received is recorded for inspection.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;

use super::{ClientResponse, TokenUsage, TranslationClient, TranslationPayload};

/// Behavior mode for the mock client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Tag every text with `[<target_language>] `
    Working,
    /// Return texts unchanged
    Echo,
    /// Always fail with an error
    Failing,
    /// Always report `incomplete`
    Incomplete,
    /// Return a payload missing its last id when the batch is too large
    FailAbove { max_items: usize },
    /// Fail the first `failures` requests, then behave like `Working`
    FailFirst { failures: usize },
}

/// Mock client for translation tests
#[derive(Debug, Clone)]
pub struct MockClient {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<TranslationPayload>>>,
    custom_response: Option<fn(&TranslationPayload) -> String>,
}

impl MockClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            payloads: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn incomplete() -> Self {
        Self::new(MockBehavior::Incomplete)
    }

    pub fn fail_above(max_items: usize) -> Self {
        Self::new(MockBehavior::FailAbove { max_items })
    }

    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Replace the generated output text; used with `Working`
    pub fn with_custom_response(mut self, generator: fn(&TranslationPayload) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of the payloads received so far
    pub fn payloads(&self) -> Vec<TranslationPayload> {
        self.payloads.lock().clone()
    }

    /// Output text answering every item with `translate(text)`
    pub fn translations_json(payload: &TranslationPayload, translate: impl Fn(&str) -> String) -> String {
        let translations: Vec<_> = payload
            .items
            .iter()
            .map(|item| json!({"id": item.id, "text": translate(&item.text)}))
            .collect();
        json!({ "translations": translations }).to_string()
    }

    fn usage_for(payload: &TranslationPayload) -> TokenUsage {
        let chars: usize = payload.items.iter().map(|item| item.text.chars().count()).sum();
        TokenUsage {
            input_tokens: chars as u64,
            output_tokens: (chars / 2) as u64,
        }
    }

    fn working_response(&self, payload: &TranslationPayload) -> ClientResponse {
        let raw_text = match self.custom_response {
            Some(generator) => generator(payload),
            None => {
                let tag = format!("[{}] ", payload.target_language);
                Self::translations_json(payload, |text| format!("{}{}", tag, text))
            }
        };
        ClientResponse {
            usage: Some(Self::usage_for(payload)),
            ..ClientResponse::completed(raw_text)
        }
    }
}

#[async_trait]
impl TranslationClient for MockClient {
    async fn translate_payload(&self, payload: &TranslationPayload) -> Result<ClientResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().push(payload.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.working_response(payload)),

            MockBehavior::Echo => Ok(ClientResponse::completed(Self::translations_json(payload, str::to_string))),

            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),

            MockBehavior::Incomplete => Ok(ClientResponse {
                raw_text: String::new(),
                status: Some("incomplete".to_string()),
                incomplete_details: Some("max_output_tokens".to_string()),
                usage: None,
            }),

            MockBehavior::FailAbove { max_items } => {
                if payload.items.len() > max_items {
                    let mut truncated = payload.clone();
                    truncated.items.pop();
                    Ok(ClientResponse::completed(Self::translations_json(&truncated, str::to_string)))
                } else {
                    Ok(self.working_response(payload))
                }
            }

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::Timeout("Simulated timeout".to_string()))
                } else {
                    Ok(self.working_response(payload))
                }
            }
        }
    }
}
