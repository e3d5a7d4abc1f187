/*!
 * OpenAI Responses API client.
 *
 * Sends one translation payload per request with a strict JSON schema as
 * the output format and normalizes the response shape.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::translation::token_protector::PLACEHOLDER_PREFIX;

use super::{ClientResponse, TokenUsage, TranslationClient, TranslationPayload, translations_schema};

/// Name of the structured output format
const SCHEMA_NAME: &str = "weblingo_translations";

/// OpenAI client
#[derive(Debug)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_output_tokens: u32,
    reasoning_effort: String,
    target_language_name: String,
}

impl OpenAIClient {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        max_output_tokens: u32,
        reasoning_effort: impl Into<String>,
        target_language_name: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            max_output_tokens,
            reasoning_effort: reasoning_effort.into(),
            target_language_name: target_language_name.into(),
        })
    }

    fn system_prompt(&self) -> String {
        format!(
            "You translate English web page text to {}. \
             Return JSON strictly matching the schema. \
             Do not output HTML or Markdown. \
             Keep IDs exactly as provided and in the same order. \
             Do not change {}* placeholders. \
             Use context_prev and context_next only to understand the text; never translate them. \
             Keep glossary terms unchanged.",
            self.target_language_name, PLACEHOLDER_PREFIX
        )
    }

    /// Request body for a payload
    pub fn build_request(&self, payload: &TranslationPayload) -> Result<Value, ProviderError> {
        let user_text = serde_json::to_string(payload)
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to serialize payload: {}", e)))?;

        let mut request = json!({
            "model": self.model,
            "max_output_tokens": self.max_output_tokens,
            "input": [
                {
                    "role": "system",
                    "content": [{"type": "input_text", "text": self.system_prompt()}]
                },
                {
                    "role": "user",
                    "content": [{"type": "input_text", "text": user_text}]
                }
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": translations_schema()
                }
            }
        });

        if self.reasoning_effort != "none" {
            request["reasoning"] = json!({ "effort": self.reasoning_effort });
        }

        Ok(request)
    }

    fn map_transport_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_connect() {
            ProviderError::ConnectionError(err.to_string())
        } else {
            ProviderError::RequestFailed(err.to_string())
        }
    }

    fn map_status_error(status: StatusCode, message: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

/// Pull the output text out of a Responses API body
///
/// Prefers the flat `output_text` field, then the first non-empty text in
/// `output[].content[]`.
pub fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str).filter(|t| !t.is_empty()) {
        return Some(text.to_string());
    }

    body.get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Normalize a Responses API body
pub fn normalize_response(body: &Value) -> Result<ClientResponse, ProviderError> {
    let status = body.get("status").and_then(Value::as_str).map(str::to_string);

    let incomplete_details = body
        .get("incomplete_details")
        .filter(|details| !details.is_null())
        .map(|details| match details.get("reason").and_then(Value::as_str) {
            Some(reason) => reason.to_string(),
            None => details.to_string(),
        });

    let usage = body
        .get("usage")
        .filter(|usage| !usage.is_null())
        .and_then(|usage| serde_json::from_value::<TokenUsage>(usage.clone()).ok());

    let raw_text = match extract_output_text(body) {
        Some(text) => text,
        // A truncated answer may carry no text at all
        None if status.as_deref() == Some("incomplete") || incomplete_details.is_some() => String::new(),
        None => {
            return Err(ProviderError::ParseError(
                "Response does not contain output text".to_string(),
            ));
        }
    };

    Ok(ClientResponse {
        raw_text,
        status,
        incomplete_details,
        usage,
    })
}

#[async_trait]
impl TranslationClient for OpenAIClient {
    async fn translate_payload(&self, payload: &TranslationPayload) -> Result<ClientResponse, ProviderError> {
        let url = format!("{}/responses", self.endpoint.trim_end_matches('/'));
        let request = self.build_request(payload)?;

        debug!("Sending {} items to {} ({})", payload.items.len(), url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(Self::map_status_error(status, error_text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))?;

        normalize_response(&body)
    }
}
