/*!
 * Tests for the OpenAI client request building and response normalization
 */

use serde_json::json;
use std::collections::BTreeMap;

use weblingo::models::TranslationItem;
use weblingo::providers::openai::{extract_output_text, normalize_response};
use weblingo::providers::{
    MockClient, OpenAIClient, PayloadItem, PayloadRules, TASK_TRANSLATE_ITEMS, TranslationClient, TranslationPayload,
};

fn payload(texts: &[&str]) -> TranslationPayload {
    let items = texts
        .iter()
        .enumerate()
        .map(|(i, text)| PayloadItem::from(&TranslationItem::for_part(format!("t_{:06}", i + 1), *text, "b_000001")))
        .collect();
    TranslationPayload {
        task: TASK_TRANSLATE_ITEMS.to_string(),
        target_language: "ru".to_string(),
        rules: PayloadRules {
            keep_placeholders: true,
            no_html: true,
            allow_empty_parts: true,
            use_neighbor_context: true,
            consistent_style: true,
        },
        items,
        glossary: BTreeMap::from([("OpenAI".to_string(), "OpenAI".to_string())]),
    }
}

fn client(effort: &str) -> OpenAIClient {
    OpenAIClient::new("sk-test", "https://api.openai.com/v1", "gpt-5.1", 4096, effort, "Russian", 30).unwrap()
}

#[test]
fn test_buildRequest_shouldCarryStrictSchemaAndPayload() {
    let request = client("medium").build_request(&payload(&["Hello"])).unwrap();

    assert_eq!(request["model"], "gpt-5.1");
    assert_eq!(request["max_output_tokens"], 4096);
    assert_eq!(request["text"]["format"]["type"], "json_schema");
    assert_eq!(request["text"]["format"]["strict"], true);
    assert_eq!(request["reasoning"]["effort"], "medium");

    let system = request["input"][0]["content"][0]["text"].as_str().unwrap();
    assert!(system.contains("Russian"));
    assert!(system.contains("WEBLINGO_TP_"));

    let user = request["input"][1]["content"][0]["text"].as_str().unwrap();
    let sent: TranslationPayload = serde_json::from_str(user).unwrap();
    assert_eq!(sent.items[0].id, "t_000001");
    assert_eq!(sent.items[0].section, "b_000001");
    assert_eq!(sent.glossary["OpenAI"], "OpenAI");
}

#[test]
fn test_extractOutputText_shouldPreferFlatField() {
    let body = json!({
        "output_text": "{\"translations\":[]}",
        "output": [{"content": [{"text": "other"}]}]
    });
    assert_eq!(extract_output_text(&body).as_deref(), Some("{\"translations\":[]}"));
}

#[test]
fn test_normalizeResponse_withUsage_shouldReportIt() {
    let body = json!({
        "status": "completed",
        "output_text": "{}",
        "usage": {"input_tokens": 120, "output_tokens": 40, "total_tokens": 160}
    });

    let response = normalize_response(&body).unwrap();

    assert!(!response.is_incomplete());
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 120);
    assert_eq!(usage.output_tokens, 40);
}

#[tokio::test]
async fn test_mockClient_working_shouldTagTextsAndRecordPayloads() {
    let mock = MockClient::working();
    let response = mock.translate_payload(&payload(&["Hello", "World"])).await.unwrap();

    let body: serde_json::Value = serde_json::from_str(&response.raw_text).unwrap();
    assert_eq!(body["translations"][1]["text"], "[ru] World");
    assert_eq!(mock.request_count(), 1);
    assert_eq!(mock.payloads().len(), 1);
}
