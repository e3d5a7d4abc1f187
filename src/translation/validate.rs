/*!
 * Validation of model responses.
 *
 * A response is accepted only if it parses, matches the
 * `{"translations":[{"id","text"}]}` shape exactly, covers the requested ids
 * in the requested order, introduces no markup and keeps the placeholders.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::models::TranslationItem;

use super::token_protector::validate_placeholder_integrity;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

static MD_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```").expect("Invalid fence regex"));

static MD_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*#{1,6}\s").expect("Invalid heading regex"));

/// Why a response was rejected
///
/// The `Display` form is the stable reason string recorded in failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("json_parse_error")]
    JsonParse,

    #[error("schema_error")]
    Schema,

    #[error("id_coverage_error")]
    IdCoverage,

    #[error("id_order_error")]
    IdOrder,

    #[error("html_markdown_detected")]
    MarkupDetected { id: String },

    #[error("token_integrity:{reason}")]
    TokenIntegrity { id: String, reason: &'static str },

    #[error("empty_part_disallowed")]
    EmptyPart { id: String },
}

/// Parse the response and check it against the strict output schema
///
/// Returns the `(id, text)` pairs in response order.
pub fn parse_response_json(raw_text: &str) -> Result<Vec<(String, String)>, ValidationError> {
    let payload: Value = serde_json::from_str(raw_text).map_err(|_| ValidationError::JsonParse)?;

    let root = payload.as_object().ok_or(ValidationError::Schema)?;
    if root.len() != 1 {
        return Err(ValidationError::Schema);
    }
    let entries = root
        .get("translations")
        .and_then(Value::as_array)
        .ok_or(ValidationError::Schema)?;

    entries
        .iter()
        .map(|entry| {
            let obj = entry.as_object().ok_or(ValidationError::Schema)?;
            if obj.len() != 2 {
                return Err(ValidationError::Schema);
            }
            let id = obj.get("id").and_then(Value::as_str).ok_or(ValidationError::Schema)?;
            let text = obj.get("text").and_then(Value::as_str).ok_or(ValidationError::Schema)?;
            Ok((id.to_string(), text.to_string()))
        })
        .collect()
}

fn introduces(pattern: &Regex, source: &str, translated: &str) -> bool {
    pattern.is_match(translated) && !pattern.is_match(source)
}

/// Whether the translation contains markup its source did not
pub fn has_new_markup(source: &str, translated: &str) -> bool {
    introduces(&HTML_TAG, source, translated)
        || introduces(&MD_FENCE, source, translated)
        || introduces(&MD_HEADING, source, translated)
}

/// Validate a raw response against the batch that produced it
///
/// `items` carry the protected source text. Empty output for a non-empty
/// source is accepted only when `allow_empty_parts` is set and the item
/// itself allows it.
pub fn validate_translation_result(
    raw_text: &str,
    items: &[TranslationItem],
    strict_placeholders: bool,
    allow_empty_parts: bool,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let entries = parse_response_json(raw_text)?;

    let expected: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let returned: Vec<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();

    let expected_set: HashSet<&str> = expected.iter().copied().collect();
    let returned_set: HashSet<&str> = returned.iter().copied().collect();
    if expected_set != returned_set {
        return Err(ValidationError::IdCoverage);
    }
    // Duplicates pass the set check and fail here
    if returned != expected {
        return Err(ValidationError::IdOrder);
    }

    for (item, (id, translated)) in items.iter().zip(entries.iter()) {
        let source = item.text.as_str();
        if has_new_markup(source, translated) {
            return Err(ValidationError::MarkupDetected { id: id.clone() });
        }
        if let Err(reason) = validate_placeholder_integrity(source, translated, strict_placeholders) {
            return Err(ValidationError::TokenIntegrity {
                id: id.clone(),
                reason,
            });
        }
        let empty_allowed = allow_empty_parts && item.allow_empty;
        if !empty_allowed && !source.trim().is_empty() && translated.trim().is_empty() {
            return Err(ValidationError::EmptyPart { id: id.clone() });
        }
    }

    Ok(entries.into_iter().collect())
}
