/*!
 * Write translated text back into the document.
 *
 * The document is reached through `FieldTarget`, so the same logic works for
 * a `PageSnapshot` or any other tree that can read and write a field by its
 * `NodeRef`.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::extract::split_whitespace;
use crate::models::{AttributeItem, Block, NodeField, NodeRef, Part};

/// Read/write access to document fields
pub trait FieldTarget {
    /// Current value of the field, `None` if the node does not exist
    fn field_value(&mut self, node_ref: &NodeRef) -> Option<String>;

    /// Replace the value of the field; false if the node does not exist
    fn set_field_value(&mut self, node_ref: &NodeRef, value: String) -> bool;
}

static XML_ILLEGAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x{FFFE}\x{FFFF}]").expect("Invalid XML sanitize regex")
});

/// Remove characters that are not allowed in XML 1.0
pub fn sanitize_xml_text(value: &str) -> String {
    XML_ILLEGAL.replace_all(value, "").into_owned()
}

/// Byte index of the `char_index`-th character, or `None` past the end
fn byte_index(value: &str, char_index: usize) -> Option<usize> {
    if char_index == 0 {
        return Some(0);
    }
    value
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(value.len()))
        .nth(char_index)
}

/// Replace the character range `[start, end)` of `value`
fn splice_chars(value: &str, start: usize, end: usize, replacement: &str) -> Option<String> {
    if start >= end {
        return None;
    }
    let start_byte = byte_index(value, start)?;
    let end_byte = byte_index(value, end)?;
    let mut out = String::with_capacity(value.len() + replacement.len());
    out.push_str(&value[..start_byte]);
    out.push_str(replacement);
    out.push_str(&value[end_byte..]);
    Some(out)
}

/// Apply translated parts to the document
///
/// Whole-field parts overwrite the field. Ranged parts are grouped per field
/// and spliced from the highest start offset down, so earlier offsets stay
/// valid. Returns the number of parts applied.
pub fn apply_blocks<T: FieldTarget + ?Sized>(target: &mut T, blocks: &[Block]) -> usize {
    let mut applied = 0;
    let mut ranged: BTreeMap<(String, NodeField), Vec<&Part>> = BTreeMap::new();

    for part in blocks.iter().flat_map(|block| block.parts.iter()) {
        if part.node_ref.range().is_some() {
            ranged
                .entry((part.node_ref.tree_path.clone(), part.node_ref.field))
                .or_default()
                .push(part);
            continue;
        }

        let value = sanitize_xml_text(&part.output_text());
        if target.set_field_value(&part.node_ref, value) {
            applied += 1;
        } else {
            warn!("Node not found for part {} at {}", part.id, part.node_ref.tree_path);
        }
    }

    for ((tree_path, _), mut parts) in ranged {
        parts.sort_by_key(|part| std::cmp::Reverse(part.node_ref.range().map_or(0, |(start, _)| start)));

        let field_ref = &parts[0].node_ref;
        let Some(mut value) = target.field_value(field_ref) else {
            warn!("Node not found for ranged parts at {}", tree_path);
            continue;
        };

        let mut changed = 0;
        for part in &parts {
            let Some((start, end)) = part.node_ref.range() else {
                continue;
            };
            let replacement = sanitize_xml_text(&part.output_text());
            match splice_chars(&value, start, end, &replacement) {
                Some(updated) => {
                    value = updated;
                    changed += 1;
                }
                None => debug!("Skipping invalid range {}..{} for part {}", start, end, part.id),
            }
        }

        if changed > 0 && target.set_field_value(field_ref, value) {
            applied += changed;
        }
    }

    applied
}

/// Apply translated attribute values; untranslated items are left alone
///
/// Whitespace around the current attribute value is kept.
pub fn apply_attrs<T: FieldTarget + ?Sized>(target: &mut T, attrs: &[AttributeItem]) -> usize {
    let mut applied = 0;
    for item in attrs {
        let Some(text) = item.translated_text.as_deref() else {
            continue;
        };
        let Some(current) = target.field_value(&item.node_ref) else {
            warn!("Node not found for attribute {} at {}", item.id, item.node_ref.tree_path);
            continue;
        };
        let (lead, _, trail) = split_whitespace(&current);
        let value = format!("{}{}{}", lead, sanitize_xml_text(text), trail);
        if target.set_field_value(&item.node_ref, value) {
            applied += 1;
        }
    }
    applied
}
