/*!
 * Neighbor context for short or fragmentary units.
 *
 * Inline markup splits sentences across several parts. A fragment on its own
 * is easy to mistranslate, so units that look incomplete get the text of
 * their neighbors in the same section attached as read-only context.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::extract::segment::collapse_whitespace;
use crate::models::TranslationItem;

/// Units up to this many characters always get context
const SHORT_UNIT_CHARS: usize = 80;

/// Units up to this many words always get context
const SHORT_UNIT_WORDS: usize = 12;

/// Maximum characters of neighbor text attached
pub const CONTEXT_MAX_CHARS: usize = 220;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…。！？]["'»”’)\]]?$"#).expect("Invalid sentence end regex")
});

/// Counters reported by `attach_context`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextStats {
    /// Units that received at least one non-empty neighbor
    pub items_with_context: usize,
    /// Characters of attached neighbor text
    pub context_chars_total: usize,
}

/// Whether a unit's text warrants neighbor context
pub fn needs_context(text: &str) -> bool {
    let normalized = collapse_whitespace(text);
    if normalized.chars().count() <= SHORT_UNIT_CHARS
        || normalized.split(' ').count() <= SHORT_UNIT_WORDS
    {
        return true;
    }
    if SENTENCE_END.is_match(&normalized) {
        return false;
    }
    normalized.chars().next().is_some_and(char::is_lowercase)
}

fn context_snippet(text: &str) -> String {
    let normalized = collapse_whitespace(text);
    if normalized.chars().count() <= CONTEXT_MAX_CHARS {
        return normalized;
    }
    let mut truncated: String = normalized.chars().take(CONTEXT_MAX_CHARS).collect();
    truncated.push('…');
    truncated
}

/// Fill `context_prev`/`context_next` for units that need them
///
/// Neighbors are the adjacent units of the same section, in input order.
/// Units without a section are left untouched.
pub fn attach_context(items: &mut [TranslationItem]) -> ContextStats {
    let mut sections: Vec<Vec<usize>> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();

    for (idx, item) in items.iter().enumerate() {
        let Some(section) = item.block_id.as_deref() else {
            continue;
        };
        let slot = *section_index.entry(section.to_string()).or_insert_with(|| {
            sections.push(Vec::new());
            sections.len() - 1
        });
        sections[slot].push(idx);
    }

    let mut stats = ContextStats::default();
    for members in &sections {
        let snippets: Vec<String> = members.iter().map(|&i| context_snippet(&items[i].text)).collect();

        for (pos, &idx) in members.iter().enumerate() {
            if !needs_context(&items[idx].text) {
                continue;
            }
            let prev = if pos > 0 { snippets[pos - 1].clone() } else { String::new() };
            let next = snippets.get(pos + 1).cloned().unwrap_or_default();

            if !prev.is_empty() || !next.is_empty() {
                stats.items_with_context += 1;
            }
            stats.context_chars_total += prev.chars().count() + next.chars().count();

            let item = &mut items[idx];
            item.context_prev = prev;
            item.context_next = next;
        }
    }

    stats
}
