/*!
 * Token protection for translation input.
 *
 * Substrings that must survive translation verbatim (URLs, e-mail addresses,
 * UUIDs, hashes, CLI flags, versions, paths, code identifiers) are replaced
 * with opaque sequential placeholders before the text goes to the model, and
 * put back afterwards.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Version of the masking rules; part of the cache key
pub const TOKEN_PROTECTOR_VERSION: &str = "1.2";

/// Fixed prefix of every placeholder
pub const PLACEHOLDER_PREFIX: &str = "WEBLINGO_TP_";

/// Extra boundary checks the regex engine cannot express
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    /// Next char must not be a word char
    NotFollowedByWord,
    /// Previous char must not be a word char
    NotPrecededByWord,
}

struct ProtectRule {
    pattern: Regex,
    boundary: Boundary,
}

impl ProtectRule {
    fn new(pattern: &str, boundary: Boundary) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid token protection regex"),
            boundary,
        }
    }

    fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        match self.boundary {
            Boundary::None => true,
            Boundary::NotFollowedByWord => !text[end..].chars().next().is_some_and(is_word_char),
            Boundary::NotPrecededByWord => !text[..start].chars().next_back().is_some_and(is_word_char),
        }
    }

    /// Leftmost acceptable match at or after `from`
    fn find_from(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let mut pos = from;
        while pos <= text.len() {
            let found = self.pattern.find_at(text, pos)?;
            if self.accepts(text, found.start(), found.end()) {
                return Some((found.start(), found.end()));
            }
            pos = next_char_boundary(text, found.start());
        }
        None
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len() + 1, |ch| pos + ch.len_utf8())
}

/// Protection rules in priority order; on equal start the earlier rule wins
static PROTECT_RULES: Lazy<Vec<ProtectRule>> = Lazy::new(|| {
    vec![
        // Placeholder-shaped text already present in the source
        ProtectRule::new(&format!(r"{}\d{{6}}", PLACEHOLDER_PREFIX), Boundary::None),
        // Absolute URLs
        ProtectRule::new(r#"https?://[^\s)>'"`]+"#, Boundary::None),
        // Bare www hosts
        ProtectRule::new(r#"\bwww\.[^\s)>'"`]+\b"#, Boundary::None),
        // E-mail addresses
        ProtectRule::new(r"\b[\w.+-]+@[\w.-]+\.[a-zA-Z]{2,}\b", Boundary::None),
        // UUIDs
        ProtectRule::new(
            r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
            Boundary::None,
        ),
        // Hashes and commit ids
        ProtectRule::new(r"\b(?:sha|md5|commit)?[=:]?[0-9a-fA-F]{7,64}\b", Boundary::None),
        // CLI flags, including the whitespace that introduces them
        ProtectRule::new(
            r"(?:^|\s)(?:--[a-zA-Z0-9][\w-]*|-[a-zA-Z])",
            Boundary::NotFollowedByWord,
        ),
        // Semantic versions
        ProtectRule::new(r"\b\d+\.\d+\.\d+(?:[-+][\w.-]+)?\b", Boundary::None),
        // Paths
        ProtectRule::new(r"(?:/[^\s]+|\./[^\s]+)", Boundary::NotPrecededByWord),
        // snake_case identifiers
        ProtectRule::new(r"\b[A-Za-z_][A-Za-z0-9_]*_[A-Za-z0-9_]+\b", Boundary::None),
        // camelCase identifiers
        ProtectRule::new(r"\b[a-z]+(?:[A-Z][a-z0-9]+)+[A-Za-z0-9]*\b", Boundary::None),
    ]
});

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{}\d{{6}}", PLACEHOLDER_PREFIX)).expect("Invalid placeholder regex")
});

/// Text with protected tokens replaced by placeholders
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedText {
    /// Masked text
    pub text: String,
    /// Placeholder to original token
    pub mapping: HashMap<String, String>,
}

/// Mask all protected tokens in `value`
pub fn protect_text(value: &str) -> ProtectedText {
    let mut text = String::with_capacity(value.len());
    let mut mapping = HashMap::new();
    let mut counter = 1usize;
    let mut cursor = 0usize;

    // Next acceptable match per rule; `None` once a rule has no match left.
    // A rule is searched again only after the cursor has passed its match.
    let mut upcoming: Vec<Option<(usize, usize)>> =
        PROTECT_RULES.iter().map(|rule| next_nonempty(rule, value, 0)).collect();

    while cursor < value.len() {
        for (rule, slot) in PROTECT_RULES.iter().zip(upcoming.iter_mut()) {
            if slot.is_some_and(|(start, _)| start < cursor) {
                *slot = next_nonempty(rule, value, cursor);
            }
        }

        let next = upcoming.iter().flatten().copied().min_by_key(|&(start, _)| start);
        let Some((start, end)) = next else {
            break;
        };

        let placeholder = format!("{}{:06}", PLACEHOLDER_PREFIX, counter);
        counter += 1;
        text.push_str(&value[cursor..start]);
        text.push_str(&placeholder);
        mapping.insert(placeholder, value[start..end].to_string());
        cursor = end;
    }

    text.push_str(&value[cursor..]);
    ProtectedText { text, mapping }
}

fn next_nonempty(rule: &ProtectRule, text: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    loop {
        let (start, end) = rule.find_from(text, pos)?;
        if end > start {
            return Some((start, end));
        }
        pos = next_char_boundary(text, start);
    }
}

/// Put the original tokens back in place of their placeholders
pub fn restore_text(value: &str, mapping: &HashMap<String, String>) -> String {
    if mapping.is_empty() {
        return value.to_string();
    }
    PLACEHOLDER_REGEX
        .replace_all(value, |caps: &regex::Captures| {
            let placeholder = &caps[0];
            mapping
                .get(placeholder)
                .cloned()
                .unwrap_or_else(|| placeholder.to_string())
        })
        .into_owned()
}

/// Placeholders in order of appearance
pub fn placeholders_in_text(value: &str) -> Vec<&str> {
    PLACEHOLDER_REGEX.find_iter(value).map(|m| m.as_str()).collect()
}

/// Check that the translation kept the source placeholders
///
/// Strict mode requires the same sequence; lax mode the same multiset.
pub fn validate_placeholder_integrity(
    source_protected_text: &str,
    translated_text: &str,
    strict: bool,
) -> Result<(), &'static str> {
    let mut expected = placeholders_in_text(source_protected_text);
    let mut got = placeholders_in_text(translated_text);

    if strict {
        if expected != got {
            return Err("placeholder_sequence_mismatch");
        }
        return Ok(());
    }

    expected.sort_unstable();
    got.sort_unstable();
    if expected != got {
        return Err("placeholder_set_mismatch");
    }
    Ok(())
}
