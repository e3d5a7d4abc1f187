/*!
 * Glossary of terms the model must keep verbatim.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Version of the glossary rules; part of the cache key
pub const GLOSSARY_VERSION: &str = "1.0";

/// Terms always kept as-is
pub const STATIC_TERMS: &[&str] = &["OpenAI", "Codex", "ChatGPT", "GitHub"];

/// Default upper bound on glossary size, static terms included
pub const DEFAULT_MAX_TERMS: usize = 60;

const MIN_TERM_CHARS: usize = 3;
const MAX_TERM_CHARS: usize = 40;
const MIN_TERM_COUNT: usize = 2;

static TERM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\b").expect("Invalid glossary term regex")
});

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "that", "this", "from", "into", "your", "you", "are", "was",
        "were", "will", "can", "not", "but", "all", "any", "our", "out", "use", "using", "used",
        "has", "have", "had", "how", "what", "when", "where", "which", "who", "why", "its", "also",
        "more", "most", "new", "one", "two", "get", "set", "see", "may", "should", "would", "could",
        "about", "after", "before", "over", "under", "than", "then", "them", "they", "their",
        "there", "these", "those", "here", "each", "other", "such", "only", "just", "very",
    ]
    .into_iter()
    .collect()
});

fn is_candidate(token: &str) -> bool {
    let len = token.chars().count();
    if !(MIN_TERM_CHARS..=MAX_TERM_CHARS).contains(&len) {
        return false;
    }
    if STOPWORDS.contains(token.to_lowercase().as_str()) {
        return false;
    }
    token
        .chars()
        .any(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '-')
}

/// Build a self-mapped glossary from source texts
///
/// Static terms come first; repeated distinctive tokens (capitalized, with
/// digits or hyphens) fill the remaining slots, most frequent first, ties
/// broken lexicographically.
pub fn build_glossary<'a, I>(texts: I, max_terms: usize) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut glossary: BTreeMap<String, String> = STATIC_TERMS
        .iter()
        .take(max_terms)
        .map(|term| (term.to_string(), term.to_string()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for text in texts {
        for token in TERM_REGEX.find_iter(text).map(|m| m.as_str()) {
            if is_candidate(token) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|&(_, count)| count >= MIN_TERM_COUNT)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    for (term, _) in ranked {
        if glossary.len() >= max_terms {
            break;
        }
        glossary.entry(term.to_string()).or_insert_with(|| term.to_string());
    }

    glossary
}
