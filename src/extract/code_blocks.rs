/*!
 * Code block handling for extraction.
 *
 * A `pre`/`code` container is either prose that happens to be preformatted
 * (markdown snippets, plain text) or real code. Prose is translated like any
 * other block; for code only the comment bodies are extracted, as character
 * ranges, so the surrounding code is never touched.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::segment::is_translatable;

/// Language hints that denote prose rather than code
const PROSE_LANGUAGES: &[&str] = &["markdown", "md", "text", "plain", "plaintext", "txt"];

/// Minimum number of function words for a line to count as prose
const PROSE_FUNCTION_WORDS_MIN: usize = 2;

static CODE_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("Invalid braces regex"));

static CODE_SEMICOLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";\s*$").expect("Invalid semicolon regex"));

static CODE_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"=>|->").expect("Invalid arrow regex"));

static CODE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:def|class|import|from|return|elif|fn|let|const|var|function|func|public|private|protected|static|package|struct|enum|impl|except|async|await|SELECT|INSERT|UPDATE|DELETE|CREATE)\b",
    )
    .expect("Invalid keyword regex")
});

static CODE_SHELL_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\$|>>>|PS>)\s").expect("Invalid shell prompt regex"));

static CODE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[A-Za-z_][\w.\[\]]*\s*[-+*/%]?=\s*[^=\s]").expect("Invalid assignment regex")
});

static CODE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][\w.]*\([^()]*\)").expect("Invalid call regex"));

static PROSE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[A-Za-z][.!?]["')\]]?(?:\s|$)"#).expect("Invalid sentence end regex")
});

static PROSE_FUNCTION_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:the|a|an|and|or|of|to|in|is|are|was|were|with|for|that|this|it|you|your|we|be|by|on|when|use|not|can)\b",
    )
    .expect("Invalid function word regex")
});

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*(.*?)\*/").expect("Invalid block comment regex"));

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("Invalid html comment regex"));

/// How a code container is extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMode {
    /// Translate the whole content
    Prose,
    /// Translate comment bodies only
    Code,
}

/// Find an explicit language for a code container
///
/// `data_language` wins; otherwise the first `language-X` or `lang-X`
/// class token is used.
pub fn detect_language_hint(data_language: Option<&str>, class_names: &[&str]) -> Option<String> {
    if let Some(lang) = data_language {
        let lang = lang.trim();
        if !lang.is_empty() {
            return Some(lang.to_lowercase());
        }
    }

    class_names
        .iter()
        .flat_map(|classes| classes.split_whitespace())
        .find_map(|token| {
            let token = token.to_lowercase();
            token
                .strip_prefix("language-")
                .or_else(|| token.strip_prefix("lang-"))
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
        })
}

/// Decide how to extract a code container
pub fn classify(language_hint: Option<&str>, text: &str) -> CodeMode {
    match language_hint {
        Some(hint) if PROSE_LANGUAGES.contains(&hint) => CodeMode::Prose,
        Some(_) => CodeMode::Code,
        None => classify_by_content(text),
    }
}

fn is_code_line(line: &str) -> bool {
    CODE_BRACES.is_match(line)
        || CODE_SEMICOLON.is_match(line)
        || CODE_ARROW.is_match(line)
        || CODE_KEYWORD.is_match(line)
        || CODE_SHELL_PROMPT.is_match(line)
        || CODE_ASSIGNMENT.is_match(line)
        || CODE_CALL.is_match(line)
}

fn is_prose_line(line: &str) -> bool {
    PROSE_SENTENCE_END.is_match(line)
        || PROSE_FUNCTION_WORD.find_iter(line).count() >= PROSE_FUNCTION_WORDS_MIN
}

/// Heuristic prose/code decision for containers without a language hint
pub fn classify_by_content(text: &str) -> CodeMode {
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    if lines.is_empty() {
        return CodeMode::Prose;
    }

    let code_lines = lines.iter().filter(|line| is_code_line(line)).count();
    let prose_lines = lines.iter().filter(|line| is_prose_line(line)).count();

    if code_lines == 0 {
        return CodeMode::Prose;
    }
    if code_lines * 2 >= lines.len() && code_lines > prose_lines {
        CodeMode::Code
    } else {
        CodeMode::Prose
    }
}

/// Byte ranges of translatable comment bodies in `text`
///
/// Ranges are sorted, non-overlapping and never include comment markers.
pub fn comment_spans(text: &str) -> Vec<(usize, usize)> {
    let mut delimited: Vec<(usize, usize)> = Vec::new();
    let mut bodies: Vec<(usize, usize)> = Vec::new();

    for pattern in [&*BLOCK_COMMENT, &*HTML_COMMENT] {
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            delimited.push((whole.start(), whole.end()));
            bodies.push((body.start(), body.end()));
        }
    }

    let inside_delimited =
        |pos: usize| delimited.iter().any(|&(start, end)| pos >= start && pos < end);

    let mut line_start = 0;
    for chunk in text.split_inclusive('\n') {
        let line = chunk.trim_end_matches(['\n', '\r']);
        if let Some((marker_pos, marker_len)) = line_comment_marker(line) {
            let absolute = line_start + marker_pos;
            if !inside_delimited(absolute) {
                bodies.push((absolute + marker_len, line_start + line.len()));
            }
        }
        line_start += chunk.len();
    }

    merge_spans(bodies)
        .into_iter()
        .filter(|&(start, end)| is_translatable(text[start..end].trim()))
        .collect()
}

/// Position and length of the comment marker on one line, if any
///
/// Mid-line ` #` and ` --` need whitespace (or the line end) after them, so
/// `#fff` and `--all` stay code.
fn line_comment_marker(line: &str) -> Option<(usize, usize)> {
    let indent = line.len() - line.trim_start().len();
    let rest = &line[indent..];
    if rest.starts_with("//") || rest.starts_with("--") {
        return Some((indent, 2));
    }
    if rest.starts_with('#') {
        return Some((indent, 1));
    }

    let followed_by_space = |pos: usize| {
        line[pos..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
    };

    let mut best: Option<(usize, usize)> = None;
    let mut consider = |candidate: (usize, usize)| {
        if best.is_none_or(|current| candidate.0 < current.0) {
            best = Some(candidate);
        }
    };

    for (pos, _) in line.match_indices("//") {
        if pos > 0 && !line[..pos].ends_with(':') {
            consider((pos, 2));
            break;
        }
    }
    for (pos, _) in line.match_indices(" #") {
        if followed_by_space(pos + 2) {
            consider((pos + 1, 1));
            break;
        }
    }
    for (pos, _) in line.match_indices(" --") {
        if followed_by_space(pos + 3) {
            consider((pos + 1, 2));
            break;
        }
    }

    best
}

/// Merge overlapping or touching ranges
fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
