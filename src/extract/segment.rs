/*!
 * Whitespace segmentation of raw text content.
 */

/// Split `raw` into leading whitespace, core and trailing whitespace
///
/// Total: every input splits, and the three pieces always concatenate back
/// to `raw`.
pub fn split_whitespace(raw: &str) -> (&str, &str, &str) {
    let without_lead = raw.trim_start();
    let lead = &raw[..raw.len() - without_lead.len()];
    let core = without_lead.trim_end();
    let trail = &without_lead[core.len()..];
    (lead, core, trail)
}

/// Whether the value is non-empty and made only of whitespace and punctuation
pub fn is_punctuation_or_ws(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_whitespace() || !ch.is_alphanumeric())
}

/// Whether a core is worth sending to the model
pub fn is_translatable(core: &str) -> bool {
    !core.is_empty() && !is_punctuation_or_ws(core)
}

/// Collapse all whitespace runs to single spaces and trim
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
