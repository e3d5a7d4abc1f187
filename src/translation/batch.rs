/*!
 * Batch construction.
 *
 * Items are packed greedily in input order. A batch is closed when the next
 * item would push it over the character or item limit, or, when section
 * boundaries are preferred, when the next item starts a new section and the
 * current batch is already reasonably full.
 */

use crate::models::{TranslateBatch, TranslationItem};

/// Lower bound of the "reasonably full" character threshold
const SECTION_FLUSH_MIN_CHARS: usize = 400;

/// Lower bound of the "reasonably full" item threshold
const SECTION_FLUSH_MIN_ITEMS: usize = 6;

/// Pack `items` into batches
///
/// A single item larger than `max_chars` still gets a batch of its own.
pub fn build_batches(
    items: &[TranslationItem],
    max_chars: usize,
    max_items: usize,
    prefer_section_boundary: bool,
) -> Vec<TranslateBatch> {
    let section_chars = SECTION_FLUSH_MIN_CHARS.max(max_chars / 3);
    let section_items = SECTION_FLUSH_MIN_ITEMS.max(max_items / 3);

    let mut batches = Vec::new();
    let mut current: Vec<TranslationItem> = Vec::new();
    let mut current_chars = 0usize;

    for item in items {
        let item_chars = item.char_len();

        if !current.is_empty() {
            let over_items = current.len() + 1 > max_items;
            let over_chars = current_chars + item_chars > max_chars;
            let section_break = prefer_section_boundary
                && section_changes(current.last(), item)
                && (current_chars >= section_chars || current.len() >= section_items);

            if over_items || over_chars || section_break {
                batches.push(TranslateBatch {
                    items: std::mem::take(&mut current),
                    chars: current_chars,
                });
                current_chars = 0;
            }
        }

        current.push(item.clone());
        current_chars += item_chars;
    }

    if !current.is_empty() {
        batches.push(TranslateBatch {
            items: current,
            chars: current_chars,
        });
    }

    batches
}

/// Whether `next` starts a different non-empty section than `last`
fn section_changes(last: Option<&TranslationItem>, next: &TranslationItem) -> bool {
    match (last.and_then(|l| l.block_id.as_deref()), next.block_id.as_deref()) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}
