use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::{AltMode, ExtractionConfig, TranslationUnitMode};
use crate::models::{AttributeItem, Block, NodeRef, Part};
use crate::snapshot::{Container, ContainerKind, PageSnapshot, TextSlot};

use super::code_blocks::{self, CodeMode};
use super::segment::{is_translatable, split_whitespace};

/// Attributes translated whenever they carry text
const TEXT_ATTRIBUTES: &[&str] = &["title", "aria-label", "placeholder"];

/// Longest `alt` text translated in auto mode
const ALT_AUTO_MAX_CHARS: usize = 180;

static TECHNICAL_ALT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(https?://|www\.|/|\\|\b[a-f0-9]{8,}\b|\.png\b|\.jpg\b|\.svg\b|\.webp\b)")
        .expect("Invalid technical alt regex")
});

/// Sequential id source for one extraction run
#[derive(Debug, Default)]
struct IdAllocator {
    parts: usize,
    blocks: usize,
}

impl IdAllocator {
    fn next_part(&mut self) -> String {
        self.parts += 1;
        format!("t_{:06}", self.parts)
    }

    fn next_block(&mut self) -> String {
        self.blocks += 1;
        format!("b_{:06}", self.blocks)
    }
}

/// A part before it is assigned to a block
struct PendingPart {
    raw: String,
    node_ref: NodeRef,
}

/// Extract translatable text from a page snapshot
///
/// In `Block` mode each container becomes one block; in `TextNode` mode every
/// text slot becomes its own block. Containers without translatable content
/// produce no block.
pub fn extract_blocks(snapshot: &PageSnapshot, mode: TranslationUnitMode) -> Vec<Block> {
    let mut ids = IdAllocator::default();
    let mut blocks = Vec::new();

    for container in &snapshot.containers {
        let groups = container_parts(container);
        match mode {
            TranslationUnitMode::Block => {
                let pending: Vec<PendingPart> = groups.into_iter().flatten().collect();
                if let Some(block) = build_block(&mut ids, pending) {
                    blocks.push(block);
                }
            }
            TranslationUnitMode::TextNode => {
                for pending in groups {
                    if let Some(block) = build_block(&mut ids, pending) {
                        blocks.push(block);
                    }
                }
            }
        }
    }

    debug!(
        "Extracted {} blocks with {} parts",
        blocks.len(),
        blocks.iter().map(|b| b.parts.len()).sum::<usize>()
    );
    blocks
}

/// Pending parts of a container, grouped per slot
fn container_parts(container: &Container) -> Vec<Vec<PendingPart>> {
    let code_mode = match container.kind {
        ContainerKind::Prose => CodeMode::Prose,
        ContainerKind::Code => {
            let classes: Vec<&str> = container.class_names.iter().map(String::as_str).collect();
            let hint = code_blocks::detect_language_hint(container.data_language.as_deref(), &classes);
            let text: String = container.slots.iter().map(|slot| slot.raw.as_str()).collect();
            code_blocks::classify(hint.as_deref(), &text)
        }
    };

    container
        .slots
        .iter()
        .map(|slot| match code_mode {
            CodeMode::Prose => prose_slot_parts(slot),
            CodeMode::Code => comment_slot_parts(slot),
        })
        .collect()
}

fn prose_slot_parts(slot: &TextSlot) -> Vec<PendingPart> {
    if slot.raw.trim().is_empty() {
        return Vec::new();
    }
    vec![PendingPart {
        raw: slot.raw.clone(),
        node_ref: NodeRef::field(slot.tree_path.clone(), slot.field),
    }]
}

fn comment_slot_parts(slot: &TextSlot) -> Vec<PendingPart> {
    code_blocks::comment_spans(&slot.raw)
        .into_iter()
        .map(|(start, end)| {
            let start_char = slot.raw[..start].chars().count();
            let end_char = start_char + slot.raw[start..end].chars().count();
            PendingPart {
                raw: slot.raw[start..end].to_string(),
                node_ref: NodeRef::field(slot.tree_path.clone(), slot.field)
                    .with_range(start_char, end_char),
            }
        })
        .collect()
}

fn build_block(ids: &mut IdAllocator, pending: Vec<PendingPart>) -> Option<Block> {
    let pending: Vec<PendingPart> = pending
        .into_iter()
        .filter(|p| is_translatable(split_whitespace(&p.raw).1))
        .collect();
    if pending.is_empty() {
        return None;
    }

    let block_id = ids.next_block();
    let parts: Vec<Part> = pending
        .into_iter()
        .map(|p| {
            let (lead, core, trail) = split_whitespace(&p.raw);
            Part {
                id: ids.next_part(),
                lead_ws: lead.to_string(),
                core: core.to_string(),
                trail_ws: trail.to_string(),
                raw: p.raw.clone(),
                node_ref: p.node_ref,
                block_id: block_id.clone(),
                translated_core: None,
                protected_core: None,
                token_map: Default::default(),
            }
        })
        .collect();

    let context = parts
        .iter()
        .map(|part| part.core.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Some(Block {
        block_id,
        context,
        parts,
    })
}

/// Whether an `alt` text should be translated under `mode`
pub fn should_translate_alt(value: &str, mode: AltMode) -> bool {
    match mode {
        AltMode::Off => false,
        AltMode::On => true,
        AltMode::Auto => {
            let value = value.trim();
            !value.is_empty()
                && value.chars().count() <= ALT_AUTO_MAX_CHARS
                && !TECHNICAL_ALT.is_match(value)
        }
    }
}

/// Extract translatable attribute values
pub fn extract_attribute_items(snapshot: &PageSnapshot, config: &ExtractionConfig) -> Vec<AttributeItem> {
    if !config.translate_attrs {
        return Vec::new();
    }

    let mut items = Vec::new();
    for attr in &snapshot.attributes {
        let name = attr.attr_name.as_str();
        let wanted = if TEXT_ATTRIBUTES.contains(&name) {
            is_translatable(attr.value.trim())
        } else if name == "alt" {
            should_translate_alt(&attr.value, config.translate_alt) && is_translatable(attr.value.trim())
        } else {
            false
        };
        if !wanted {
            continue;
        }

        items.push(AttributeItem {
            id: format!("a_{:06}", items.len() + 1),
            text: attr.value.trim().to_string(),
            hint: format!("attr:{}", name),
            node_ref: NodeRef::attribute(attr.tree_path.clone(), name),
            translated_text: None,
            protected_text: None,
            token_map: Default::default(),
        });
    }

    debug!("Extracted {} attribute items", items.len());
    items
}
