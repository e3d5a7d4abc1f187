/*!
 * Data model shared by extraction, translation and apply.
 *
 * A `Part` is a piece of text content found in the page, an `AttributeItem`
 * is a translatable attribute value. Both carry a `NodeRef` that tells the
 * apply stage where the translated text goes back.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which slot of a node a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeField {
    /// Text directly inside the element, before its first child
    Text,
    /// Text following the element, up to its next sibling
    Tail,
    /// An attribute value
    Attr,
}

impl fmt::Display for NodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Tail => "tail",
            Self::Attr => "attr",
        };
        write!(f, "{}", name)
    }
}

/// Structural reference to a piece of content in the source document
///
/// Offsets, when present, are character offsets into the field value and
/// address a sub-range of it. A reference is only valid against the document
/// it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    /// Path of the element in the document tree
    pub tree_path: String,
    /// Field selector
    pub field: NodeField,
    /// Attribute name when `field` is `Attr`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr_name: Option<String>,
    /// Start of the replaced character range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    /// End (exclusive) of the replaced character range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
}

impl NodeRef {
    /// Reference to a whole text or tail field
    pub fn field(tree_path: impl Into<String>, field: NodeField) -> Self {
        Self {
            tree_path: tree_path.into(),
            field,
            attr_name: None,
            start_offset: None,
            end_offset: None,
        }
    }

    /// Reference to an attribute value
    pub fn attribute(tree_path: impl Into<String>, attr_name: impl Into<String>) -> Self {
        Self {
            tree_path: tree_path.into(),
            field: NodeField::Attr,
            attr_name: Some(attr_name.into()),
            start_offset: None,
            end_offset: None,
        }
    }

    /// Restrict this reference to a character range of the field
    pub fn with_range(mut self, start: usize, end: usize) -> Self {
        self.start_offset = Some(start);
        self.end_offset = Some(end);
        self
    }

    /// The character range, when this reference addresses one
    pub fn range(&self) -> Option<(usize, usize)> {
        match (self.start_offset, self.end_offset) {
            (Some(start), Some(end)) if self.field != NodeField::Attr => Some((start, end)),
            _ => None,
        }
    }
}

/// One translatable text unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Run-unique id, `t_000001` style
    pub id: String,
    /// Original content including surrounding whitespace
    pub raw: String,
    /// Leading whitespace of `raw`
    pub lead_ws: String,
    /// Text to translate
    pub core: String,
    /// Trailing whitespace of `raw`
    pub trail_ws: String,
    /// Where the content lives in the document
    pub node_ref: NodeRef,
    /// Section the part belongs to
    pub block_id: String,
    /// Final translated text, already restored
    #[serde(default)]
    pub translated_core: Option<String>,
    /// Core with protected tokens masked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_core: Option<String>,
    /// Placeholder to original token
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub token_map: HashMap<String, String>,
}

impl Part {
    /// The text that should end up in the document
    pub fn output_text(&self) -> String {
        let core = self.translated_core.as_deref().unwrap_or(&self.core);
        format!("{}{}{}", self.lead_ws, core, self.trail_ws)
    }
}

/// Ordered parts sharing one container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Run-unique id, `b_000001` style
    pub block_id: String,
    /// Space-joined cores, for diagnostics
    pub context: String,
    /// Parts in document order
    pub parts: Vec<Part>,
}

/// A translatable attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeItem {
    /// Run-unique id, `a_000001` style
    pub id: String,
    /// Attribute value
    pub text: String,
    /// Hint for the model, e.g. `attr:title`
    pub hint: String,
    /// Where the attribute lives
    pub node_ref: NodeRef,
    /// Final translated text, already restored
    #[serde(default)]
    pub translated_text: Option<String>,
    /// Text with protected tokens masked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_text: Option<String>,
    /// Placeholder to original token
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub token_map: HashMap<String, String>,
}

/// What is actually sent to the model for one unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationItem {
    /// Unit id
    pub id: String,
    /// Protected text
    pub text: String,
    /// Section id, if the unit belongs to one
    pub block_id: Option<String>,
    /// Free-form hint
    pub hint: Option<String>,
    /// Preceding neighbor text, empty if none attached
    pub context_prev: String,
    /// Following neighbor text, empty if none attached
    pub context_next: String,
    /// Whether an empty translation is acceptable for this unit
    pub allow_empty: bool,
}

impl TranslationItem {
    /// Item for a text part
    pub fn for_part(id: impl Into<String>, text: impl Into<String>, block_id: impl Into<String>) -> Self {
        let block_id = block_id.into();
        Self {
            id: id.into(),
            text: text.into(),
            block_id: if block_id.is_empty() { None } else { Some(block_id) },
            allow_empty: true,
            ..Default::default()
        }
    }

    /// Item for an attribute value
    pub fn for_attr(id: impl Into<String>, text: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hint: Some(hint.into()),
            allow_empty: false,
            ..Default::default()
        }
    }

    /// Character count used for batch sizing
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A group of items sent in one request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateBatch {
    /// Items in input order
    pub items: Vec<TranslationItem>,
    /// Sum of item character counts
    pub chars: usize,
}

impl TranslateBatch {
    /// Ids of the items, in order
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}
