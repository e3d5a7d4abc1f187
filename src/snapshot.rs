/*!
 * Serialized page description exchanged with the rendering side.
 *
 * The browser/HTML collaborator walks the rendered DOM and emits a
 * `PageSnapshot`: content containers with their text slots, plus attribute
 * values. Extraction reads it, and the apply stage writes translated values
 * back into it through the `FieldTarget` trait.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::apply::FieldTarget;
use crate::models::{NodeField, NodeRef};

/// Kind of content container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Paragraphs, list items, headings, table cells and the like
    #[default]
    Prose,
    /// `pre`/`code` containers
    Code,
}

/// One text or tail slot inside a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSlot {
    /// Path of the owning element
    pub tree_path: String,
    /// `text` or `tail`
    pub field: NodeField,
    /// Current value, whitespace included
    pub raw: String,
}

/// A content container and its text slots in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Path of the container element
    pub tree_path: String,
    /// Prose or code
    #[serde(default)]
    pub kind: ContainerKind,
    /// Value of a `data-language` attribute, if any
    #[serde(default)]
    pub data_language: Option<String>,
    /// `class` attribute values of the container and its code child
    #[serde(default)]
    pub class_names: Vec<String>,
    /// Text slots
    pub slots: Vec<TextSlot>,
}

/// An attribute value found on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSlot {
    /// Path of the owning element
    pub tree_path: String,
    /// Attribute name
    pub attr_name: String,
    /// Current value
    pub value: String,
}

/// Everything extraction needs from a rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Final page URL, informational
    #[serde(default)]
    pub url: String,
    /// Content containers in document order
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Attribute values in document order
    #[serde(default)]
    pub attributes: Vec<AttributeSlot>,
}

impl PageSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {:?}", path))
    }

    /// Write the snapshot as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write snapshot: {:?}", path))
    }

    fn slot_mut(&mut self, node_ref: &NodeRef) -> Option<&mut TextSlot> {
        self.containers
            .iter_mut()
            .flat_map(|container| container.slots.iter_mut())
            .find(|slot| slot.tree_path == node_ref.tree_path && slot.field == node_ref.field)
    }

    fn attribute_mut(&mut self, node_ref: &NodeRef) -> Option<&mut AttributeSlot> {
        let attr_name = node_ref.attr_name.as_deref()?;
        self.attributes
            .iter_mut()
            .find(|attr| attr.tree_path == node_ref.tree_path && attr.attr_name == attr_name)
    }
}

impl FieldTarget for PageSnapshot {
    fn field_value(&mut self, node_ref: &NodeRef) -> Option<String> {
        match node_ref.field {
            NodeField::Attr => self.attribute_mut(node_ref).map(|attr| attr.value.clone()),
            NodeField::Text | NodeField::Tail => self.slot_mut(node_ref).map(|slot| slot.raw.clone()),
        }
    }

    fn set_field_value(&mut self, node_ref: &NodeRef, value: String) -> bool {
        match node_ref.field {
            NodeField::Attr => match self.attribute_mut(node_ref) {
                Some(attr) => {
                    attr.value = value;
                    true
                }
                None => false,
            },
            NodeField::Text | NodeField::Tail => match self.slot_mut(node_ref) {
                Some(slot) => {
                    slot.raw = value;
                    true
                }
                None => false,
            },
        }
    }
}
