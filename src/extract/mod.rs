/*!
 * Extraction of translatable units from a page snapshot.
 *
 * - `segment`: whitespace split and translatability checks
 * - `code_blocks`: prose/code classification and comment spans
 * - `blocks`: block and attribute extraction
 */

pub mod blocks;
pub mod code_blocks;
pub mod segment;

pub use blocks::{extract_attribute_items, extract_blocks};
pub use segment::{is_translatable, split_whitespace};
