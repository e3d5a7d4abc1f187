/*!
 * Translation pipeline.
 *
 * - `token_protector`: masks tokens that must survive translation verbatim
 * - `glossary`: self-mapped terms the model keeps unchanged
 * - `context`: neighbor text for fragmentary units
 * - `batch`: batch construction under char/item limits
 * - `cache`: persistent batch cache
 * - `validate`: checks on model responses
 * - `translator`: the orchestrator tying it together
 */

pub mod batch;
pub mod cache;
pub mod context;
pub mod glossary;
pub mod token_protector;
pub mod translator;
pub mod validate;

pub use self::batch::build_batches;
pub use self::cache::{CacheEntry, TranslationCache};
pub use self::translator::{FailureRecord, TranslateStats, Translator, TranslatorSettings};
