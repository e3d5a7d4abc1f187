/*!
 * Translation orchestrator.
 *
 * Runs one page through the pipeline: protect tokens, attach neighbor
 * context, build the glossary, batch, translate each batch with cache and
 * retries, bisect failing batches down to single items, then restore
 * placeholders and write results back into the units.
 *
 * Requests are issued one at a time. Bad model answers never surface as
 * errors; they end in retries, splits and finally a fallback to the source
 * text. Only contract violations between extraction and translation do.
 */

use anyhow::{Context, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::models::{AttributeItem, Block, TranslationItem};
use crate::providers::{
    OpenAIClient, PayloadItem, PayloadRules, TASK_TRANSLATE_ITEMS, TranslationClient, TranslationPayload,
};

use super::batch::build_batches;
use super::cache::TranslationCache;
use super::context::attach_context;
use super::glossary::{self, GLOSSARY_VERSION};
use super::token_protector::{TOKEN_PROTECTOR_VERSION, protect_text, restore_text};
use super::validate::validate_translation_result;

/// Version of the prompt contract; part of the cache key
pub const PROMPT_VERSION: &str = "1.0";

/// Status stored with validated cache entries
const CACHE_STATUS_OK: &str = "ok";

/// Failure reason for units that kept their source text
pub const FALLBACK_REASON: &str = "fallback_original_after_retries";

/// Number of ids used to label a failed batch
const FAILURE_LABEL_IDS: usize = 3;

/// Knobs of a translation run
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorSettings {
    pub model: String,
    pub reasoning_effort: String,
    pub target_language: String,
    pub batch_chars: usize,
    pub max_items_per_batch: usize,
    pub max_retries: u32,
    pub allow_empty_parts: bool,
    pub token_protect: bool,
    pub token_protect_strict: bool,
    pub prefer_section_boundary: bool,
    pub glossary_max_terms: usize,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TranslatorSettings {
    /// Settings taken from the application config
    pub fn from_config(config: &Config) -> Self {
        let t = &config.translation;
        Self {
            model: t.model.clone(),
            reasoning_effort: t.reasoning_effort.clone(),
            target_language: config.target_language.clone(),
            batch_chars: t.batch_chars,
            max_items_per_batch: t.max_items_per_batch,
            max_retries: t.max_retries,
            allow_empty_parts: t.allow_empty_parts,
            token_protect: t.token_protect,
            token_protect_strict: t.token_protect_strict,
            prefer_section_boundary: t.prefer_section_boundary,
            glossary_max_terms: t.glossary_max_terms,
        }
    }
}

/// A unit or batch that did not get a clean translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Unit id, or up to three comma-joined ids for a batch
    pub id: String,
    pub reason: String,
}

/// Counters of a translation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateStats {
    pub requests: usize,
    pub retries: usize,
    pub split_depth_max: usize,
    pub cache_hits: usize,
    pub failures: Vec<FailureRecord>,
    pub fallback_parts: usize,
    pub translated_parts: usize,
    pub translated_attrs: usize,
    pub token_protected_count: usize,
    pub batches_total: usize,
    pub batch_chars_total: usize,
    pub items_with_context: usize,
    pub context_chars_total: usize,
    pub glossary_terms: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Result of one request attempt
enum AttemptOutcome {
    Translated(BTreeMap<String, String>),
    Retryable(String),
}

/// Where a translated id is written back
#[derive(Debug, Clone, Copy)]
enum Owner {
    Part { block: usize, part: usize },
    Attr(usize),
}

/// Translates the units of one page
pub struct Translator {
    client: Box<dyn TranslationClient>,
    cache: Option<TranslationCache>,
    settings: TranslatorSettings,
    stats: TranslateStats,
    glossary: BTreeMap<String, String>,
}

impl Translator {
    /// Create a translator around an existing client and optional cache
    pub fn new(
        client: Box<dyn TranslationClient>,
        cache: Option<TranslationCache>,
        settings: TranslatorSettings,
    ) -> Self {
        Self {
            client,
            cache,
            settings,
            stats: TranslateStats::default(),
            glossary: BTreeMap::new(),
        }
    }

    /// Translator talking to the OpenAI API, with the configured cache
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let t = &config.translation;
        let api_key = t.get_api_key();
        if api_key.is_empty() {
            return Err(anyhow!(
                "No API key configured: set translation.api_key or OPENAI_API_KEY"
            ));
        }

        let language_name = language_utils::get_language_name(&config.target_language)?;
        let client = OpenAIClient::new(
            api_key,
            t.endpoint.clone(),
            t.model.clone(),
            t.max_output_tokens,
            t.reasoning_effort.clone(),
            language_name,
            t.timeout_secs,
        )
        .context("Failed to create OpenAI client")?;

        let cache = if t.use_cache {
            Some(TranslationCache::open(t.get_cache_path()?)?)
        } else {
            None
        };

        Ok(Self::new(Box::new(client), cache, TranslatorSettings::from_config(config)))
    }

    /// Counters so far
    pub fn stats(&self) -> &TranslateStats {
        &self.stats
    }

    /// Glossary built by the last run
    pub fn glossary(&self) -> &BTreeMap<String, String> {
        &self.glossary
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    /// Translate all parts and attributes in place
    ///
    /// On return every unit that was sent has `translated_core` or
    /// `translated_text` set, either to its translation or to its source text
    /// if translation kept failing.
    pub async fn translate_blocks_and_attrs(
        &mut self,
        blocks: &mut [Block],
        attrs: &mut [AttributeItem],
    ) -> Result<(), TranslationError> {
        let part_count: usize = blocks.iter().map(|b| b.parts.len()).sum();
        if part_count == 0 && attrs.is_empty() {
            debug!("Nothing to translate");
            return Ok(());
        }

        let mut token_maps: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut owners: HashMap<String, Owner> = HashMap::new();
        let mut items: Vec<TranslationItem> = Vec::with_capacity(part_count + attrs.len());

        for (block_idx, block) in blocks.iter_mut().enumerate() {
            for (part_idx, part) in block.parts.iter_mut().enumerate() {
                let (text, mapping) = self.protect_if_needed(&part.core);
                if self.settings.token_protect {
                    part.protected_core = Some(text.clone());
                    part.token_map = mapping.clone();
                }
                items.push(TranslationItem::for_part(&part.id, text, &part.block_id));
                token_maps.insert(part.id.clone(), mapping);
                owners.insert(
                    part.id.clone(),
                    Owner::Part {
                        block: block_idx,
                        part: part_idx,
                    },
                );
            }
        }

        for (attr_idx, attr) in attrs.iter_mut().enumerate() {
            let (text, mapping) = self.protect_if_needed(&attr.text);
            if self.settings.token_protect {
                attr.protected_text = Some(text.clone());
                attr.token_map = mapping.clone();
            }
            items.push(TranslationItem::for_attr(&attr.id, text, &attr.hint));
            token_maps.insert(attr.id.clone(), mapping);
            owners.insert(attr.id.clone(), Owner::Attr(attr_idx));
        }

        let context_stats = attach_context(&mut items);
        self.stats.items_with_context += context_stats.items_with_context;
        self.stats.context_chars_total += context_stats.context_chars_total;

        let sources = blocks
            .iter()
            .flat_map(|b| b.parts.iter().map(|p| p.core.as_str()))
            .chain(attrs.iter().map(|a| a.text.as_str()));
        self.glossary = glossary::build_glossary(sources, self.settings.glossary_max_terms);
        self.stats.glossary_terms = self.glossary.len();

        info!(
            "Translating {} parts and {} attributes into '{}'",
            part_count,
            attrs.len(),
            self.settings.target_language
        );

        let translated = self.translate_recursive(items, 0).await;

        for (id, text) in translated {
            let mapping = token_maps
                .get(&id)
                .ok_or_else(|| TranslationError::MissingTokenMap(id.clone()))?;
            let restored = restore_text(&text, mapping);

            match owners.get(&id) {
                Some(&Owner::Part { block, part }) => {
                    blocks[block].parts[part].translated_core = Some(restored);
                    self.stats.translated_parts += 1;
                }
                Some(&Owner::Attr(idx)) => {
                    attrs[idx].translated_text = Some(restored);
                    self.stats.translated_attrs += 1;
                }
                None => return Err(TranslationError::UnknownItem(id)),
            }
        }

        info!(
            "Translation finished: {} parts, {} attributes, {} requests, {} cache hits, {} fallbacks",
            self.stats.translated_parts,
            self.stats.translated_attrs,
            self.stats.requests,
            self.stats.cache_hits,
            self.stats.fallback_parts
        );

        Ok(())
    }

    fn protect_if_needed(&mut self, text: &str) -> (String, HashMap<String, String>) {
        if !self.settings.token_protect {
            return (text.to_string(), HashMap::new());
        }
        let protected = protect_text(text);
        self.stats.token_protected_count += protected.mapping.len();
        (protected.text, protected.mapping)
    }

    /// Translate `items`, splitting failing batches in half until they work
    /// or are down to a single item
    fn translate_recursive(
        &mut self,
        items: Vec<TranslationItem>,
        depth: usize,
    ) -> BoxFuture<'_, HashMap<String, String>> {
        async move {
            self.stats.split_depth_max = self.stats.split_depth_max.max(depth);
            let mut result = HashMap::with_capacity(items.len());

            let batches = build_batches(
                &items,
                self.settings.batch_chars,
                self.settings.max_items_per_batch,
                self.settings.prefer_section_boundary,
            );

            for batch in batches {
                self.stats.batches_total += 1;
                self.stats.batch_chars_total += batch.chars;

                if let Some(translations) = self.translate_batch_with_retry(&batch.items).await {
                    result.extend(translations);
                    continue;
                }

                let mut left = batch.items;
                if let [item] = left.as_slice() {
                    warn!("Keeping source text for {} after repeated failures", item.id);
                    self.stats.fallback_parts += 1;
                    self.stats.failures.push(FailureRecord {
                        id: item.id.clone(),
                        reason: FALLBACK_REASON.to_string(),
                    });
                    result.insert(item.id.clone(), item.text.clone());
                    continue;
                }

                let right = left.split_off(left.len() / 2);
                debug!(
                    "Splitting failed batch of {} items at depth {}",
                    left.len() + right.len(),
                    depth
                );
                result.extend(self.translate_recursive(left, depth + 1).await);
                result.extend(self.translate_recursive(right, depth + 1).await);
            }

            result
        }
        .boxed()
    }

    /// Translate one batch, from cache or with up to `max_retries` requests
    async fn translate_batch_with_retry(
        &mut self,
        items: &[TranslationItem],
    ) -> Option<BTreeMap<String, String>> {
        let cache_key = self.make_cache_key(items);

        if let Some(entry) = self.cache.as_ref().and_then(|cache| cache.get(&cache_key)) {
            if items.iter().all(|item| entry.translations.contains_key(&item.id)) {
                self.stats.cache_hits += 1;
                return Some(entry.translations);
            }
            warn!("Cache entry does not cover its batch, ignoring it");
        }

        let payload = self.build_payload(items);
        let mut last_error = String::new();

        for attempt in 1..=self.settings.max_retries {
            self.stats.requests += 1;
            match self.attempt(&payload, items).await {
                AttemptOutcome::Translated(translations) => {
                    if let Some(cache) = &self.cache {
                        cache.put(&cache_key, &translations, CACHE_STATUS_OK);
                    }
                    return Some(translations);
                }
                AttemptOutcome::Retryable(reason) => {
                    self.stats.retries += 1;
                    warn!(
                        "Attempt {}/{} for batch of {} items failed: {}",
                        attempt,
                        self.settings.max_retries,
                        items.len(),
                        reason
                    );
                    last_error = reason;
                }
            }
        }

        let label = items
            .iter()
            .take(FAILURE_LABEL_IDS)
            .map(|item| item.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        self.stats.failures.push(FailureRecord {
            id: label,
            reason: format!("batch_failed:{}", last_error),
        });
        None
    }

    async fn attempt(&mut self, payload: &TranslationPayload, items: &[TranslationItem]) -> AttemptOutcome {
        let response = match self.client.translate_payload(payload).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request failed: {}", e);
                return AttemptOutcome::Retryable(format!("request_error:{}", e.kind()));
            }
        };

        if let Some(usage) = response.usage {
            self.stats.input_tokens += usage.input_tokens;
            self.stats.output_tokens += usage.output_tokens;
        }

        if response.is_incomplete() {
            return AttemptOutcome::Retryable("incomplete_response".to_string());
        }

        match validate_translation_result(
            &response.raw_text,
            items,
            self.settings.token_protect_strict,
            self.settings.allow_empty_parts,
        ) {
            Ok(translations) => AttemptOutcome::Translated(translations),
            Err(e) => AttemptOutcome::Retryable(e.to_string()),
        }
    }

    fn build_payload(&self, items: &[TranslationItem]) -> TranslationPayload {
        TranslationPayload {
            task: TASK_TRANSLATE_ITEMS.to_string(),
            target_language: self.settings.target_language.clone(),
            rules: PayloadRules {
                keep_placeholders: true,
                no_html: true,
                allow_empty_parts: self.settings.allow_empty_parts,
                use_neighbor_context: true,
                consistent_style: true,
            },
            items: items.iter().map(PayloadItem::from).collect(),
            glossary: self.glossary.clone(),
        }
    }

    /// Content-addressed key of a batch
    ///
    /// Covers the model, the effort, the target language, every rule version
    /// and the canonical JSON of the items together with the glossary.
    pub fn make_cache_key(&self, items: &[TranslationItem]) -> String {
        let canonical_items: Vec<_> = items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "text": item.text,
                    "hint": item.hint,
                    "context_prev": item.context_prev,
                    "context_next": item.context_next,
                    "section": item.block_id.as_deref().unwrap_or(""),
                })
            })
            .collect();
        let canonical = json!({ "items": canonical_items, "glossary": self.glossary }).to_string();

        let raw = [
            self.settings.model.as_str(),
            self.settings.reasoning_effort.as_str(),
            self.settings.target_language.as_str(),
            PROMPT_VERSION,
            GLOSSARY_VERSION,
            TOKEN_PROTECTOR_VERSION,
            sha256_hex(&canonical).as_str(),
        ]
        .join("|");
        sha256_hex(&raw)
    }

    /// Release the cache
    pub fn close(self) {
        if let Some(cache) = self.cache {
            cache.close();
        }
    }
}

fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}
