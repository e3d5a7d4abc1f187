use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::apply::{apply_attrs, apply_blocks};
use crate::extract::{extract_attribute_items, extract_blocks};
use crate::language_utils::normalize_to_part1_or_part2t;
use crate::snapshot::PageSnapshot;
use crate::translation::{TranslateStats, Translator};

// @module: Application controller for page translation

/// Summary of one page run, written next to the output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub url: String,
    pub target_language: String,
    pub blocks: usize,
    pub parts: usize,
    pub attrs: usize,
    pub applied_parts: usize,
    pub applied_attrs: usize,
    pub elapsed_secs: f64,
    pub stats: TranslateStats,
}

/// Main application controller
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a controller, validating the configuration first
    ///
    /// The target language is stored in its shortest ISO form so that `ger`,
    /// `deu` and `DE` share cache entries and output names.
    pub fn with_config(mut config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        config.target_language = normalize_to_part1_or_part2t(&config.target_language)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate the snapshot at `input` and write the result
    ///
    /// The translated snapshot goes to `output` (or `<stem>.<lang>.json` next
    /// to the input); the run summary goes to `<output stem>.stats.json`.
    pub async fn run(&self, input: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<RunSummary> {
        if !input.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input));
        }

        let output = match output {
            Some(path) => path,
            None => Self::default_output_path(input, &self.config.target_language)?,
        };
        if output.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {:?}. Use -f to force overwrite.",
                output
            ));
        }

        let snapshot = PageSnapshot::load(input)?;
        let translator = Translator::from_config(&self.config)?;
        let (translated, summary) = self.translate_snapshot(snapshot, translator).await?;

        translated.save(&output)?;
        let stats_path = Self::stats_path(&output);
        let summary_json = serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?;
        std::fs::write(&stats_path, summary_json)
            .with_context(|| format!("Failed to write run summary: {:?}", stats_path))?;

        info!("Success: {:?}", output);
        Ok(summary)
    }

    /// Extract, translate and apply one snapshot with the given translator
    pub async fn translate_snapshot(
        &self,
        mut snapshot: PageSnapshot,
        mut translator: Translator,
    ) -> Result<(PageSnapshot, RunSummary)> {
        let start_time = Instant::now();

        let mut blocks = extract_blocks(&snapshot, self.config.extraction.translation_unit);
        let mut attrs = extract_attribute_items(&snapshot, &self.config.extraction);
        let parts: usize = blocks.iter().map(|b| b.parts.len()).sum();
        info!(
            "Extracted {} blocks, {} parts and {} attributes from {}",
            blocks.len(),
            parts,
            attrs.len(),
            if snapshot.url.is_empty() { "snapshot" } else { snapshot.url.as_str() }
        );

        let outcome = translator.translate_blocks_and_attrs(&mut blocks, &mut attrs).await;
        let stats = translator.stats().clone();
        translator.close();
        outcome.context("Translation failed")?;

        let applied_parts = apply_blocks(&mut snapshot, &blocks);
        let applied_attrs = apply_attrs(&mut snapshot, &attrs);
        if applied_parts < parts {
            warn!("Applied {} of {} parts", applied_parts, parts);
        }
        if !stats.failures.is_empty() {
            warn!("{} translation failures recorded", stats.failures.len());
        }

        let summary = RunSummary {
            url: snapshot.url.clone(),
            target_language: self.config.target_language.clone(),
            blocks: blocks.len(),
            parts,
            attrs: attrs.len(),
            applied_parts,
            applied_attrs,
            elapsed_secs: start_time.elapsed().as_secs_f64(),
            stats,
        };

        info!(
            "Applied {} parts and {} attributes in {:.1}s",
            summary.applied_parts, summary.applied_attrs, summary.elapsed_secs
        );

        Ok((snapshot, summary))
    }

    /// `<dir>/<stem>.<lang>.json` for an input `<dir>/<stem>.json`
    pub fn default_output_path(input: &Path, target_language: &str) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .ok_or_else(|| anyhow!("Input path has no file name: {:?}", input))?
            .to_string_lossy();
        let file_name = format!("{}.{}.json", stem, target_language.to_lowercase());
        Ok(input.with_file_name(file_name))
    }

    /// Summary path next to `output`
    pub fn stats_path(output: &Path) -> PathBuf {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        output.with_file_name(format!("{}.stats.json", stem))
    }
}
