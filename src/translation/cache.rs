/*!
 * Persistent translation cache.
 *
 * Maps a content-addressed batch key to the validated translations of that
 * batch. Entries are written whole and overwritten on conflict. Any storage
 * or decoding problem is reported as a miss so the caller simply asks the
 * model again.
 */

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::database::DatabaseConnection;
use crate::errors::TranslationError;

/// A cached batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Unit id to translated (still protected) text
    pub translations: BTreeMap<String, String>,
    /// Status recorded with the entry, `ok` for validated results
    pub status: String,
    /// Write time
    pub created_at: DateTime<Utc>,
}

/// Durable key/value store for batch translations
pub struct TranslationCache {
    db: DatabaseConnection,
}

impl TranslationCache {
    /// Open the cache database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TranslationError> {
        let db = DatabaseConnection::new(path).map_err(|e| TranslationError::Cache(format!("{:#}", e)))?;
        Ok(Self { db })
    }

    /// Cache backed by an in-memory database
    pub fn in_memory() -> Result<Self, TranslationError> {
        let db = DatabaseConnection::new_in_memory().map_err(|e| TranslationError::Cache(format!("{:#}", e)))?;
        Ok(Self { db })
    }

    /// Look up a key; errors and unreadable entries count as a miss
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let row = self.db.execute(|conn| {
            let row = conn
                .query_row(
                    "SELECT payload, status, created_at FROM translation_cache WHERE cache_key = ?1",
                    params![key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        });

        let (payload, status, created_at) = match row {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", short_key(key), e);
                return None;
            }
        };

        let translations: BTreeMap<String, String> = match serde_json::from_str(&payload) {
            Ok(translations) => translations,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", short_key(key), e);
                return None;
            }
        };

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        debug!("Cache hit for {}", short_key(key));
        Some(CacheEntry {
            translations,
            status,
            created_at,
        })
    }

    /// Store a batch result, replacing any previous entry for `key`
    ///
    /// Failures are logged and swallowed.
    pub fn put(&self, key: &str, translations: &BTreeMap<String, String>, status: &str) {
        let result = serde_json::to_string(translations)
            .context("Failed to serialize cache payload")
            .and_then(|payload| {
                self.db.execute(|conn| {
                    conn.execute(
                        "INSERT OR REPLACE INTO translation_cache (cache_key, payload, status, created_at) VALUES (?1, ?2, ?3, ?4)",
                        params![key, payload, status, Utc::now().to_rfc3339()],
                    )?;
                    Ok(())
                })
            });

        match result {
            Ok(()) => debug!("Cached {} translations under {}", translations.len(), short_key(key)),
            Err(e) => warn!("Cache write failed for {}: {}", short_key(key), e),
        }
    }

    /// Flush and release the database
    pub fn close(self) {
        if let Err(e) = self.db.checkpoint() {
            warn!("Failed to flush translation cache: {}", e);
        }
    }

    /// Raw access for tests and maintenance
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn short_key(key: &str) -> &str {
    key.get(..12).unwrap_or(key)
}
