/*!
 * Tests for application configuration functionality
 */

use weblingo::app_config::{AltMode, Config, LogLevel, TranslationUnitMode};

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "ru");
    assert_eq!(config.translation.batch_chars, 4000);
    assert_eq!(config.translation.max_items_per_batch, 40);
    assert_eq!(config.translation.max_retries, 6);
    assert!(config.translation.token_protect);
    assert!(!config.translation.token_protect_strict);
    assert!(config.translation.allow_empty_parts);
    assert!(config.translation.use_cache);
    assert_eq!(config.extraction.translation_unit, TranslationUnitMode::Block);
    assert_eq!(config.extraction.translate_alt, AltMode::Auto);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.target_language = "qqq".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.reasoning_effort = "extreme".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.batch_chars = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.max_retries = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "target_language": "de",
        "translation": { "model": "gpt-4.1", "token_protect": false },
        "extraction": { "translation_unit": "textnode", "translate_alt": "off" }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.target_language, "de");
    assert_eq!(config.translation.model, "gpt-4.1");
    assert!(!config.translation.token_protect);
    assert_eq!(config.translation.batch_chars, 4000);
    assert_eq!(config.extraction.translation_unit, TranslationUnitMode::TextNode);
    assert_eq!(config.extraction.translate_alt, AltMode::Off);
    assert!(config.extraction.translate_attrs);
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "ru");
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.translation.model, config.translation.model);
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", r#"{"target_language": "fr"}"#).unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "fr");
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_getCachePath_withExplicitPath_shouldUseIt() {
    let mut config = Config::default();
    config.translation.cache_path = Some("/tmp/wl-cache.sqlite3".into());

    assert_eq!(
        config.translation.get_cache_path().unwrap(),
        std::path::PathBuf::from("/tmp/wl-cache.sqlite3")
    );
}

#[test]
fn test_logLevel_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
