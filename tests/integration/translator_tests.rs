/*!
 * Translator behavior against the mock client
 */

use weblingo::app_config::TranslationUnitMode;
use weblingo::extract::{extract_attribute_items, extract_blocks};
use weblingo::models::{AttributeItem, Block};
use weblingo::providers::{MockClient, TranslationPayload};
use weblingo::snapshot::PageSnapshot;
use weblingo::translation::translator::FALLBACK_REASON;
use weblingo::translation::{TranslationCache, Translator, TranslatorSettings};

use crate::common::{self, attribute, prose_container, sample_snapshot, test_settings};

fn units(snapshot: &PageSnapshot) -> (Vec<Block>, Vec<AttributeItem>) {
    let blocks = extract_blocks(snapshot, TranslationUnitMode::Block);
    let attrs = extract_attribute_items(snapshot, &Default::default());
    (blocks, attrs)
}

fn single_paragraph(texts: &[&str]) -> PageSnapshot {
    PageSnapshot {
        containers: vec![prose_container("/html/body/main/p[1]", texts)],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_translate_withWarmCache_shouldNotCallClientAgain() {
    let dir = common::create_temp_dir().unwrap();
    let cache_path = dir.path().join("cache.sqlite3");
    let snapshot = sample_snapshot();

    let first_client = MockClient::working();
    let mut first = Translator::new(
        Box::new(first_client.clone()),
        Some(TranslationCache::open(&cache_path).unwrap()),
        test_settings(),
    );
    let (mut blocks, mut attrs) = units(&snapshot);
    first.translate_blocks_and_attrs(&mut blocks, &mut attrs).await.unwrap();
    assert_eq!(first_client.request_count(), 1);
    first.close();

    let second_client = MockClient::working();
    let mut second = Translator::new(
        Box::new(second_client.clone()),
        Some(TranslationCache::open(&cache_path).unwrap()),
        test_settings(),
    );
    let (mut cached_blocks, mut cached_attrs) = units(&snapshot);
    second
        .translate_blocks_and_attrs(&mut cached_blocks, &mut cached_attrs)
        .await
        .unwrap();

    assert_eq!(second_client.request_count(), 0);
    assert_eq!(second.stats().cache_hits, 1);
    assert_eq!(second.stats().requests, 0);
    assert_eq!(cached_blocks, blocks);
    assert_eq!(cached_attrs, attrs);
}

#[tokio::test]
async fn test_translate_withOtherTargetLanguage_shouldMissCache() {
    let dir = common::create_temp_dir().unwrap();
    let cache_path = dir.path().join("cache.sqlite3");
    let snapshot = single_paragraph(&["Hello there"]);

    let mut russian = Translator::new(
        Box::new(MockClient::working()),
        Some(TranslationCache::open(&cache_path).unwrap()),
        test_settings(),
    );
    let (mut blocks, _) = units(&snapshot);
    russian.translate_blocks_and_attrs(&mut blocks, &mut []).await.unwrap();
    russian.close();

    let german_client = MockClient::working();
    let mut german = Translator::new(
        Box::new(german_client.clone()),
        Some(TranslationCache::open(&cache_path).unwrap()),
        TranslatorSettings {
            target_language: "de".to_string(),
            ..test_settings()
        },
    );
    let (mut german_blocks, _) = units(&snapshot);
    german.translate_blocks_and_attrs(&mut german_blocks, &mut []).await.unwrap();

    assert_eq!(german_client.request_count(), 1);
    assert_eq!(german.stats().cache_hits, 0);
    assert_eq!(german_blocks[0].parts[0].translated_core.as_deref(), Some("[de] Hello there"));
}

#[tokio::test]
async fn test_translate_withFailingClient_shouldKeepSourceEverywhere() {
    let client = MockClient::failing();
    let mut translator = Translator::new(Box::new(client.clone()), None, test_settings());
    let (mut blocks, mut attrs) = units(&sample_snapshot());

    translator.translate_blocks_and_attrs(&mut blocks, &mut attrs).await.unwrap();

    for part in blocks.iter().flat_map(|b| b.parts.iter()) {
        assert_eq!(part.translated_core.as_deref(), Some(part.core.as_str()));
    }
    assert_eq!(attrs[0].translated_text.as_deref(), Some("Open the reference"));

    let stats = translator.stats();
    assert_eq!(stats.fallback_parts, 6);
    assert_eq!(
        stats.failures.iter().filter(|f| f.reason == FALLBACK_REASON).count(),
        6
    );
    assert!(stats.split_depth_max >= 2);
    assert_eq!(stats.requests, client.request_count());
}

#[tokio::test]
async fn test_translate_withFragmentedParagraph_shouldSendNeighborContext() {
    let client = MockClient::working();
    let mut translator = Translator::new(Box::new(client.clone()), None, test_settings());
    let snapshot = single_paragraph(&[
        "The Translator uses OpenAI API.",
        "This translator keeps glossary consistency.",
        "OpenAI API responses should stay consistent.",
    ]);
    let (mut blocks, _) = units(&snapshot);

    translator.translate_blocks_and_attrs(&mut blocks, &mut []).await.unwrap();

    let payloads = client.payloads();
    assert_eq!(payloads.len(), 1);
    let items = &payloads[0].items;
    assert_eq!(items[1].context_prev, "The Translator uses OpenAI API.");
    assert_eq!(items[1].context_next, "OpenAI API responses should stay consistent.");
    assert_eq!(items[0].context_prev, "");
    assert!(items.iter().all(|item| item.section == "b_000001"));

    assert_eq!(payloads[0].glossary.get("API").map(String::as_str), Some("API"));
    assert_eq!(payloads[0].glossary.get("OpenAI").map(String::as_str), Some("OpenAI"));
    assert_eq!(translator.stats().items_with_context, 3);
    assert!(translator.stats().glossary_terms >= 5);
}

#[tokio::test]
async fn test_translate_withAttributes_shouldSendHintWithoutContext() {
    let client = MockClient::working();
    let mut translator = Translator::new(Box::new(client.clone()), None, test_settings());
    let snapshot = PageSnapshot {
        attributes: vec![
            attribute("/html/body/a[1]", "title", "Open"),
            attribute("/html/body/input[1]", "placeholder", "Search"),
        ],
        ..Default::default()
    };
    let (mut blocks, mut attrs) = units(&snapshot);

    translator.translate_blocks_and_attrs(&mut blocks, &mut attrs).await.unwrap();

    let item = &client.payloads()[0].items[1];
    assert_eq!(item.hint, "attr:placeholder");
    assert!(item.context_prev.is_empty() && item.context_next.is_empty());
    assert_eq!(item.section, "");
    assert_eq!(attrs[1].translated_text.as_deref(), Some("[ru] Search"));
    assert_eq!(translator.stats().translated_attrs, 2);
}

#[tokio::test]
async fn test_translate_withProtectionToggle_shouldChangeWhatIsSent() {
    let snapshot = single_paragraph(&["Visit https://example.com/docs today"]);

    let protected_client = MockClient::echo();
    let mut protected = Translator::new(Box::new(protected_client.clone()), None, test_settings());
    let (mut blocks, _) = units(&snapshot);
    protected.translate_blocks_and_attrs(&mut blocks, &mut []).await.unwrap();

    assert_eq!(
        protected_client.payloads()[0].items[0].text,
        "Visit WEBLINGO_TP_000001 today"
    );
    assert_eq!(blocks[0].parts[0].protected_core.as_deref(), Some("Visit WEBLINGO_TP_000001 today"));
    assert_eq!(
        blocks[0].parts[0].translated_core.as_deref(),
        Some("Visit https://example.com/docs today")
    );

    let plain_client = MockClient::echo();
    let mut plain = Translator::new(
        Box::new(plain_client.clone()),
        None,
        TranslatorSettings {
            token_protect: false,
            ..test_settings()
        },
    );
    let (mut plain_blocks, _) = units(&snapshot);
    plain.translate_blocks_and_attrs(&mut plain_blocks, &mut []).await.unwrap();

    assert_eq!(
        plain_client.payloads()[0].items[0].text,
        "Visit https://example.com/docs today"
    );
    assert!(plain_blocks[0].parts[0].protected_core.is_none());
    assert!(plain_blocks[0].parts[0].token_map.is_empty());
    assert_eq!(plain.stats().token_protected_count, 0);
}

fn drop_placeholders(payload: &TranslationPayload) -> String {
    MockClient::translations_json(payload, |_| "Перевод без ссылки".to_string())
}

#[tokio::test]
async fn test_translate_withLostPlaceholder_shouldFallBackWithReason() {
    let client = MockClient::working().with_custom_response(drop_placeholders);
    let mut translator = Translator::new(Box::new(client), None, test_settings());
    let (mut blocks, _) = units(&single_paragraph(&["See https://example.com for details"]));

    translator.translate_blocks_and_attrs(&mut blocks, &mut []).await.unwrap();

    assert_eq!(
        blocks[0].parts[0].translated_core.as_deref(),
        Some("See https://example.com for details")
    );
    let failures = &translator.stats().failures;
    assert_eq!(failures[0].reason, "batch_failed:token_integrity:placeholder_set_mismatch");
    assert_eq!(failures[1].reason, FALLBACK_REASON);
}

fn blank_everything(payload: &TranslationPayload) -> String {
    MockClient::translations_json(payload, |_| String::new())
}

#[tokio::test]
async fn test_translate_withBlankOutput_shouldAcceptPartsButNotAttributes() {
    let client = MockClient::working().with_custom_response(blank_everything);
    let mut translator = Translator::new(Box::new(client), None, test_settings());
    let mut snapshot = single_paragraph(&["Hello"]);
    snapshot.attributes.push(attribute("/html/body/a[1]", "title", "Open"));
    let (mut blocks, mut attrs) = units(&snapshot);

    translator.translate_blocks_and_attrs(&mut blocks, &mut attrs).await.unwrap();

    assert_eq!(blocks[0].parts[0].translated_core.as_deref(), Some(""));
    assert_eq!(attrs[0].translated_text.as_deref(), Some("Open"));
    assert_eq!(translator.stats().fallback_parts, 1);
    assert_eq!(translator.stats().split_depth_max, 1);
}

#[tokio::test]
async fn test_translate_withSmallBatchLimits_shouldSplitIntoSeveralRequests() {
    let client = MockClient::working();
    let settings = TranslatorSettings {
        max_items_per_batch: 2,
        ..test_settings()
    };
    let mut translator = Translator::new(Box::new(client.clone()), None, settings);
    let (mut blocks, mut attrs) = units(&sample_snapshot());

    translator.translate_blocks_and_attrs(&mut blocks, &mut attrs).await.unwrap();

    assert_eq!(client.request_count(), 3);
    assert_eq!(translator.stats().batches_total, 3);
    assert!(client.payloads().iter().all(|p| p.items.len() <= 2));
    assert_eq!(translator.stats().translated_parts, 5);
}
