/*!
 * Tests for the translation building blocks through the public API
 */

use serde_json::json;

use weblingo::models::TranslationItem;
use weblingo::translation::build_batches;
use weblingo::translation::context::{CONTEXT_MAX_CHARS, attach_context};
use weblingo::translation::glossary::{STATIC_TERMS, build_glossary};
use weblingo::translation::token_protector::{protect_text, restore_text};
use weblingo::translation::validate::{ValidationError, validate_translation_result};

fn response(pairs: &[(&str, &str)]) -> String {
    let translations: Vec<_> = pairs.iter().map(|(id, text)| json!({"id": id, "text": text})).collect();
    json!({ "translations": translations }).to_string()
}

#[test]
fn test_protectValidateRestore_withTranslatedPlaceholders_shouldRecoverTokens() {
    let source = "Download 2.4.1 from https://example.com/get and run --verbose";
    let protected = protect_text(source);
    assert_eq!(protected.mapping.len(), 3);

    let items = vec![TranslationItem::for_part("t_000001", protected.text.clone(), "b_000001")];
    let translated = protected.text.replace("Download", "Скачайте").replace("and run", "и запустите");
    let raw = response(&[("t_000001", &translated)]);

    let result = validate_translation_result(&raw, &items, true, true).unwrap();
    let restored = restore_text(&result["t_000001"], &protected.mapping);

    assert_eq!(
        restored,
        "Скачайте 2.4.1 from https://example.com/get и запустите --verbose"
    );
}

#[test]
fn test_validate_withDroppedPlaceholder_shouldReportTokenIntegrity() {
    let protected = protect_text("See https://example.com for details");
    let items = vec![TranslationItem::for_part("t_000001", protected.text.clone(), "b_000001")];
    let raw = response(&[("t_000001", "Подробности на сайте")]);

    let err = validate_translation_result(&raw, &items, false, true).unwrap_err();

    assert!(matches!(err, ValidationError::TokenIntegrity { .. }));
    assert_eq!(err.to_string(), "token_integrity:placeholder_set_mismatch");
}

#[test]
fn test_validate_withEmptyAttributeTranslation_shouldReject() {
    let items = vec![TranslationItem::for_attr("a_000001", "Open menu", "attr:title")];
    let raw = response(&[("a_000001", "  ")]);

    let err = validate_translation_result(&raw, &items, false, true).unwrap_err();

    assert_eq!(err, ValidationError::EmptyPart { id: "a_000001".to_string() });
}

#[test]
fn test_buildBatches_shouldRespectLimitsAndOrder() {
    let items: Vec<TranslationItem> = (1..=25)
        .map(|i| {
            TranslationItem::for_part(
                format!("t_{:06}", i),
                "word ".repeat(i % 7 + 1),
                format!("b_{:06}", i / 5 + 1),
            )
        })
        .collect();

    let batches = build_batches(&items, 60, 4, true);

    let flattened: Vec<String> = batches.iter().flat_map(|b| b.ids()).collect();
    let expected: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
    assert_eq!(flattened, expected);
    for batch in &batches {
        assert!(batch.items.len() <= 4);
        assert!(batch.chars <= 60 || batch.items.len() == 1);
        assert_eq!(batch.chars, batch.items.iter().map(|i| i.char_len()).sum::<usize>());
    }
}

#[test]
fn test_buildGlossary_withSmallCap_shouldNeverExceedIt() {
    let texts = ["Use Node-API and SDK3 with Node-API and SDK3"; 3];

    let glossary = build_glossary(texts, 5);

    assert_eq!(glossary.len(), 5);
    for term in STATIC_TERMS {
        assert!(glossary.contains_key(*term));
    }
    assert!(glossary.iter().all(|(k, v)| k == v));
}

#[test]
fn test_attachContext_withLongNeighbor_shouldTruncateSnippet() {
    let long = format!("Lorem {}end.", "ipsum dolor ".repeat(40));
    let mut items = vec![
        TranslationItem::for_part("t_000001", long, "b_000001"),
        TranslationItem::for_part("t_000002", "and then", "b_000001"),
    ];

    let stats = attach_context(&mut items);

    assert_eq!(stats.items_with_context, 1);
    assert!(items[1].context_prev.ends_with('…'));
    assert_eq!(items[1].context_prev.chars().count(), CONTEXT_MAX_CHARS + 1);
    assert!(items[1].context_next.is_empty());
}
