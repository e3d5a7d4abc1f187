/*!
 * Tests for snapshot extraction and applying translations back
 */

use weblingo::app_config::{AltMode, ExtractionConfig, TranslationUnitMode};
use weblingo::apply::{apply_attrs, apply_blocks};
use weblingo::extract::{extract_attribute_items, extract_blocks};
use weblingo::models::NodeField;
use weblingo::snapshot::PageSnapshot;

use crate::common::{self, attribute, code_container, prose_container, sample_snapshot};

#[test]
fn test_extractBlocks_withSampleSnapshot_shouldProduceStableIds() {
    let blocks = extract_blocks(&sample_snapshot(), TranslationUnitMode::Block);

    assert_eq!(blocks.len(), 3);
    let ids: Vec<&str> = blocks.iter().flat_map(|b| b.parts.iter().map(|p| p.id.as_str())).collect();
    assert_eq!(ids, vec!["t_000001", "t_000002", "t_000003", "t_000004", "t_000005"]);
    assert_eq!(blocks[1].block_id, "b_000002");
    assert_eq!(blocks[1].context, "Run pip install weblingo to install the package.");
}

#[test]
fn test_extractBlocks_shouldPreserveWhitespaceAroundCore() {
    let blocks = extract_blocks(&sample_snapshot(), TranslationUnitMode::Block);
    let part = &blocks[1].parts[2];

    assert_eq!(part.lead_ws, " ");
    assert_eq!(part.core, "to install the package.");
    assert_eq!(part.trail_ws, "\n");
    assert_eq!(part.output_text(), part.raw);
}

#[test]
fn test_extractBlocks_withTextNodeMode_shouldMakeOneBlockPerSlot() {
    let blocks = extract_blocks(&sample_snapshot(), TranslationUnitMode::TextNode);

    assert_eq!(blocks.len(), 5);
    assert!(blocks.iter().all(|b| b.parts.len() == 1));
}

#[test]
fn test_extractBlocks_withCodeContainer_shouldExtractOnlyComments() {
    let blocks = extract_blocks(&sample_snapshot(), TranslationUnitMode::Block);
    let code = &blocks[2];

    assert_eq!(code.parts.len(), 1);
    assert_eq!(code.parts[0].core, "Read the API key");
    assert_eq!(code.parts[0].node_ref.range(), Some((11, 28)));
}

#[test]
fn test_extractBlocks_withPunctuationOnlySlots_shouldSkipThem() {
    let snapshot = PageSnapshot {
        containers: vec![prose_container("/html/body/p[1]", &["  ", "—", "...", "«»"])],
        ..Default::default()
    };

    assert!(extract_blocks(&snapshot, TranslationUnitMode::Block).is_empty());
}

#[test]
fn test_extractAttributeItems_shouldFilterTechnicalAlt() {
    let mut snapshot = sample_snapshot();
    snapshot.attributes.push(attribute("/html/body/img[2]", "alt", "Team photo at the offsite"));
    snapshot.attributes.push(attribute("/html/body/a[2]", "href", "Not translated"));

    let items = extract_attribute_items(&snapshot, &ExtractionConfig::default());

    let texts: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["Open the reference", "Team photo at the offsite"]);
    assert_eq!(items[1].id, "a_000002");
    assert_eq!(items[1].hint, "attr:alt");
}

#[test]
fn test_extractAttributeItems_withAltOffOrAttrsDisabled_shouldRespectConfig() {
    let snapshot = sample_snapshot();

    let alt_on = ExtractionConfig {
        translate_alt: AltMode::On,
        ..ExtractionConfig::default()
    };
    assert_eq!(extract_attribute_items(&snapshot, &alt_on).len(), 2);

    let disabled = ExtractionConfig {
        translate_attrs: false,
        ..ExtractionConfig::default()
    };
    assert!(extract_attribute_items(&snapshot, &disabled).is_empty());
}

#[test]
fn test_applyBlocks_withTranslatedParts_shouldKeepWhitespaceAndCode() {
    let mut snapshot = sample_snapshot();
    let mut blocks = extract_blocks(&snapshot, TranslationUnitMode::Block);
    for part in blocks.iter_mut().flat_map(|b| b.parts.iter_mut()) {
        part.translated_core = Some(format!("<{}>", part.core.to_uppercase()));
    }

    let applied = apply_blocks(&mut snapshot, &blocks);

    assert_eq!(applied, 5);
    assert_eq!(snapshot.containers[1].slots[2].raw, " <TO INSTALL THE PACKAGE.>\n");
    assert_eq!(
        snapshot.containers[2].slots[0].raw,
        "import os\n# <READ THE API KEY>\nkey = os.environ[\"KEY\"]\n"
    );
}

#[test]
fn test_applyBlocks_withSeveralCommentsInOneSlot_shouldSpliceEach() {
    let mut snapshot = PageSnapshot {
        containers: vec![code_container(
            "/html/body/pre[1]",
            Some("rust"),
            "// Создать клиент\nlet c = Client::new(); // и подключиться\n",
        )],
        ..Default::default()
    };
    let mut blocks = extract_blocks(&snapshot, TranslationUnitMode::Block);
    assert_eq!(blocks[0].parts.len(), 2);
    blocks[0].parts[0].translated_core = Some("Create the client".to_string());
    blocks[0].parts[1].translated_core = Some("and connect".to_string());

    apply_blocks(&mut snapshot, &blocks);

    assert_eq!(
        snapshot.containers[0].slots[0].raw,
        "// Create the client\nlet c = Client::new(); // and connect\n"
    );
}

#[test]
fn test_applyAttrs_shouldWriteOnlyTranslatedValues() {
    let mut snapshot = sample_snapshot();
    let mut attrs = extract_attribute_items(&snapshot, &ExtractionConfig::default());
    attrs[0].translated_text = Some("Открыть справочник".to_string());

    let applied = apply_attrs(&mut snapshot, &attrs);

    assert_eq!(applied, 1);
    assert_eq!(snapshot.attributes[0].value, "Открыть справочник");
    assert_eq!(snapshot.attributes[1].value, "diagram.png");
}

#[test]
fn test_snapshot_saveThenLoad_shouldKeepFields() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("page.json");
    let snapshot = sample_snapshot();

    snapshot.save(&path).unwrap();
    let loaded = PageSnapshot::load(&path).unwrap();

    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.containers[0].slots[0].field, NodeField::Text);
}
