/*!
 * Tests for language utility functions
 */

use weblingo::language_utils::{get_language_name, normalize_to_part1_or_part2t};

#[test]
fn test_normalizeToPart1OrPart2t_withValidCodes_shouldPreferShortCode() {
    assert_eq!(normalize_to_part1_or_part2t("rus").unwrap(), "ru");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("EN").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t(" de ").unwrap(), "de");
}

#[test]
fn test_normalizeToPart1OrPart2t_withoutPart1Code_shouldKeepPart2t() {
    assert_eq!(normalize_to_part1_or_part2t("haw").unwrap(), "haw");
}

#[test]
fn test_getLanguageName_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("ru").unwrap(), "Russian");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert_eq!(get_language_name("ger").unwrap(), "German");
}

#[test]
fn test_languageUtils_withInvalidCodes_shouldFail() {
    assert!(normalize_to_part1_or_part2t("qqq").is_err());
    assert!(normalize_to_part1_or_part2t("e").is_err());
    assert!(get_language_name("").is_err());
}
