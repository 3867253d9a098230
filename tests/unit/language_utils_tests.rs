/*!
 * Tests for ISO language code utilities
 */

use epg_translator::language_utils::{
    get_language_name, is_skipped_language, language_codes_match, normalize_to_part2t,
    validate_language_code,
};

/// Test normalization of 639-1, 639-2/B and regional codes
#[test]
fn test_normalizeToPart2t_shouldHandleCommonForms() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("zh-CN").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("pt_BR").unwrap(), "por");
    assert_eq!(normalize_to_part2t("iw").unwrap(), "heb");
    assert!(normalize_to_part2t("xx").is_err());
}

/// Test that equivalent codes match
#[test]
fn test_languageCodesMatch_withEquivalentCodes_shouldReturnTrue() {
    assert!(language_codes_match("de", "ger"));
    assert!(language_codes_match("EN", "eng"));
    assert!(!language_codes_match("de", "en"));
    assert!(!language_codes_match("??", "??"));
}

/// Test the skip-language check used before single-text translation
#[test]
fn test_isSkippedLanguage_shouldMatchAnyConfiguredLanguage() {
    let skip = vec!["en".to_string(), "fr".to_string()];

    assert!(is_skipped_language("fr", &skip));
    assert!(is_skipped_language("en-GB", &skip));
    assert!(!is_skipped_language("de", &skip));
    assert!(!is_skipped_language("und", &[]));
}

/// Test language names and validation
#[test]
fn test_getLanguageName_shouldReturnEnglishName() {
    assert_eq!(get_language_name("de").unwrap(), "German");
    assert!(validate_language_code("es").is_ok());
    assert!(validate_language_code("").is_err());
}
