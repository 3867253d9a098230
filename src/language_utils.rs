use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Detected languages come back from providers in forms such as `fr`,
/// `zh-CN` or `fre`; configured skip languages are usually ISO 639-1.
/// Everything is compared on the ISO 639-2/T form of the primary subtag.

/// Strip a region or script subtag (`zh-CN`, `pt_BR`) and lowercase the rest
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

// ISO 639-2/B codes that differ from their 639-2/T counterpart
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let subtag = primary_subtag(code);

    // Google still reports a few withdrawn ISO 639-1 codes
    let subtag = match subtag.as_str() {
        "iw" => "he".to_string(),
        "jw" => "jv".to_string(),
        _ => subtag,
    };

    match subtag.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&subtag) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if let Some(mapped) = bibliographic_to_terminology(&subtag) {
                return Ok(mapped.to_string());
            }
            if Language::from_639_3(&subtag).is_some() {
                return Ok(subtag);
            }
        }
        _ => {}
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Validate that a code names a known language
pub fn validate_language_code(code: &str) -> Result<()> {
    normalize_to_part2t(code).map(|_| ())
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether a detected language is one of the languages that need no translation
pub fn is_skipped_language(detected: &str, skip_languages: &[String]) -> bool {
    skip_languages
        .iter()
        .any(|skip| language_codes_match(detected, skip))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
