//! Target language codes.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn lang_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}([_-][A-Za-z0-9]{2,8})*$").expect("valid language code pattern")
    })
}

/// Check that `code` looks like a language code (`fr`, `pt-BR`, `sr_Latn`).
pub fn validate_lang_code(code: &str) -> Result<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(Error::Config("target language is required".to_string()));
    }
    if !lang_code_pattern().is_match(code) {
        return Err(Error::Config(format!("invalid language code: {:?}", code)));
    }
    Ok(())
}

/// Map a target code to the code the translation service expects.
///
/// Script subtags are dropped (`sr_Latn` → `sr`); Chinese keeps its
/// simplified/traditional distinction (`zh-Hant` → `zh-TW`).
pub fn service_lang_code(code: &str) -> String {
    let mut parts = code.trim().split(['_', '-']);
    let primary = parts.next().unwrap_or_default().to_ascii_lowercase();

    if primary == "zh" {
        let traditional = parts.any(|p| {
            matches!(
                p.to_ascii_lowercase().as_str(),
                "hant" | "tw" | "hk" | "mo"
            )
        });
        return if traditional { "zh-TW" } else { "zh-CN" }.to_string();
    }

    primary
}
