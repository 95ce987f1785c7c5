use std::env;
use std::time::Duration;

use anyhow::{bail, Result};
use ilm_backend::{BackendKind, OpenAiSettings};
use ilm_core::Language;

const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 8_000;

/// Everything the tutor needs at construction. Read once, then passed down.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    pub backend: BackendKind,
    pub backend_timeout: Duration,
    pub primary_language: Language,
    pub secondary_language: Option<Language>,
    pub openai: Option<OpenAiSettings>,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Static,
            backend_timeout: Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
            primary_language: Language::En,
            secondary_language: Some(Language::Ar),
            openai: None,
        }
    }
}

impl TutorConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let backend = match env::var("ILM_BACKEND") {
            Ok(value) => parse_backend(&value)?,
            Err(_) => defaults.backend,
        };
        let backend_timeout = match env::var("ILM_BACKEND_TIMEOUT_MS") {
            Ok(value) => parse_timeout_ms(&value)?,
            Err(_) => defaults.backend_timeout,
        };
        let primary_language = match env::var("ILM_PRIMARY_LANGUAGE") {
            Ok(value) => parse_primary_language(&value)?,
            Err(_) => defaults.primary_language,
        };
        let secondary_language = match env::var("ILM_SECONDARY_LANGUAGE") {
            Ok(value) => parse_secondary_language(&value)?,
            Err(_) => defaults.secondary_language,
        };

        Ok(Self {
            backend,
            backend_timeout,
            primary_language,
            secondary_language,
            openai: OpenAiSettings::from_env(),
        })
    }
}

pub fn parse_backend(value: &str) -> Result<BackendKind> {
    match BackendKind::parse(value) {
        Some(kind) => Ok(kind),
        None => bail!("unknown backend `{}` (expected `static` or `openai`)", value.trim()),
    }
}

pub fn parse_timeout_ms(value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => bail!("backend timeout must be a positive number of milliseconds, got `{value}`"),
    }
}

pub fn parse_primary_language(value: &str) -> Result<Language> {
    let language = Language::from_optional_str(Some(value));
    if !language.is_known() {
        bail!("unsupported primary language `{}`", value.trim());
    }
    Ok(language)
}

/// `none` (or an empty value) disables the secondary block.
pub fn parse_secondary_language(value: &str) -> Result<Option<Language>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_primary_language(trimmed)
        .map(Some)
        .map_err(|_| anyhow::anyhow!("unsupported secondary language `{trimmed}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_values() {
        assert_eq!(parse_backend("OpenAI").unwrap(), BackendKind::OpenAi);
        assert!(parse_backend("cloud").is_err());

        assert_eq!(parse_timeout_ms("250").unwrap(), Duration::from_millis(250));
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("soon").is_err());

        assert_eq!(parse_primary_language("ar").unwrap(), Language::Ar);
        assert!(parse_primary_language("xx").is_err());

        assert_eq!(parse_secondary_language("none").unwrap(), None);
        assert_eq!(parse_secondary_language("").unwrap(), None);
        assert_eq!(parse_secondary_language("ur").unwrap(), Some(Language::Ur));
        assert!(parse_secondary_language("klingon").is_err());
    }
}
