//! Translation Provider port.
//!
//! The concrete provider (Google Translate web endpoint) lives in the
//! `ttb-google` adapter crate; the command handlers only see this trait, so
//! failures arrive as values to pattern-match on, and tests can substitute a
//! fake provider.

use async_trait::async_trait;

use crate::domain::LangCode;

/// Failure at the translation boundary.
///
/// The variants exist for the console log; end users only ever see a generic
/// notice built by the caller.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("unsupported target language: {0}")]
    UnsupportedTarget(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("provider returned an empty result")]
    EmptyResult,
}

/// One-shot passthrough calls: no retries, no caching, no rate limiting.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`, auto-detecting the source language.
    /// Returns the provider output verbatim.
    async fn translate(&self, text: &str, target: &LangCode)
        -> Result<String, TranslateError>;

    /// Best-guess source language of `text`.
    async fn detect(&self, text: &str) -> Result<LangCode, TranslateError>;

    /// The provider's supported-language enumeration as (code, display name)
    /// pairs. Consulted once at startup to build the [`LanguageTable`].
    fn supported_languages(&self) -> &'static [(&'static str, &'static str)];
}

/// Read-only code → display-name table, built once at startup and shared for
/// the process lifetime.
#[derive(Clone, Debug)]
pub struct LanguageTable {
    entries: Vec<(String, String)>,
}

impl LanguageTable {
    pub fn new(languages: &[(&str, &str)]) -> Self {
        let mut entries: Vec<(String, String)> = languages
            .iter()
            .map(|(code, name)| (code.to_lowercase(), (*name).to_string()))
            .collect();
        entries.sort();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &LangCode) -> bool {
        self.entries.iter().any(|(c, _)| c == code.as_str())
    }

    pub fn name_of(&self, code: &LangCode) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code.as_str())
            .map(|(_, name)| name.as_str())
    }

    /// Entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Split a comma-separated code list, trimming whitespace around each code.
/// Empty input (or input that is only separators) yields no codes.
pub fn parse_code_list(raw: &str) -> Vec<LangCode> {
    raw.split(',')
        .map(LangCode::new)
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_is_normalized() {
        let table = LanguageTable::new(&[("EN", "English"), ("fr", "French")]);
        assert_eq!(table.len(), 2);
        assert!(table.contains(&LangCode::new(" EN ")));
        assert_eq!(table.name_of(&LangCode::new("fr")), Some("French"));
        assert_eq!(table.name_of(&LangCode::new("xx")), None);
    }

    #[test]
    fn table_iterates_in_code_order() {
        let table = LanguageTable::new(&[("fr", "French"), ("de", "German"), ("en", "English")]);
        let codes: Vec<&str> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(codes, vec!["de", "en", "fr"]);
    }

    #[test]
    fn code_list_trims_each_entry() {
        let codes = parse_code_list("en, xx ,fr");
        let codes: Vec<&str> = codes.iter().map(LangCode::as_str).collect();
        assert_eq!(codes, vec!["en", "xx", "fr"]);
    }

    #[test]
    fn empty_code_list_yields_no_codes() {
        assert!(parse_code_list("").is_empty());
        assert!(parse_code_list(" , ,").is_empty());
    }
}
