//! Google Translate adapter.
//!
//! Talks to the public web endpoint (`client=gtx`): no API key,
//! single-attempt requests, auto-detected source language.

use async_trait::async_trait;

use ttb_core::domain::LangCode;
use ttb_core::translate::{TranslateError, Translator};

mod languages;

pub use languages::SUPPORTED_LANGUAGES;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Clone, Debug)]
pub struct GoogleTranslator {
    http: reqwest::Client,
}

impl GoogleTranslator {
    pub fn new(timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");
        Self { http }
    }

    async fn fetch(&self, text: &str, target: &str) -> Result<serde_json::Value, TranslateError> {
        let resp = self
            .http
            .get(ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| TranslateError::Provider(format!("request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(TranslateError::Provider(format!(
                "status {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| TranslateError::Provider(format!("json error: {e}")))
    }

    fn is_supported(target: &LangCode) -> bool {
        SUPPORTED_LANGUAGES
            .iter()
            .any(|(code, _)| code.eq_ignore_ascii_case(target.as_str()))
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        target: &LangCode,
    ) -> Result<String, TranslateError> {
        if !Self::is_supported(target) {
            return Err(TranslateError::UnsupportedTarget(target.to_string()));
        }
        let body = self.fetch(text, target.as_str()).await?;
        parse_translation(&body)
    }

    async fn detect(&self, text: &str) -> Result<LangCode, TranslateError> {
        // `dt=t` responses carry the detected source language either way;
        // translating to English is the cheapest probe.
        let body = self.fetch(text, "en").await?;
        parse_detected(&body)
    }

    fn supported_languages(&self) -> &'static [(&'static str, &'static str)] {
        SUPPORTED_LANGUAGES
    }
}

/// The endpoint answers with positional arrays:
/// `[[["<translated>", "<source>", ...], ...], null, "<detected>", ...]`.
/// The translation is the concatenation of the segment heads.
fn parse_translation(body: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or(TranslateError::EmptyResult)?;

    let mut out = String::new();
    for seg in segments {
        if let Some(piece) = seg.get(0).and_then(|v| v.as_str()) {
            out.push_str(piece);
        }
    }

    if out.trim().is_empty() {
        return Err(TranslateError::EmptyResult);
    }
    Ok(out)
}

fn parse_detected(body: &serde_json::Value) -> Result<LangCode, TranslateError> {
    let code = body
        .get(2)
        .and_then(|v| v.as_str())
        .ok_or(TranslateError::EmptyResult)?;

    if code.trim().is_empty() {
        return Err(TranslateError::EmptyResult);
    }
    Ok(LangCode::new(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translation_concatenates_segment_heads() {
        let body = json!([
            [
                ["Bonjour le monde. ", "Hello world. ", null, null],
                ["Comment ça va ?", "How are you?", null, null]
            ],
            null,
            "en"
        ]);
        assert_eq!(
            parse_translation(&body).unwrap(),
            "Bonjour le monde. Comment ça va ?"
        );
    }

    #[test]
    fn empty_translation_is_an_error() {
        let body = json!([[], null, "en"]);
        assert!(matches!(
            parse_translation(&body),
            Err(TranslateError::EmptyResult)
        ));

        let body = json!({ "unexpected": true });
        assert!(parse_translation(&body).is_err());
    }

    #[test]
    fn detection_reads_the_source_language() {
        let body = json!([[["Hello", "Bonjour", null, null]], null, "fr"]);
        assert_eq!(parse_detected(&body).unwrap().as_str(), "fr");
    }

    #[test]
    fn detection_without_language_is_an_error() {
        let body = json!([[["Hello", "Bonjour", null, null]], null, null]);
        assert!(parse_detected(&body).is_err());
    }

    #[test]
    fn known_codes_are_supported() {
        assert!(GoogleTranslator::is_supported(&LangCode::new("fr")));
        assert!(GoogleTranslator::is_supported(&LangCode::new("ZH-CN")));
        assert!(!GoogleTranslator::is_supported(&LangCode::new("xx")));
    }

    #[test]
    fn language_table_has_no_duplicate_codes() {
        let mut codes: Vec<&str> = SUPPORTED_LANGUAGES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), SUPPORTED_LANGUAGES.len());
    }
}
