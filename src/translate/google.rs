//! Google Translate web endpoint client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use super::lang::service_lang_code;
use super::service::Translator;
use crate::error::{Error, Result, TranslateError};

/// Public endpoint used by the browser widget.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`GoogleTranslator`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Endpoint URL
    pub endpoint: String,

    /// Source language code, `auto` to let the service detect it
    pub source_lang: String,

    /// Timeout for one request
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl GoogleConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the source language.
    pub fn with_source_lang(mut self, lang: impl Into<String>) -> Self {
        self.source_lang = lang.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            source_lang: "auto".to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("docxlate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Client for the Google Translate web endpoint.
///
/// The underlying connection pool is shared by all threads.
///
/// ```no_run
/// use docxlate::{GoogleTranslator, Translator};
///
/// let translator = GoogleTranslator::new()?;
/// let text = translator.translate("Good morning", "de")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    config: GoogleConfig,
}

impl GoogleTranslator {
    /// Create a client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(GoogleConfig::default())
    }

    /// Create a client with a custom configuration.
    pub fn with_config(config: GoogleConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(Error::Config("translation endpoint is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }
}

impl Translator for GoogleTranslator {
    fn translate(
        &self,
        text: &str,
        target_lang: &str,
    ) -> std::result::Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        let target = service_lang_code(target_lang);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_lang.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| TranslateError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(TranslateError::RateLimited);
        }
        if !status.is_success() {
            return Err(TranslateError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| TranslateError::Network(e.to_string()))?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body is a nested array whose first element lists sentences as
/// `[translated, original, ...]`.
fn parse_response(body: &str) -> std::result::Result<String, TranslateError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslateError::MalformedResponse(e.to_string()))?;

    let sentences = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::MalformedResponse("missing sentence list".to_string()))?;

    let mut translated = String::new();
    let mut found = false;
    for sentence in sentences {
        if let Some(segment) = sentence.get(0).and_then(Value::as_str) {
            translated.push_str(segment);
            found = true;
        }
    }

    if !found {
        return Err(TranslateError::MalformedResponse(
            "no translated segments".to_string(),
        ));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_joins_sentences() {
        let body = r#"[[["Bonjour le monde. ","Hello world. ",null,null,10],["Ça va?","How are you?",null,null,3]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "Bonjour le monde. Ça va?");
    }

    #[test]
    fn test_parse_response_malformed() {
        assert!(matches!(
            parse_response("<html>blocked</html>"),
            Err(TranslateError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(r#"{"error":"x"}"#),
            Err(TranslateError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response("[[],null,\"en\"]"),
            Err(TranslateError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_config_builder() {
        let config = GoogleConfig::new()
            .with_endpoint("http://localhost:9/translate")
            .with_source_lang("en")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.endpoint, "http://localhost:9/translate");
        assert_eq!(config.source_lang, "en");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.user_agent.starts_with("docxlate/"));
    }

    #[test]
    fn test_empty_endpoint_is_config_error() {
        let result = GoogleTranslator::with_config(GoogleConfig::new().with_endpoint(" "));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_input_is_rejected_without_request() {
        let translator =
            GoogleTranslator::with_config(GoogleConfig::new().with_endpoint("http://127.0.0.1:9/"))
                .unwrap();
        assert_eq!(
            translator.translate("   ", "fr"),
            Err(TranslateError::EmptyInput)
        );
        assert_eq!(translator.name(), "google");
    }
}
