use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProviderError;

/// Turns a term into its translation for a target language.
///
/// Implementations classify their failures through [`ProviderError`];
/// transient conditions are retried by [`translate_with_retry`],
/// permanent ones make the caller skip the term.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, term: &str, target_lang: &str) -> Result<String, ProviderError>;
}

/// Bounds for retrying transient provider failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Call the provider, retrying transient failures with exponential
/// backoff until `policy.max_attempts` is exhausted.
///
/// Permanent errors return immediately. Cancellation is honored at the
/// backoff points: an in-flight provider call is left to finish, but no
/// further attempt starts once `cancel` fires, and the pending error is
/// returned as-is.
pub async fn translate_with_retry(
    provider: &dyn TranslationProvider,
    term: &str,
    target_lang: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<String, ProviderError> {
    let mut attempt = 0u32;
    let mut backoff = policy.initial_backoff;

    loop {
        attempt += 1;
        match provider.translate(term, target_lang).await {
            Ok(translation) => {
                if attempt > 1 {
                    debug!(term, attempt, "translation succeeded after retry");
                }
                return Ok(translation);
            }
            Err(err)
                if err.is_transient()
                    && attempt < policy.max_attempts
                    && !cancel.is_cancelled() =>
            {
                warn!(
                    term,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transient translation failure, backing off"
                );
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = cancel.cancelled() => return Err(err),
                }
                backoff = (backoff * 2).min(policy.max_backoff);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    source_lang: String,
    timeout: Duration,
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            source_lang: "auto".into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[async_trait]
impl TranslationProvider for HttpTranslator {
    async fn translate(&self, term: &str, target_lang: &str) -> Result<String, ProviderError> {
        if term.trim().is_empty() {
            return Err(ProviderError::MalformedTerm {
                term: term.to_string(),
            });
        }

        let mut body = serde_json::json!({
            "q": term,
            "source": self.source_lang,
            "target": target_lang,
            "format": "text",
        });
        if let Some(api_key) = &self.api_key {
            body["api_key"] = serde_json::Value::String(api_key.clone());
        }

        let response = self
            .client
            .post(format!("{}/translate", self.endpoint.trim_end_matches('/')))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::Timeout {
                        term: term.to_string(),
                    }
                } else {
                    ProviderError::Network {
                        term: term.to_string(),
                        reason: err.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                term: term.to_string(),
            });
        }
        if status == reqwest::StatusCode::BAD_REQUEST {
            // LibreTranslate answers 400 both for unknown languages and
            // for rejected input; the body tells them apart.
            let detail = response.text().await.unwrap_or_default();
            if detail.to_lowercase().contains("language") {
                return Err(ProviderError::UnsupportedLanguage {
                    lang: target_lang.to_string(),
                });
            }
            return Err(ProviderError::Rejected {
                term: term.to_string(),
                reason: detail,
            });
        }
        if status.is_server_error() {
            return Err(ProviderError::Network {
                term: term.to_string(),
                reason: format!("server returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Rejected {
                term: term.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }

        let payload: TranslateResponse =
            response.json().await.map_err(|err| ProviderError::Rejected {
                term: term.to_string(),
                reason: format!("malformed provider response: {err}"),
            })?;
        Ok(payload.translated_text)
    }
}

/// Echoes every term back untranslated. Stands in when no translation
/// endpoint is configured; each resulting card reports
/// [`is_untranslated`](crate::types::Flashcard::is_untranslated).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl TranslationProvider for IdentityTranslator {
    async fn translate(&self, term: &str, _target_lang: &str) -> Result<String, ProviderError> {
        Ok(term.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    struct FlakyTranslator {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    impl FlakyTranslator {
        fn failing_first(failures_before_success: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures_before_success,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for FlakyTranslator {
        async fn translate(&self, term: &str, _lang: &str) -> Result<String, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(ProviderError::Timeout {
                    term: term.to_string(),
                })
            } else {
                Ok(format!("{term}-translated"))
            }
        }
    }

    struct UnsupportedTranslator {
        calls: AtomicU32,
    }

    #[async_trait]
    impl TranslationProvider for UnsupportedTranslator {
        async fn translate(&self, _term: &str, lang: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::UnsupportedLanguage {
                lang: lang.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let provider = FlakyTranslator::failing_first(2);
        let result = translate_with_retry(
            &provider,
            "lesson",
            "fr",
            &fast_policy(3),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.unwrap(), "lesson-translated");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let provider = FlakyTranslator::failing_first(u32::MAX);
        let result = translate_with_retry(
            &provider,
            "lesson",
            "fr",
            &fast_policy(2),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(ProviderError::Timeout { .. })));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_fail_fast() {
        let provider = UnsupportedTranslator {
            calls: AtomicU32::new(0),
        };
        let result = translate_with_retry(
            &provider,
            "lesson",
            "tlh",
            &fast_policy(5),
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(ProviderError::UnsupportedLanguage { .. })
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_further_attempts() {
        let provider = FlakyTranslator::failing_first(u32::MAX);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result =
            translate_with_retry(&provider, "lesson", "fr", &fast_policy(5), &cancel).await;

        assert!(matches!(result, Err(ProviderError::Timeout { .. })));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn identity_translator_echoes() {
        let back = IdentityTranslator.translate("lesson", "fr").await.unwrap();
        assert_eq!(back, "lesson");
    }

    #[tokio::test]
    async fn http_translator_rejects_blank_terms_without_io() {
        let translator = HttpTranslator::new("http://127.0.0.1:0");
        let result = translator.translate("   ", "fr").await;
        assert!(matches!(result, Err(ProviderError::MalformedTerm { .. })));
    }
}
