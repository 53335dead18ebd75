use thiserror::Error;

/// Transcript retrieval failures. These surface to the caller and the
/// pipeline does not run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("No video found for {url}")]
    NotFound { url: String },

    #[error("No usable transcript for {url}: {reason}")]
    NoTranscript { url: String, reason: String },

    #[error("Transcript provider rate-limited while fetching {url}")]
    RateLimited { url: String },

    #[error("Network failure while fetching {url}: {reason}")]
    Network { url: String, reason: String },
}

/// A single matcher failed on a single segment. Isolated: recorded as a
/// diagnostic, never fatal to detection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Matcher '{matcher}' failed: {reason}")]
pub struct MatcherError {
    pub matcher: String,
    pub reason: String,
}

impl MatcherError {
    pub fn new(matcher: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            reason: reason.into(),
        }
    }
}

/// Translation provider failures, split into transient conditions (worth
/// retrying with backoff) and permanent ones (skip the candidate).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Translation timed out for '{term}'")]
    Timeout { term: String },

    #[error("Translation provider rate-limited on '{term}'")]
    RateLimited { term: String },

    #[error("Network failure translating '{term}': {reason}")]
    Network { term: String, reason: String },

    #[error("Target language '{lang}' is not supported")]
    UnsupportedLanguage { lang: String },

    #[error("Provider rejected malformed term '{term}'")]
    MalformedTerm { term: String },

    #[error("Provider rejected '{term}': {reason}")]
    Rejected { term: String, reason: String },
}

impl ProviderError {
    /// Transient errors are retried with exponential backoff; permanent
    /// ones fail the candidate on the first attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout { .. }
                | ProviderError::RateLimited { .. }
                | ProviderError::Network { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum SkipdeckError {
    #[error("Transcript fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid transcript segment: {reason}")]
    InvalidSegment { reason: String },

    #[error("Invalid interval [{start}, {end})")]
    InvalidInterval { start: f64, end: f64 },

    #[error("Sponsor interval requires a non-empty reason")]
    EmptyReason,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SkipdeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        let transient = [
            ProviderError::Timeout {
                term: "hola".into(),
            },
            ProviderError::RateLimited {
                term: "hola".into(),
            },
            ProviderError::Network {
                term: "hola".into(),
                reason: "connection reset".into(),
            },
        ];
        for err in transient {
            assert!(err.is_transient(), "{err} should be transient");
        }

        let permanent = [
            ProviderError::UnsupportedLanguage { lang: "xx".into() },
            ProviderError::MalformedTerm { term: "".into() },
            ProviderError::Rejected {
                term: "hola".into(),
                reason: "quota exceeded for account".into(),
            },
        ];
        for err in permanent {
            assert!(!err.is_transient(), "{err} should be permanent");
        }
    }

    #[test]
    fn fetch_errors_carry_the_url() {
        let err = FetchError::NoTranscript {
            url: "https://example.com/watch?v=abc".into(),
            reason: "captions disabled".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("https://example.com/watch?v=abc"));
        assert!(rendered.contains("captions disabled"));
    }

    #[test]
    fn provider_errors_carry_the_term() {
        let err = ProviderError::Timeout {
            term: "ejemplo".into(),
        };
        assert!(err.to_string().contains("ejemplo"));
    }

    #[test]
    fn fetch_error_converts_into_crate_error() {
        let err: SkipdeckError = FetchError::NotFound {
            url: "file.json".into(),
        }
        .into();
        assert!(matches!(err, SkipdeckError::Fetch(_)));
    }
}
