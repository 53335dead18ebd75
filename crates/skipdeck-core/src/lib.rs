//! Skipdeck Core Library
//!
//! Core functionality for flagging sponsor segments in video transcripts,
//! extracting the keywords worth studying, and turning them into
//! translated flashcards.

pub mod cache;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod flashcards;
pub mod format;
pub mod interval;
pub mod keywords;
pub mod matcher;
pub mod pipeline;
pub mod provider;
pub mod source;
pub mod types;

// Re-export commonly used items at crate root
pub use cache::TranslationCache;
pub use detector::SponsorDetector;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{FetchError, MatcherError, ProviderError, Result, SkipdeckError};
pub use flashcards::{FlashcardBuilder, DEFAULT_TRANSLATION_CONCURRENCY};
pub use format::{
    format_interval, format_intervals_copyable, format_timestamp,
    format_transcript_with_timestamps,
};
pub use interval::TimeInterval;
pub use keywords::{ExtractorConfig, KeywordExtractor, DEFAULT_STOP_WORDS};
pub use matcher::{
    KeywordCueMatcher, SponsorMatcher, DEFAULT_SPONSOR_CUES, DEFAULT_SPONSOR_REASON,
};
pub use pipeline::AnalysisPipeline;
pub use provider::{
    translate_with_retry, HttpTranslator, IdentityTranslator, RetryPolicy, TranslationProvider,
};
pub use source::TranscriptProvider;
pub use types::{
    AnalysisReport, AnalysisRequest, Flashcard, KeywordCandidate, SponsorInterval, Transcript,
    TranscriptSegment,
};
