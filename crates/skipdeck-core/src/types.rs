use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::diagnostics::Diagnostics;
use crate::error::SkipdeckError;
use crate::interval::TimeInterval;

/// One timestamped unit of transcript text. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    start: f64,
    duration: f64,
    text: String,
}

impl TranscriptSegment {
    /// `start` must be finite and non-negative, `duration` finite and
    /// strictly positive, `text` non-blank.
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Result<Self, SkipdeckError> {
        let text = text.into();
        if !start.is_finite() || start < 0.0 {
            return Err(SkipdeckError::InvalidSegment {
                reason: format!("start must be a non-negative number, got {start}"),
            });
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SkipdeckError::InvalidSegment {
                reason: format!("duration must be a positive number, got {duration}"),
            });
        }
        if text.trim().is_empty() {
            return Err(SkipdeckError::InvalidSegment {
                reason: "text must not be empty".into(),
            });
        }
        Ok(Self {
            start,
            duration,
            text,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased text, the form every matcher receives.
    pub fn normalized_text(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn interval(&self) -> TimeInterval {
        // start >= 0 and duration > 0 hold by construction.
        TimeInterval::from_validated(self.start, self.end())
    }
}

/// An ordered sequence of segments. Construction establishes the
/// start-ascending order; overlapping segments are legal source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(mut segments: Vec<TranscriptSegment>) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { segments }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<TranscriptSegment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the latest-running segment, in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.end()).fold(0.0, f64::max)
    }
}

/// A merged time range flagged as promotional content. Never overlaps
/// another interval in the same detection result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SponsorInterval {
    interval: TimeInterval,
    reason: String,
}

impl SponsorInterval {
    pub fn new(start: f64, end: f64, reason: impl Into<String>) -> Result<Self, SkipdeckError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(SkipdeckError::EmptyReason);
        }
        Ok(Self {
            interval: TimeInterval::new(start, end)?,
            reason,
        })
    }

    /// Detector-internal constructor: bounds and reason were already
    /// validated by the merge walk.
    pub(crate) fn from_merged(interval: TimeInterval, reason: String) -> Self {
        Self { interval, reason }
    }

    pub fn start(&self) -> f64 {
        self.interval.start()
    }

    pub fn end(&self) -> f64 {
        self.interval.end()
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A case-normalized term with every segment that contributed it and the
/// combined relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCandidate {
    term: String,
    source_segments: BTreeSet<usize>,
    score: f64,
}

impl KeywordCandidate {
    pub fn new(
        term: impl Into<String>,
        source_segments: impl IntoIterator<Item = usize>,
        score: f64,
    ) -> Self {
        Self {
            term: term.into().to_lowercase(),
            source_segments: source_segments.into_iter().collect(),
            score,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn into_term(self) -> String {
        self.term
    }

    pub fn source_segments(&self) -> &BTreeSet<usize> {
        &self.source_segments
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

/// A front/back study card. Uniqueness key is `(front, target_lang)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    front: String,
    back: String,
    target_lang: String,
}

impl Flashcard {
    pub fn new(
        front: impl Into<String>,
        back: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// True when no real translation happened (`back == front`). Such a
    /// card is still emitted so the caller can warn about it.
    pub fn is_untranslated(&self) -> bool {
        self.front == self.back
    }
}

/// Everything the caller asks for in one run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub id: Uuid,
    pub url: String,
    pub target_lang: String,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            target_lang: target_lang.into(),
        }
    }
}

/// Everything one run produced. Partial results plus diagnostics are a
/// normal outcome, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub sponsor_intervals: Vec<SponsorInterval>,
    pub flashcards: Vec<Flashcard>,
    pub diagnostics: Diagnostics,
    pub cancelled: bool,
}
