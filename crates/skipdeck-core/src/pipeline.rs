use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::detector::SponsorDetector;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SkipdeckError};
use crate::flashcards::FlashcardBuilder;
use crate::keywords::KeywordExtractor;
use crate::source::TranscriptProvider;
use crate::types::{AnalysisReport, AnalysisRequest, Transcript, TranscriptSegment};

/// The full analysis chain: sponsor detection plus keyword extraction
/// over one immutable transcript, then flashcard building.
pub struct AnalysisPipeline {
    detector: Arc<SponsorDetector>,
    extractor: Arc<KeywordExtractor>,
    builder: FlashcardBuilder,
}

impl AnalysisPipeline {
    pub fn new(
        detector: SponsorDetector,
        extractor: KeywordExtractor,
        builder: FlashcardBuilder,
    ) -> Self {
        Self {
            detector: Arc::new(detector),
            extractor: Arc::new(extractor),
            builder,
        }
    }

    /// Fetch the transcript for `request.url` and analyze it.
    ///
    /// A fetch failure aborts the run before any analysis happens; all
    /// later failures degrade to diagnostics inside the report instead.
    pub async fn analyze_url(
        &self,
        source: &dyn TranscriptProvider,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let transcript = source.fetch(&request.url).await?;
        self.analyze(request, transcript, cancel).await
    }

    /// Analyze an already-fetched transcript.
    ///
    /// Detection and extraction are pure over the shared segments and
    /// run in parallel. Translation follows, honoring `cancel`; a
    /// cancelled run still returns everything finished so far, with
    /// `cancelled` set on the report.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        transcript: Transcript,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let segments: Arc<[TranscriptSegment]> = transcript.into_segments().into();
        info!(
            request_id = %request.id,
            segments = segments.len(),
            target_lang = %request.target_lang,
            "starting transcript analysis"
        );

        let detector = Arc::clone(&self.detector);
        let detect_segments = Arc::clone(&segments);
        let detect_task = tokio::task::spawn_blocking(move || {
            let mut diagnostics = Diagnostics::new();
            let intervals = detector.detect(&detect_segments, &mut diagnostics);
            (intervals, diagnostics)
        });

        let extractor = Arc::clone(&self.extractor);
        let extract_segments = Arc::clone(&segments);
        let extract_task =
            tokio::task::spawn_blocking(move || extractor.extract(&extract_segments));

        let (detect_result, extract_result) = tokio::join!(detect_task, extract_task);
        let (sponsor_intervals, mut diagnostics) = detect_result
            .map_err(|err| SkipdeckError::Internal(format!("detection task failed: {err}")))?;
        let candidates = extract_result
            .map_err(|err| SkipdeckError::Internal(format!("extraction task failed: {err}")))?;

        let flashcards = self
            .builder
            .build(candidates, &request.target_lang, cancel, &mut diagnostics)
            .await;

        let cancelled = cancel.is_cancelled();
        info!(
            request_id = %request.id,
            sponsor_intervals = sponsor_intervals.len(),
            flashcards = flashcards.len(),
            diagnostics = diagnostics.len(),
            cancelled,
            "analysis finished"
        );

        Ok(AnalysisReport {
            request_id: request.id,
            sponsor_intervals,
            flashcards,
            diagnostics,
            cancelled,
        })
    }
}
