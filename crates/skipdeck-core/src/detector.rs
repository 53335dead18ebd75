use tracing::warn;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::interval::TimeInterval;
use crate::matcher::{KeywordCueMatcher, SponsorMatcher};
use crate::types::{SponsorInterval, TranscriptSegment};

/// Runs every registered matcher over every segment and merges the hits
/// into non-overlapping sponsor intervals.
pub struct SponsorDetector {
    matchers: Vec<Box<dyn SponsorMatcher>>,
}

impl SponsorDetector {
    pub fn new(matchers: Vec<Box<dyn SponsorMatcher>>) -> Self {
        Self { matchers }
    }

    /// Detector with only the stock keyword-cue matcher registered.
    pub fn with_default_cues() -> Self {
        Self::new(vec![Box::new(KeywordCueMatcher::default())])
    }

    /// Matchers run in registration order; that order breaks ties between
    /// hits that start at the same time.
    pub fn push_matcher(&mut self, matcher: Box<dyn SponsorMatcher>) {
        self.matchers.push(matcher);
    }

    /// Flag promotional ranges in `segments`.
    ///
    /// A matcher error downgrades to "no match" for that one segment and
    /// lands in `diagnostics`; detection always runs to completion. The
    /// returned intervals are sorted by start and pairwise disjoint.
    pub fn detect(
        &self,
        segments: &[TranscriptSegment],
        diagnostics: &mut Diagnostics,
    ) -> Vec<SponsorInterval> {
        let mut hits: Vec<(TimeInterval, String)> = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            let text = segment.normalized_text();
            for matcher in &self.matchers {
                match matcher.check(&text) {
                    Ok(Some(reason)) if !reason.trim().is_empty() => {
                        hits.push((segment.interval(), reason));
                    }
                    Ok(Some(_)) => {
                        diagnostics.record(Diagnostic::MatcherFailed {
                            matcher: matcher.name().to_string(),
                            segment_index: index,
                            reason: "matcher returned an empty reason".into(),
                        });
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(
                            matcher = matcher.name(),
                            segment = index,
                            error = %err,
                            "matcher failed, treating segment as no match"
                        );
                        diagnostics.record(Diagnostic::MatcherFailed {
                            matcher: matcher.name().to_string(),
                            segment_index: index,
                            reason: err.reason,
                        });
                    }
                }
            }
        }

        // Stable sort keeps matcher registration order for equal starts.
        hits.sort_by(|a, b| a.0.start().total_cmp(&b.0.start()));
        merge_hits(hits)
    }
}

/// Collapse start-sorted hits into disjoint intervals. Adjacent hits fold
/// together while the next one starts at or before the current end; the
/// merged reason lists each distinct contributing reason once, in order
/// of first appearance.
fn merge_hits(hits: Vec<(TimeInterval, String)>) -> Vec<SponsorInterval> {
    let mut iter = hits.into_iter();
    let Some((first, first_reason)) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    let mut current = first;
    let mut reasons = vec![first_reason];

    for (interval, reason) in iter {
        if current.overlaps_or_touches(&interval) {
            current = current.merge(&interval);
            if !reasons.contains(&reason) {
                reasons.push(reason);
            }
        } else {
            merged.push(SponsorInterval::from_merged(current, reasons.join(", ")));
            current = interval;
            reasons = vec![reason];
        }
    }
    merged.push(SponsorInterval::from_merged(current, reasons.join(", ")));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatcherError;
    use crate::matcher::DEFAULT_SPONSOR_REASON;

    fn segment(start: f64, duration: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, duration, text).unwrap()
    }

    struct FailingMatcher;

    impl SponsorMatcher for FailingMatcher {
        fn name(&self) -> &str {
            "failing"
        }

        fn check(&self, _text: &str) -> Result<Option<String>, MatcherError> {
            Err(MatcherError::new("failing", "backend offline"))
        }
    }

    struct EmptyReasonMatcher;

    impl SponsorMatcher for EmptyReasonMatcher {
        fn name(&self) -> &str {
            "empty-reason"
        }

        fn check(&self, _text: &str) -> Result<Option<String>, MatcherError> {
            Ok(Some("   ".into()))
        }
    }

    #[test]
    fn flags_only_the_sponsored_segment() {
        let segments = vec![
            segment(0.0, 3.0, "Welcome back to the channel"),
            segment(30.0, 6.0, "This video is sponsored by Example, use code SAVE10"),
            segment(60.0, 4.0, "Now let's get into the lesson"),
        ];
        let mut diagnostics = Diagnostics::new();
        let intervals =
            SponsorDetector::with_default_cues().detect(&segments, &mut diagnostics);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start(), 30.0);
        assert_eq!(intervals[0].end(), 36.0);
        assert_eq!(intervals[0].reason(), DEFAULT_SPONSOR_REASON);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn touching_hits_merge_into_one_interval() {
        let segments = vec![
            segment(10.0, 5.0, "sponsored message part one"),
            segment(15.0, 5.0, "sponsored message part two"),
        ];
        let mut diagnostics = Diagnostics::new();
        let intervals =
            SponsorDetector::with_default_cues().detect(&segments, &mut diagnostics);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start(), 10.0);
        assert_eq!(intervals[0].end(), 20.0);
    }

    #[test]
    fn merged_reason_lists_each_contributor_once() {
        let mut detector = SponsorDetector::with_default_cues();
        detector.push_matcher(Box::new(KeywordCueMatcher::new(
            ["patreon"],
            "Channel plug",
        )));

        let segments = vec![
            segment(10.0, 5.0, "sponsored by example"),
            segment(15.0, 5.0, "support us on patreon, use code TEN"),
            segment(20.0, 5.0, "seriously, patreon"),
        ];
        let mut diagnostics = Diagnostics::new();
        let intervals = detector.detect(&segments, &mut diagnostics);

        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].start(), 10.0);
        assert_eq!(intervals[0].end(), 25.0);
        assert_eq!(
            intervals[0].reason(),
            format!("{DEFAULT_SPONSOR_REASON}, Channel plug")
        );
    }

    #[test]
    fn disjoint_hits_stay_separate() {
        let segments = vec![
            segment(10.0, 5.0, "sponsored break"),
            segment(40.0, 5.0, "another sponsored break"),
        ];
        let mut diagnostics = Diagnostics::new();
        let intervals =
            SponsorDetector::with_default_cues().detect(&segments, &mut diagnostics);

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].end(), 15.0);
        assert_eq!(intervals[1].start(), 40.0);
    }

    #[test]
    fn failing_matcher_is_recorded_and_skipped() {
        let mut detector = SponsorDetector::with_default_cues();
        detector.push_matcher(Box::new(FailingMatcher));

        let segments = vec![
            segment(0.0, 3.0, "plain intro"),
            segment(30.0, 6.0, "sponsored by example"),
        ];
        let mut diagnostics = Diagnostics::new();
        let intervals = detector.detect(&segments, &mut diagnostics);

        // Detection survived; one diagnostic per segment the bad matcher saw.
        assert_eq!(intervals.len(), 1);
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(
            diagnostics.entries()[0],
            Diagnostic::MatcherFailed { segment_index: 0, .. }
        ));
    }

    #[test]
    fn empty_reason_counts_as_matcher_failure() {
        let detector = SponsorDetector::new(vec![Box::new(EmptyReasonMatcher)]);
        let segments = vec![segment(0.0, 3.0, "anything")];
        let mut diagnostics = Diagnostics::new();
        let intervals = detector.detect(&segments, &mut diagnostics);

        assert!(intervals.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn no_matchers_means_no_intervals() {
        let detector = SponsorDetector::new(Vec::new());
        let segments = vec![segment(30.0, 6.0, "sponsored by example")];
        let mut diagnostics = Diagnostics::new();
        assert!(detector.detect(&segments, &mut diagnostics).is_empty());
    }
}
