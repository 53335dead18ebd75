use crate::error::MatcherError;

/// Cue phrases flagged by the stock matcher.
pub const DEFAULT_SPONSOR_CUES: [&str; 4] =
    ["sponsored", "use code", "promo code", "discount code"];

/// Reason attached to segments matched by the stock cue list.
pub const DEFAULT_SPONSOR_REASON: &str = "Sponsor cue words";

/// A detection rule applied to each transcript segment.
///
/// Implementations receive the segment text already lowercased and
/// answer with `Ok(Some(reason))` on a hit, `Ok(None)` on a miss. An
/// `Err` counts as a miss for that segment; the detector records it and
/// keeps going.
pub trait SponsorMatcher: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &str;

    fn check(&self, text: &str) -> Result<Option<String>, MatcherError>;
}

/// Case-insensitive substring matcher over a configurable cue list.
#[derive(Debug, Clone)]
pub struct KeywordCueMatcher {
    cues: Vec<String>,
    reason: String,
}

impl KeywordCueMatcher {
    /// Cues are lowercased; blank cues are dropped because an empty
    /// needle would match every segment.
    pub fn new(
        cues: impl IntoIterator<Item = impl Into<String>>,
        reason: impl Into<String>,
    ) -> Self {
        let cues = cues
            .into_iter()
            .map(|cue| cue.into().trim().to_lowercase())
            .filter(|cue| !cue.is_empty())
            .collect();
        Self {
            cues,
            reason: reason.into(),
        }
    }

    pub fn cues(&self) -> &[String] {
        &self.cues
    }
}

impl Default for KeywordCueMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SPONSOR_CUES, DEFAULT_SPONSOR_REASON)
    }
}

impl SponsorMatcher for KeywordCueMatcher {
    fn name(&self) -> &str {
        "keyword-cue"
    }

    fn check(&self, text: &str) -> Result<Option<String>, MatcherError> {
        if self.cues.iter().any(|cue| text.contains(cue.as_str())) {
            Ok(Some(self.reason.clone()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cues_match_sponsor_read() {
        let matcher = KeywordCueMatcher::default();
        let hit = matcher
            .check("this video is sponsored by example, use code save10")
            .unwrap();
        assert_eq!(hit.as_deref(), Some(DEFAULT_SPONSOR_REASON));
    }

    #[test]
    fn non_sponsor_text_is_a_miss() {
        let matcher = KeywordCueMatcher::default();
        assert_eq!(matcher.check("now let's get into the lesson").unwrap(), None);
    }

    #[test]
    fn cues_are_normalized_at_construction() {
        let matcher = KeywordCueMatcher::new(["  CHECK OUT our merch "], "Merch plug");
        let hit = matcher.check("don't forget to check out our merch!").unwrap();
        assert_eq!(hit.as_deref(), Some("Merch plug"));
    }

    #[test]
    fn blank_cues_are_dropped() {
        let matcher = KeywordCueMatcher::new(["", "   "], "anything");
        assert!(matcher.cues().is_empty());
        assert_eq!(matcher.check("any text at all").unwrap(), None);
    }
}
