use std::collections::{BTreeSet, HashMap, HashSet};

use crate::types::{KeywordCandidate, TranscriptSegment};

/// Function words and transcript filler excluded from candidate terms.
/// Everything here is at least three characters; shorter tokens are
/// already dropped by the length filter.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "about", "all", "and", "any", "are", "back", "been", "but", "can", "come",
    "could", "did", "does", "down", "for", "from", "get", "going", "gonna",
    "got", "had", "has", "have", "her", "here", "him", "his", "how", "into",
    "just", "know", "let", "like", "make", "many", "more", "most", "much",
    "not", "now", "off", "okay", "one", "only", "other", "our", "out", "over",
    "really", "said", "say", "see", "she", "some", "such", "take", "than",
    "that", "the", "their", "them", "then", "there", "they", "this", "time",
    "too", "two", "use", "very", "want", "was", "way", "well", "were", "what",
    "when", "which", "who", "will", "with", "would", "yeah", "you", "your",
];

/// Tuning knobs for [`KeywordExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Tokens with fewer characters than this are dropped.
    pub min_token_len: usize,
    /// Lowercased words excluded from candidates.
    pub stop_words: HashSet<String>,
    /// Keep only the highest-ranked candidates. `None` keeps all.
    pub top_k: Option<usize>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            top_k: None,
        }
    }
}

/// Ranks transcript terms by frequency weighted against segment length,
/// so a mention inside a short segment counts for more than one buried
/// in a long segment.
#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    config: ExtractorConfig,
}

impl KeywordExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract ranked keyword candidates from `segments`.
    ///
    /// Each occurrence of a term contributes `1 / segment_token_count`
    /// to its score, summed over the whole transcript. Every extra
    /// occurrence adds a positive amount, so more frequent terms never
    /// rank below rarer ones from the same segments. Ordering is score
    /// descending, then term ascending, which makes the result fully
    /// deterministic.
    pub fn extract(&self, segments: &[TranscriptSegment]) -> Vec<KeywordCandidate> {
        let mut table: HashMap<String, (BTreeSet<usize>, f64)> = HashMap::new();

        for (index, segment) in segments.iter().enumerate() {
            let tokens = tokenize(segment.text());
            if tokens.is_empty() {
                continue;
            }
            // Weight against the full token count, including the tokens
            // filtered out below, so segment verbosity is what matters.
            let weight = 1.0 / tokens.len() as f64;
            for token in tokens {
                if token.chars().count() < self.config.min_token_len {
                    continue;
                }
                if self.config.stop_words.contains(&token) {
                    continue;
                }
                let entry = table.entry(token).or_insert_with(|| (BTreeSet::new(), 0.0));
                entry.0.insert(index);
                entry.1 += weight;
            }
        }

        let mut candidates: Vec<KeywordCandidate> = table
            .into_iter()
            .map(|(term, (sources, score))| KeywordCandidate::new(term, sources, score))
            .collect();
        candidates.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then_with(|| a.term().cmp(b.term()))
        });
        if let Some(k) = self.config.top_k {
            candidates.truncate(k);
        }
        candidates
    }
}

/// Split on non-alphanumeric boundaries and lowercase. `"use code SAVE10"`
/// becomes `["use", "code", "save10"]`.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, 5.0, text).unwrap()
    }

    #[test]
    fn tokenize_splits_and_lowercases() {
        assert_eq!(
            tokenize("Don't forget: use code SAVE10!"),
            vec!["don", "t", "forget", "use", "code", "save10"]
        );
    }

    #[test]
    fn stop_words_and_short_tokens_are_dropped() {
        let candidates = KeywordExtractor::default()
            .extract(&[segment(0.0, "Now let's get into the lesson")]);
        let terms: Vec<&str> = candidates.iter().map(|c| c.term()).collect();
        assert_eq!(terms, vec!["lesson"]);
    }

    #[test]
    fn repeated_terms_outrank_single_mentions() {
        let candidates = KeywordExtractor::default().extract(&[
            segment(0.0, "gradient descent minimizes loss"),
            segment(10.0, "gradient updates follow the gradient"),
        ]);
        assert_eq!(candidates[0].term(), "gradient");
        assert!(candidates[0].score() > candidates[1].score());
    }

    #[test]
    fn duplicate_terms_merge_and_accumulate_sources() {
        let candidates = KeywordExtractor::default().extract(&[
            segment(0.0, "recursion basics"),
            segment(10.0, "advanced recursion patterns"),
        ]);
        let recursion = candidates
            .iter()
            .find(|c| c.term() == "recursion")
            .unwrap();
        assert_eq!(
            recursion.source_segments().iter().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn short_segments_weigh_heavier() {
        let candidates = KeywordExtractor::default().extract(&[
            segment(0.0, "polymorphism"),
            segment(10.0, "inheritance together combined alongside several unrelated filler words"),
        ]);
        assert_eq!(candidates[0].term(), "polymorphism");
        assert!(candidates[0].score() > candidates[1].score());
    }

    #[test]
    fn equal_scores_order_lexicographically() {
        let candidates = KeywordExtractor::default().extract(&[segment(0.0, "zebra apple")]);
        let terms: Vec<&str> = candidates.iter().map(|c| c.term()).collect();
        assert_eq!(terms, vec!["apple", "zebra"]);
    }

    #[test]
    fn top_k_truncates_after_ranking() {
        let config = ExtractorConfig {
            top_k: Some(1),
            ..ExtractorConfig::default()
        };
        let extractor = KeywordExtractor::new(config);
        assert_eq!(extractor.config().top_k, Some(1));
        let candidates = extractor.extract(&[
            segment(0.0, "borrowing"),
            segment(10.0, "borrowing lifetimes ownership"),
        ]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].term(), "borrowing");
    }

    #[test]
    fn extraction_is_deterministic() {
        let segments = vec![
            segment(0.0, "closures capture environment variables"),
            segment(10.0, "iterators chain adapters lazily"),
        ];
        let extractor = KeywordExtractor::default();
        assert_eq!(extractor.extract(&segments), extractor.extract(&segments));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(KeywordExtractor::default().extract(&[]).is_empty());
    }
}
