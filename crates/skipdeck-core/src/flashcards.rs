use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::TranslationCache;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::provider::{translate_with_retry, RetryPolicy, TranslationProvider};
use crate::types::{Flashcard, KeywordCandidate};

/// How many translation requests may be in flight at once. Kept low to
/// stay under typical provider rate limits.
pub const DEFAULT_TRANSLATION_CONCURRENCY: usize = 4;

enum Outcome {
    Card(Flashcard),
    Skipped(Diagnostic),
    Cancelled,
}

/// Turns ranked keyword candidates into translated flashcards.
///
/// Translations run concurrently up to a bounded limit, but the returned
/// cards keep the candidates' ranking order no matter which request
/// finishes first. One failed translation skips that card only.
pub struct FlashcardBuilder {
    provider: Arc<dyn TranslationProvider>,
    retry: RetryPolicy,
    cache: TranslationCache,
    concurrency: usize,
}

impl FlashcardBuilder {
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            cache: TranslationCache::new(),
            concurrency: DEFAULT_TRANSLATION_CONCURRENCY,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use a caller-owned cache, typically to carry translations across
    /// several builds in one process.
    pub fn with_cache(mut self, cache: TranslationCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Build one flashcard per candidate, in candidate order.
    ///
    /// Cache hits skip the provider entirely. A candidate whose
    /// translation fails permanently (or exhausts its retries) is
    /// dropped and recorded in `diagnostics`. Once `cancel` fires, no
    /// new translation request starts; requests already in flight are
    /// allowed to finish and their cards are kept, so a cancelled build
    /// returns the prefix of work that completed plus one `Cancelled`
    /// diagnostic.
    ///
    /// Card fronts are unique per build; since every card shares
    /// `target_lang`, that is exactly the `(front, target_lang)` key.
    pub async fn build(
        &self,
        candidates: Vec<KeywordCandidate>,
        target_lang: &str,
        cancel: &CancellationToken,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Flashcard> {
        let outcomes: Vec<Outcome> = stream::iter(candidates.into_iter().map(|c| c.into_term()))
            .map(|term| {
                let provider = Arc::clone(&self.provider);
                let cache = self.cache.clone();
                let retry = self.retry.clone();
                let cancel = cancel.clone();
                let target_lang = target_lang.to_string();
                async move {
                    if cancel.is_cancelled() {
                        return Outcome::Cancelled;
                    }
                    if let Some(back) = cache.get(&term, &target_lang).await {
                        debug!(term, "translation cache hit");
                        return Outcome::Card(Flashcard::new(term, back, target_lang));
                    }
                    match translate_with_retry(
                        provider.as_ref(),
                        &term,
                        &target_lang,
                        &retry,
                        &cancel,
                    )
                    .await
                    {
                        Ok(back) => {
                            cache.insert(&term, &target_lang, back.clone()).await;
                            Outcome::Card(Flashcard::new(term, back, target_lang))
                        }
                        // A transient error surfacing after cancellation
                        // means the retry loop was interrupted, not that
                        // the term itself failed.
                        Err(err) if cancel.is_cancelled() && err.is_transient() => {
                            Outcome::Cancelled
                        }
                        Err(err) => {
                            warn!(term, error = %err, "skipping candidate after translation failure");
                            Outcome::Skipped(Diagnostic::TranslationSkipped {
                                term,
                                reason: err.to_string(),
                            })
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut cards = Vec::new();
        let mut seen_fronts: HashSet<String> = HashSet::new();
        let mut saw_cancellation = false;
        for outcome in outcomes {
            match outcome {
                Outcome::Card(card) => {
                    if seen_fronts.insert(card.front().to_string()) {
                        cards.push(card);
                    }
                }
                Outcome::Skipped(diagnostic) => diagnostics.record(diagnostic),
                Outcome::Cancelled => saw_cancellation = true,
            }
        }
        if saw_cancellation {
            diagnostics.record(Diagnostic::Cancelled {
                stage: "translation".into(),
            });
        }
        cards
    }
}
