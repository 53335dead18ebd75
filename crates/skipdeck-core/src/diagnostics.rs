use serde::Serialize;

/// One isolated failure observed while processing a single segment or
/// candidate. Siblings keep processing; the pipeline reports these
/// alongside its partial results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A matcher errored on one segment and was treated as "no match".
    MatcherFailed {
        matcher: String,
        segment_index: usize,
        reason: String,
    },
    /// A candidate was dropped because its translation failed permanently
    /// or exhausted its retries.
    TranslationSkipped { term: String, reason: String },
    /// Cancellation was observed; anything already completed is still
    /// delivered.
    Cancelled { stage: String },
}

/// Ordered collector for [`Diagnostic`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
