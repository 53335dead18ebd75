use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Shared in-memory translation cache keyed by `(term, target_lang)`.
///
/// Clones share the same storage, so one cache can be handed to several
/// concurrent translation tasks. Lookups and inserts take the lock for
/// the duration of the map operation only; a cancelled build never
/// leaves a partially written entry behind because entries are inserted
/// whole, after the translation already succeeded.
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    entries: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, term: &str, target_lang: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries.get(&(term.to_string(), target_lang.to_string())).cloned()
    }

    pub async fn insert(&self, term: &str, target_lang: &str, translation: impl Into<String>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            (term.to_string(), target_lang.to_string()),
            translation.into(),
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
