//! Time-limited memo of document analyses.
//!
//! Entries are keyed by document id and content hash, so an edited document
//! never hits a stale entry. Writers invalidate an id explicitly after they
//! replace its content.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::process::pipeline::AnalysisResult;

/// Hash of a document's content
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
struct Entry {
    analysis: Arc<AnalysisResult>,
    stored_at: Instant,
}

/// Shared analysis cache, safe to use from many formatting threads
#[derive(Debug)]
pub struct AnalysisCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, u64), Entry>>,
}

impl AnalysisCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached analysis for `id` at `hash`, if present and fresh
    #[must_use]
    pub fn get(&self, id: &str, hash: u64) -> Option<Arc<AnalysisResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (id.to_string(), hash);
        let fresh = entries
            .get(&key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if fresh {
            entries.get(&key).map(|entry| Arc::clone(&entry.analysis))
        } else {
            entries.remove(&key);
            None
        }
    }

    pub fn insert(&self, id: &str, hash: u64, analysis: Arc<AnalysisResult>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
        entries.insert(
            (id.to_string(), hash),
            Entry {
                analysis,
                stored_at: now,
            },
        );
    }

    /// Drop every entry for `id`, whatever its content hash
    pub fn invalidate(&self, id: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(key, _), _| key != id);
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
