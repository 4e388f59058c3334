use std::collections::HashMap;
use std::sync::Mutex;

/// Cache key normalization: lower-cased, whitespace-trimmed message text.
/// Exact match only; no fuzzy or partial matching.
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Memoized fallback replies keyed by normalized message.
///
/// Entries are never evicted or expired; every unique fallback query stays
/// for the process lifetime. Two callers missing on the same key may both
/// reach the generator; writes are idempotent so the race is benign.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, String>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|entries| entries.get(key).cloned())
    }

    pub fn insert(&self, key: String, reply: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, reply);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
