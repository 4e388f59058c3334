use std::collections::HashMap;
use std::sync::Mutex;

use munchy_core::domain::session::Turn;

/// Default cap on turns kept per session.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Process-wide per-session turn log with bounded size.
///
/// Sessions are created lazily on first append and live until process
/// restart; the only growth bound is the per-session truncation. Append and
/// truncate happen under one lock, so concurrent resolutions for the same
/// session cannot interleave a truncation with a half-applied append.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Vec<Turn>>>,
    max_history: usize,
}

impl SessionStore {
    pub fn new(max_history: usize) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), max_history: max_history.max(1) }
    }

    pub fn append(&self, session_id: &str, turn: Turn) {
        if let Ok(mut sessions) = self.sessions.lock() {
            let turns = sessions.entry(session_id.to_string()).or_default();
            turns.push(turn);
            if turns.len() > self.max_history {
                let drop_count = turns.len() - self.max_history;
                turns.drain(..drop_count);
            }
        }
    }

    /// Current ordered turns for a session; empty if the session is unknown.
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(session_id).cloned())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
