//! Per-session bounded conversation history.
//!
//! Each session id (call SID or browser session id) owns an ordered
//! list of turns capped at a sliding window: when a push overflows the
//! window, the oldest turn is dropped first. Sessions are created
//! implicitly on first push and live until reset or evicted.
//!
//! The ledger is internally synchronized: the append-and-trim step
//! runs under the per-key entry guard, so concurrent pushes to the
//! same session cannot corrupt the list or exceed the window, and
//! pushes to different sessions never interfere.

use std::time::Instant;

use dashmap::DashMap;

use stagecall_types::session::Turn;

/// Default number of turns retained per session.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Default cap on the number of tracked session ids.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct SessionEntry {
    turns: Vec<Turn>,
    touched: Instant,
}

/// Bounded per-session conversation history.
pub struct SessionLedger {
    sessions: DashMap<String, SessionEntry>,
    window: usize,
    max_sessions: usize,
}

impl SessionLedger {
    /// Create a ledger with the default window and session cap.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_HISTORY_WINDOW, DEFAULT_MAX_SESSIONS)
    }

    /// Create a ledger with an explicit history window and session cap.
    ///
    /// Both limits are clamped to at least 1.
    pub fn with_limits(window: usize, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            window: window.max(1),
            max_sessions: max_sessions.max(1),
        }
    }

    /// The configured history window.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Ordered history for a session; empty if the session is unknown.
    pub fn get(&self, session_id: &str) -> Vec<Turn> {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                entry.touched = Instant::now();
                entry.turns.clone()
            }
            None => Vec::new(),
        }
    }

    /// Append a turn, retaining only the most recent `window` turns.
    ///
    /// Returns the updated history. The trim runs while the entry
    /// guard is held, so it is atomic relative to concurrent pushes
    /// on the same session id.
    pub fn push(
        &self,
        session_id: &str,
        user: impl Into<String>,
        ai: impl Into<String>,
    ) -> Vec<Turn> {
        let turn = Turn::new(user, ai);
        let snapshot = {
            let mut entry =
                self.sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| SessionEntry {
                        turns: Vec::new(),
                        touched: Instant::now(),
                    });
            entry.turns.push(turn);
            if entry.turns.len() > self.window {
                let excess = entry.turns.len() - self.window;
                entry.turns.drain(..excess);
            }
            entry.touched = Instant::now();
            entry.turns.clone()
        };
        self.evict_over_cap(session_id);
        snapshot
    }

    /// Remove all history for a session. Idempotent if unknown.
    pub fn reset(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Evict least-recently-touched sessions while over the cap.
    ///
    /// `keep` (the id just touched) is never evicted, so a push that
    /// creates the overflowing entry cannot drop its own session.
    fn evict_over_cap(&self, keep: &str) {
        while self.sessions.len() > self.max_sessions {
            let stalest = self
                .sessions
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().touched)
                .map(|entry| entry.key().clone());
            match stalest {
                Some(key) => {
                    tracing::debug!(session_id = %key, "Evicting idle session over cap");
                    self.sessions.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new()
    }
}
