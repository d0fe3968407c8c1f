// SPDX-FileCopyrightText: 2026 MultiSense Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process conversation memory keyed by session id.
//!
//! Backed by a `DashMap`: entry locks serialize mutations to a single session
//! while operations on different sessions proceed independently. No operation
//! performs I/O, so the service is synchronous and safe to call from async
//! contexts without spawning.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use multisense_config::model::MemoryConfig;
use multisense_core::types::ConversationTurn;
use tracing::debug;

/// Per-session state. Owned exclusively by [`ConversationMemory`].
struct SessionState {
    turns: VecDeque<ConversationTurn>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl SessionState {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            turns: VecDeque::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.last_active_at > ttl
    }
}

/// Bounded, TTL-expiring conversation memory.
///
/// `max_turns` caps the prompt size passed to generation and bounds memory
/// usage per session regardless of conversation length. A session idle for
/// longer than `ttl` is purged on next access and is indistinguishable from
/// a brand-new session.
pub struct ConversationMemory {
    sessions: DashMap<String, SessionState>,
    max_turns: usize,
    ttl: TimeDelta,
}

impl ConversationMemory {
    /// Creates a memory service with explicit bounds.
    ///
    /// A `ttl` too large for `TimeDelta` is clamped to the maximum
    /// representable duration (effectively no expiry).
    pub fn new(max_turns: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Creates a memory service from configuration.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.max_turns, Duration::from_secs(config.ttl_secs))
    }

    /// Appends a turn, creating the session lazily on first use.
    ///
    /// If the session already holds `max_turns` turns, the oldest is evicted
    /// first. An expired session is reset before the append, so the new turn
    /// starts a fresh conversation.
    pub fn append(&self, session_id: &str, turn: ConversationTurn) {
        let now = Utc::now();
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(now));

        if entry.is_expired(now, self.ttl) {
            *entry = SessionState::new(now);
        }

        while entry.turns.len() >= self.max_turns {
            entry.turns.pop_front();
        }
        entry.turns.push_back(turn);
        entry.last_active_at = now;

        debug!(
            session_id,
            total_turns = entry.turns.len(),
            "conversation turn appended"
        );
    }

    /// Returns the session's turns, oldest first.
    ///
    /// An expired session is purged and yields an empty sequence -- never an
    /// error; a missing session is an expected steady-state condition. A live
    /// session has its `last_active_at` refreshed by this call.
    pub fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let now = Utc::now();

        if let Some(mut entry) = self.sessions.get_mut(session_id) {
            if entry.is_expired(now, self.ttl) {
                drop(entry);
                self.sessions.remove(session_id);
                debug!(session_id, "expired session purged");
                return Vec::new();
            }
            entry.last_active_at = now;
            return entry.turns.iter().cloned().collect();
        }

        Vec::new()
    }

    /// Removes the session unconditionally.
    ///
    /// Returns `true` if a session existed. Subsequent `history` calls behave
    /// as a fresh session.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            debug!(session_id, "session cleared");
        }
        removed
    }

    /// Purges expired sessions and lists the ids of the live ones.
    pub fn active_sessions(&self) -> Vec<String> {
        let now = Utc::now();
        self.sessions
            .retain(|_, state| !state.is_expired(now, self.ttl));
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    /// When the session was first created, if it is still live.
    pub fn created_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        self.sessions.get(session_id).map(|s| s.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisense_core::types::Role;

    fn turn(role: Role, text: &str) -> ConversationTurn {
        ConversationTurn::new(role, text, vec![])
    }

    fn long_ttl() -> Duration {
        Duration::from_secs(3600)
    }

    #[test]
    fn append_creates_session_lazily() {
        let memory = ConversationMemory::new(10, long_ttl());
        assert!(memory.history("s1").is_empty());

        memory.append("s1", turn(Role::User, "hello"));
        let history = memory.history("s1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "hello");
    }

    #[test]
    fn history_is_oldest_first() {
        let memory = ConversationMemory::new(10, long_ttl());
        memory.append("s1", turn(Role::User, "first"));
        memory.append("s1", turn(Role::Assistant, "second"));
        memory.append("s1", turn(Role::User, "third"));

        let history = memory.history("s1");
        let texts: Vec<&str> = history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn bounded_fifo_keeps_most_recent() {
        let max_turns = 6;
        let memory = ConversationMemory::new(max_turns, long_ttl());

        for i in 0..max_turns + 5 {
            memory.append("s1", turn(Role::User, &format!("turn {i}")));
        }

        let history = memory.history("s1");
        assert_eq!(history.len(), max_turns);
        // The oldest surviving turn is turn 5; the newest is turn 10.
        assert_eq!(history[0].text, "turn 5");
        assert_eq!(history[max_turns - 1].text, "turn 10");
    }

    #[test]
    fn clear_removes_session() {
        let memory = ConversationMemory::new(10, long_ttl());
        memory.append("s1", turn(Role::User, "hi"));

        assert!(memory.clear("s1"));
        assert!(memory.history("s1").is_empty());
        assert!(!memory.clear("s1"));
        assert!(!memory.clear("never-existed"));
    }

    #[test]
    fn expired_session_returns_empty_history() {
        let memory = ConversationMemory::new(10, Duration::from_millis(20));
        memory.append("s1", turn(Role::User, "stale"));

        std::thread::sleep(Duration::from_millis(40));
        assert!(memory.history("s1").is_empty());
        // Purged: the session is gone, not just hidden.
        assert!(memory.active_sessions().is_empty());
    }

    #[test]
    fn expired_session_is_indistinguishable_from_fresh() {
        let memory = ConversationMemory::new(10, Duration::from_millis(20));
        memory.append("s1", turn(Role::User, "old conversation"));

        std::thread::sleep(Duration::from_millis(40));
        memory.append("s1", turn(Role::User, "new conversation"));

        let history = memory.history("s1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "new conversation");
    }

    #[test]
    fn history_access_refreshes_ttl() {
        let memory = ConversationMemory::new(10, Duration::from_millis(60));
        memory.append("s1", turn(Role::User, "keep me alive"));

        // Each access lands inside the TTL window and refreshes it.
        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(30));
            assert_eq!(memory.history("s1").len(), 1);
        }
    }

    #[test]
    fn sessions_are_independent() {
        let memory = ConversationMemory::new(10, long_ttl());
        memory.append("alice", turn(Role::User, "from alice"));
        memory.append("bob", turn(Role::User, "from bob"));

        assert_eq!(memory.history("alice").len(), 1);
        assert_eq!(memory.history("bob").len(), 1);
        memory.clear("alice");
        assert!(memory.history("alice").is_empty());
        assert_eq!(memory.history("bob").len(), 1);
    }

    #[test]
    fn active_sessions_lists_live_ids() {
        let memory = ConversationMemory::new(10, long_ttl());
        memory.append("s1", turn(Role::User, "a"));
        memory.append("s2", turn(Role::User, "b"));

        let mut active = memory.active_sessions();
        active.sort();
        assert_eq!(active, vec!["s1", "s2"]);
    }

    #[test]
    fn created_at_tracks_session_lifecycle() {
        let memory = ConversationMemory::new(10, long_ttl());
        assert!(memory.created_at("s1").is_none());

        memory.append("s1", turn(Role::User, "hi"));
        let created = memory.created_at("s1").expect("session should exist");

        memory.append("s1", turn(Role::Assistant, "hello"));
        assert_eq!(memory.created_at("s1"), Some(created));

        memory.clear("s1");
        assert!(memory.created_at("s1").is_none());
    }

    #[test]
    fn concurrent_appends_to_same_session_lose_nothing() {
        use std::sync::Arc;

        let memory = Arc::new(ConversationMemory::new(1000, long_ttl()));
        let mut handles = Vec::new();
        for t in 0..8 {
            let memory = Arc::clone(&memory);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    memory.append("shared", turn(Role::User, &format!("t{t}-{i}")));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(memory.history("shared").len(), 8 * 50);
    }

    #[test]
    fn concurrent_appends_respect_bound() {
        use std::sync::Arc;

        let memory = Arc::new(ConversationMemory::new(10, long_ttl()));
        let mut handles = Vec::new();
        for t in 0..4 {
            let memory = Arc::clone(&memory);
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    memory.append("shared", turn(Role::User, &format!("t{t}-{i}")));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(memory.history("shared").len(), 10);
    }
}
