//! Per-session conversational memory.
//!
//! The store owns every [`SessionState`]. Sessions are created on first
//! reference and live for the process lifetime. Updates to one session are
//! serialized behind that session's own lock; the outer map lock is held only
//! long enough to fetch or insert an entry, so requests on different session
//! ids never block one another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::models::{ConversationTurn, SessionState};

#[derive(Clone)]
pub struct ConversationStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<SessionState>>>>>,
    context_window: usize,
}

impl ConversationStore {
    pub fn new(context_window: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            context_window: context_window.max(1),
        }
    }

    /// Atomic get-or-create of a session entry.
    async fn entry(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(entry) = self.sessions.read().await.get(session_id) {
            return entry.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SessionState::new(session_id, self.context_window)))
            })
            .clone()
    }

    /// Snapshot of a session's history, creating the session on first
    /// reference.
    pub async fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let entry = self.entry(session_id).await;
        let state = entry.lock().await;
        state.history.clone()
    }

    /// Append a completed exchange (user turn then assistant turn) and trim
    /// to the window, atomically with respect to concurrent requests on the
    /// same session id. Returns the updated history.
    pub async fn append_exchange(
        &self,
        session_id: &str,
        user: ConversationTurn,
        assistant: ConversationTurn,
    ) -> Vec<ConversationTurn> {
        let entry = self.entry(session_id).await;
        let mut state = entry.lock().await;
        state.push(user);
        state.push(assistant);
        state.history.clone()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_reference_creates_empty_session() {
        let store = ConversationStore::new(3);
        assert!(store.history("s1").await.is_empty());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn exchange_appends_user_then_assistant() {
        let store = ConversationStore::new(3);
        let history = store
            .append_exchange(
                "s1",
                ConversationTurn::user("question"),
                ConversationTurn::assistant("answer"),
            )
            .await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "question");
        assert_eq!(history[1].content, "answer");
    }

    #[tokio::test]
    async fn window_keeps_only_most_recent_turns() {
        let store = ConversationStore::new(3);
        // Three exchanges = six turns against a window of three.
        for i in 0..3 {
            store
                .append_exchange(
                    "s1",
                    ConversationTurn::user(format!("q{i}")),
                    ConversationTurn::assistant(format!("a{i}")),
                )
                .await;
        }
        let history = store.history("s1").await;
        let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a1", "q2", "a2"]);
    }

    #[tokio::test]
    async fn fourth_turn_evicts_the_first() {
        let store = ConversationStore::new(3);
        store
            .append_exchange(
                "s1",
                ConversationTurn::user("turn1"),
                ConversationTurn::assistant("turn2"),
            )
            .await;
        let history = store
            .append_exchange(
                "s1",
                ConversationTurn::user("turn3"),
                ConversationTurn::assistant("turn4"),
            )
            .await;
        let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["turn2", "turn3", "turn4"]);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = ConversationStore::new(3);
        store
            .append_exchange(
                "s1",
                ConversationTurn::user("for s1"),
                ConversationTurn::assistant("reply s1"),
            )
            .await;
        assert!(store.history("s2").await.is_empty());
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn concurrent_exchanges_on_one_session_never_exceed_window() {
        let store = ConversationStore::new(3);
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_exchange(
                        "shared",
                        ConversationTurn::user(format!("q{i}")),
                        ConversationTurn::assistant(format!("a{i}")),
                    )
                    .await
            }));
        }
        for handle in handles {
            let history = handle.await.expect("join");
            assert!(history.len() <= 3);
        }
        assert_eq!(store.history("shared").await.len(), 3);
    }
}
