use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single exchange half within a session. Append-only except for window
/// eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-session state owned by the conversation store.
///
/// Invariant: `history.len() <= context_window` after every update; the oldest
/// turns are evicted first.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: String,
    pub history: Vec<ConversationTurn>,
    pub context_window: usize,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>, context_window: usize) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            context_window: context_window.max(1),
        }
    }

    /// Append a turn, evicting from the front until the window holds.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
        while self.history.len() > self.context_window {
            self.history.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_within_window_keeps_all_turns() {
        let mut state = SessionState::new("s1", 3);
        state.push(ConversationTurn::user("one"));
        state.push(ConversationTurn::assistant("two"));
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[0].content, "one");
    }

    #[test]
    fn push_beyond_window_evicts_oldest_first() {
        let mut state = SessionState::new("s1", 3);
        for content in ["one", "two", "three", "four"] {
            state.push(ConversationTurn::user(content));
        }
        assert_eq!(state.history.len(), 3);
        let retained: Vec<&str> = state.history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(retained, vec!["two", "three", "four"]);
    }

    #[test]
    fn window_of_zero_is_clamped_to_one() {
        let mut state = SessionState::new("s1", 0);
        state.push(ConversationTurn::user("one"));
        state.push(ConversationTurn::user("two"));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].content, "two");
    }

    #[test]
    fn turn_serializes_role_snake_case() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
        assert!(json.get("timestamp").is_some());
    }
}
