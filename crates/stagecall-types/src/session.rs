//! Conversation session types.

use serde::{Deserialize, Serialize};

/// One audience-utterance / character-reply pair.
///
/// Turns are immutable once appended to a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// What the audience member said.
    pub user: String,
    /// What the character answered.
    pub ai: String,
}

impl Turn {
    /// Build a turn from an utterance and its reply.
    pub fn new(user: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ai: ai.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serde_roundtrip() {
        let turn = Turn::new("hej", "hej själv");
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, parsed);
    }
}
