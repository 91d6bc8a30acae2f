//! Deterministic prompt composition.
//!
//! Assembles the message sequence sent to the chat provider: one
//! system instruction (caller persona or the fixed default), the
//! session history as alternating user/assistant messages, then the
//! new utterance as a final user message. Pure function: identical
//! inputs always yield an identical sequence.

use stagecall_types::llm::ChatMessage;
use stagecall_types::session::Turn;

/// Default persona: a character in an interactive Swedish theater.
/// Short, concrete, spoken dialogue -- no poetry, no lists, no rhymes.
pub const DEFAULT_PERSONA: &str = "Du är en karaktär i en interaktiv teater på svenska. \
     Svara kort och konkret (1–2 meningar). \
     Formulera dig som talad dialog, inte poesi. \
     Inga listor, inga långa utläggningar, inga rim.";

/// Placeholder substituted when the audience said nothing.
pub const SILENCE_PLACEHOLDER: &str = "(tystnad)";

/// Compose the ordered message sequence for one reply generation.
///
/// `persona` overrides the default system instruction when non-empty
/// (whitespace-only counts as empty).
pub fn compose(history: &[Turn], utterance: &str, persona: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + history.len() * 2);

    let system = match persona {
        Some(p) if !p.trim().is_empty() => p,
        _ => DEFAULT_PERSONA,
    };
    messages.push(ChatMessage::system(system));

    for turn in history {
        messages.push(ChatMessage::user(&turn.user));
        messages.push(ChatMessage::assistant(&turn.ai));
    }

    let utterance = if utterance.trim().is_empty() {
        SILENCE_PLACEHOLDER
    } else {
        utterance
    };
    messages.push(ChatMessage::user(utterance));

    messages
}
