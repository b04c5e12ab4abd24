#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use tracing::debug;

use crate::llm::ChatMessage;

/// Bounded FIFO of recent conversation exchanges, replayed into the
/// prompt for continuity. One exchange is a user question plus the
/// assistant answer; eviction is oldest-first and silent.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<ChatMessage>,
    max_exchanges: usize,
}

impl ConversationMemory {
    #[inline]
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_exchanges * 2),
            max_exchanges: max_exchanges.max(1),
        }
    }

    /// Record a completed question/answer exchange, evicting the oldest
    /// exchange once the window is full
    #[inline]
    pub fn append_exchange(&mut self, question: &str, answer: &str) {
        self.turns.push_back(ChatMessage::user(question));
        self.turns.push_back(ChatMessage::assistant(answer));

        while self.turns.len() > self.max_exchanges * 2 {
            self.turns.pop_front();
        }

        debug!(
            "Conversation memory holds {} of up to {} exchanges",
            self.exchanges(),
            self.max_exchanges
        );
    }

    /// The retained turns, oldest first
    #[inline]
    pub fn turns(&self) -> impl Iterator<Item = &ChatMessage> {
        self.turns.iter()
    }

    #[inline]
    pub fn exchanges(&self) -> usize {
        self.turns.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
