//! Conversation-related types.

use sql_agent_model::ModelMessage;

/// Default number of exchanges kept by [`ConversationMemory`].
pub const DEFAULT_MEMORY_EXCHANGES: usize = 10;

/// A rolling window of past question/answer exchanges.
///
/// Only user questions and the final assistant responses are kept; tool
/// calls and tool results never enter the memory. The window is always a
/// suffix of the full exchange history, and it is truncated by whole
/// exchanges, so it never starts with a dangling answer.
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<ModelMessage>,
    max_messages: usize,
}

impl ConversationMemory {
    /// Creates an empty memory holding at most `max_exchanges` exchanges.
    #[inline]
    pub fn with_capacity(max_exchanges: usize) -> Self {
        let max_messages = max_exchanges.saturating_mul(2);
        Self {
            messages: Vec::new(),
            max_messages,
        }
    }

    /// Appends one exchange, dropping the oldest exchanges if the window
    /// would exceed its capacity.
    pub fn append<Q: Into<String>, A: Into<String>>(
        &mut self,
        question: Q,
        answer: A,
    ) {
        self.messages.push(ModelMessage::User(question.into()));
        self.messages.push(ModelMessage::Assistant(answer.into()));

        // Both counts are even, so this always removes whole exchanges.
        let excess = self.messages.len().saturating_sub(self.max_messages);
        if excess > 0 {
            trace!("dropping {} old exchange(s) from memory", excess / 2);
            self.messages.drain(..excess);
        }
    }

    /// Returns the current window, oldest message first.
    #[inline]
    pub fn window(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the stored exchanges as `(question, answer)` pairs.
    pub fn exchanges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .chunks_exact(2)
            .map(|pair| (pair[0].content(), pair[1].content()))
    }

    /// Returns the number of messages in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if no exchange is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the maximum number of messages the window can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_messages
    }

    /// Forgets every stored exchange.
    #[inline]
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for ConversationMemory {
    #[inline]
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_EXCHANGES)
    }
}
