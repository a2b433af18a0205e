//! Append-only chat transcript

use crate::content::ContentBlock;
use crate::observer::{Observers, Subscription};
use crate::state::{Author, ChatMessage};

/// Change notifications delivered to transcript observers
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Appended(ChatMessage),
    Cleared,
}

/// Ordered chat transcript. Insertion order is display order.
#[derive(Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    observers: Observers<LogEvent>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, content: ContentBlock) {
        self.append(ChatMessage::new(Author::User, content));
    }

    pub fn append_bot(&mut self, content: ContentBlock) {
        self.append(ChatMessage::new(Author::Bot, content));
    }

    fn append(&mut self, message: ChatMessage) {
        self.messages.push(message.clone());
        self.observers.notify(&LogEvent::Appended(message));
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.observers.notify(&LogEvent::Cleared);
    }

    /// Read-only view of every message in order
    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&LogEvent) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }
}

impl std::fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageLog")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .finish()
    }
}
