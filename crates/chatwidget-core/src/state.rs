//! UI-agnostic conversation state
//!
//! This module contains the message model and the conversation store that every
//! front end observes. The store is a passive data holder: it never talks to the
//! network, it only records what the dispatcher tells it and notifies subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ChatError;

/// Greeting seeded into every new conversation unless the config overrides it
pub const DEFAULT_GREETING: &str = "Hi! Ask me any questions you have about the resume.";

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single entry in the conversation. Fields are private so a message cannot be
/// edited once it has been appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
    #[serde(skip)]
    error: Option<ChatError>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            error: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            error: None,
        }
    }

    /// Assistant placeholder for a failed exchange. The content is the apology
    /// text; the structured error stays attached for presenters.
    pub fn failure(error: ChatError) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: error.apology(),
            error: Some(error),
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn error(&self) -> Option<&ChatError> {
        self.error.as_ref()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Change notifications emitted by [`ConversationStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A message was appended at the given index
    MessageAppended(usize),
    DraftChanged,
    BusyChanged(bool),
}

/// Conversation, draft and busy flag for one chat session
#[derive(Debug)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    draft: String,
    busy: bool,
    observers: Vec<mpsc::UnboundedSender<StoreEvent>>,
}

impl ConversationStore {
    /// New store seeded with a single assistant greeting
    pub fn new(greeting: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            draft: String::new(),
            busy: false,
            observers: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// True when the draft holds something other than whitespace
    pub fn has_draft(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Whether a submission would currently be accepted
    pub fn can_submit(&self) -> bool {
        !self.busy && self.has_draft()
    }

    /// Register an observer. The receiver sees every change made after this call.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    pub fn append_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        let index = self.messages.len() - 1;
        self.notify(StoreEvent::MessageAppended(index));
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.draft {
            self.draft = text;
            self.notify(StoreEvent::DraftChanged);
        }
    }

    /// Clear the draft and hand back what it held
    pub fn take_draft(&mut self) -> String {
        let draft = std::mem::take(&mut self.draft);
        if !draft.is_empty() {
            self.notify(StoreEvent::DraftChanged);
        }
        draft
    }

    pub fn set_busy(&mut self, busy: bool) {
        if busy != self.busy {
            self.busy = busy;
            self.notify(StoreEvent::BusyChanged(busy));
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        // Receivers that were dropped are pruned here
        self.observers.retain(|tx| tx.send(event).is_ok());
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_seeded_with_greeting() {
        let store = ConversationStore::new("hello there");
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].role(), ChatRole::Assistant);
        assert_eq!(store.messages()[0].content(), "hello there");
        assert_eq!(store.draft(), "");
        assert!(!store.is_busy());
    }

    #[test]
    fn append_preserves_chronological_order() {
        let mut store = ConversationStore::default();
        store.append_message(ChatMessage::user("first"));
        store.append_message(ChatMessage::assistant("second"));

        let contents: Vec<&str> = store.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec![DEFAULT_GREETING, "first", "second"]);
    }

    #[test]
    fn whitespace_draft_cannot_be_submitted() {
        let mut store = ConversationStore::default();
        store.set_draft("   \t\n");
        assert!(!store.has_draft());
        assert!(!store.can_submit());

        store.set_draft(" hi ");
        assert!(store.can_submit());

        store.set_busy(true);
        assert!(!store.can_submit());
    }

    #[test]
    fn take_draft_clears_it() {
        let mut store = ConversationStore::default();
        store.set_draft("question");
        assert_eq!(store.take_draft(), "question");
        assert_eq!(store.draft(), "");
    }

    #[test]
    fn subscribers_see_changes_in_order() {
        let mut store = ConversationStore::default();
        let mut rx = store.subscribe();

        store.set_draft("q");
        store.set_busy(true);
        store.append_message(ChatMessage::user("q"));
        store.set_busy(false);

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::DraftChanged);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::BusyChanged(true));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::MessageAppended(1));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::BusyChanged(false));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unchanged_values_do_not_notify() {
        let mut store = ConversationStore::default();
        let mut rx = store.subscribe();

        store.set_busy(false);
        store.set_draft("");
        assert!(store.take_draft().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = ConversationStore::default();
        let rx = store.subscribe();
        drop(rx);

        store.set_draft("x");
        assert!(store.observers.is_empty());
    }

    #[test]
    fn failure_message_keeps_structured_error() {
        let msg = ChatMessage::failure(ChatError::Transport("Failed to fetch".into()));
        assert_eq!(msg.role(), ChatRole::Assistant);
        assert!(msg.is_failure());
        assert!(msg.content().contains("Failed to fetch"));
        assert_eq!(
            msg.error(),
            Some(&ChatError::Transport("Failed to fetch".into()))
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
