//! Turns the draft into a completed exchange.
//!
//! An exchange is a two-phase commit against the [`ConversationStore`]:
//!
//! 1. [`Dispatcher::begin`] appends the user message, clears the draft and marks
//!    the store busy, returning an [`Exchange`] that owns the captured prompt.
//! 2. [`Exchange::run`] performs the backend call. It does not touch the store, so
//!    a front end can spawn it and keep drawing.
//! 3. [`settle`] appends the answer or a failure placeholder and clears busy.
//!
//! [`Dispatcher::submit`] runs all three in sequence.

use std::sync::Arc;

use crate::backend::{Answer, ChatBackend};
use crate::error::ChatError;
use crate::state::{ChatMessage, ConversationStore};

/// Result of one exchange once it has settled
pub type Outcome = Result<Answer, ChatError>;

#[derive(Clone)]
pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Start an exchange from the current draft.
    ///
    /// Returns `None` without touching the store when the draft is blank or a
    /// request is already in flight.
    pub fn begin(&self, store: &mut ConversationStore) -> Option<Exchange> {
        if store.is_busy() {
            tracing::debug!("submission ignored: request already in flight");
            return None;
        }
        if !store.has_draft() {
            tracing::debug!("submission ignored: draft is blank");
            return None;
        }

        store.append_message(ChatMessage::user(store.draft()));
        let prompt = store.take_draft();
        store.set_busy(true);

        tracing::info!(prompt_chars = prompt.chars().count(), "exchange started");

        Some(Exchange {
            prompt,
            backend: Arc::clone(&self.backend),
        })
    }

    /// Run a whole exchange against the store.
    ///
    /// `None` means the submission was ignored. Otherwise the outcome is returned
    /// for inspection; the store already holds the resulting assistant message.
    pub async fn submit(&self, store: &mut ConversationStore) -> Option<Outcome> {
        let exchange = self.begin(store)?;
        let outcome = exchange.run().await;
        settle(store, &outcome);
        Some(outcome)
    }
}

/// An exchange that has been started but not yet settled
pub struct Exchange {
    prompt: String,
    backend: Arc<dyn ChatBackend>,
}

impl Exchange {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn run(self) -> Outcome {
        self.backend.ask(&self.prompt).await
    }
}

/// Record the outcome of an exchange and leave the store idle.
pub fn settle(store: &mut ConversationStore, outcome: &Outcome) {
    match outcome {
        Ok(answer) => {
            tracing::info!(answer_chars = answer.as_str().chars().count(), "exchange settled");
            store.append_message(ChatMessage::assistant(answer.as_str()));
        }
        Err(err) => {
            tracing::warn!(error = %err, "exchange failed");
            store.append_message(ChatMessage::failure(err.clone()));
        }
    }
    store.set_busy(false);
}
