pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod state;

#[cfg(test)]
mod proptests;

// Re-export main types for convenience
pub use backend::{Answer, ChatBackend, HttpBackend, DEFAULT_ENDPOINT};
pub use config::Config;
pub use dispatcher::{settle, Dispatcher, Exchange, Outcome};
pub use error::ChatError;
pub use state::{ChatMessage, ChatRole, ConversationStore, StoreEvent};
