//! Chat exchange error types.
//!
//! [`ChatError`] is the failure half of every exchange outcome. The dispatcher
//! never propagates it further: it is turned into an assistant message with
//! [`ChatError::apology`].

/// Detail used when a non-success response body is not JSON
pub const UNPARSEABLE_ERROR_DETAIL: &str = "Could not parse error response.";

/// Detail used when a non-success JSON body has no `error` string
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error";

/// Why an exchange did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The request never completed at the network layer (connection refused,
    /// DNS failure, reset while reading the body).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Server responded with status {status}: {detail}")]
    Server { status: u16, detail: String },

    /// A success status whose body is not JSON or has no `answer` string.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ChatError {
    /// Text shown in the conversation in place of an answer
    pub fn apology(&self) -> String {
        format!(
            "Sorry, an error occurred. Please make sure the chat backend is running. [{}]",
            self
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest keeps the useful part (e.g. "Connection refused") in the source chain
        let mut text = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            let inner_text = inner.to_string();
            if !text.contains(&inner_text) {
                text.push_str(": ");
                text.push_str(&inner_text);
            }
            source = std::error::Error::source(inner);
        }
        ChatError::Transport(text)
    }
}
