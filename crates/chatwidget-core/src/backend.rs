use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChatError, UNKNOWN_ERROR_DETAIL, UNPARSEABLE_ERROR_DETAIL};

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/chat";

/// The text of a successful reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer(pub String);

impl Answer {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Something that can turn a prompt into an answer.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<Answer, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    answer: String,
}

/// POSTs `{"prompt": ...}` to a chat endpoint and reads `{"answer": ...}` back.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn ask(&self, prompt: &str) -> Result<Answer, ChatError> {
        tracing::debug!(endpoint = %self.endpoint, "sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // A body that cannot be read still reports the status
            let detail = match response.text().await {
                Ok(body) => error_detail(&body),
                Err(e) => {
                    tracing::debug!(error = %e, "failed to read error body");
                    UNPARSEABLE_ERROR_DETAIL.to_string()
                }
            };
            return Err(ChatError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let reply: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Malformed(e.to_string()))?;
        Ok(Answer(reply.answer))
    }
}

/// Best-effort extraction of the `error` field from a failure body.
///
/// Strings are used as-is and other truthy scalars (`42`, `true`) are printed.
/// Empty, zero, `false`, `null` and structured values fall back to a generic detail.
fn error_detail(body: &str) -> String {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => return UNPARSEABLE_ERROR_DETAIL.to_string(),
    };

    match value.get("error") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => UNKNOWN_ERROR_DETAIL.to_string(),
    }
}
