pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiChatModel;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("missing API key: set {0}")]
    MissingApiKey(String),
}

/// A hosted text-generation model: one prompt in, one response out.
///
/// Implementations must not retry; retry policy belongs to the caller.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Backend identifier for logs.
    fn name(&self) -> &str;
}
