//! VK API error taxonomy.

use thiserror::Error;

pub type VkResult<T> = Result<T, VkError>;

/// Rate-limit error code returned by the VK API.
const TOO_MANY_REQUESTS: i64 = 6;

#[derive(Debug, Error)]
pub enum VkError {
    /// Transport-level failure (connect, TLS, timeout, non-2xx status).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// An error object returned by the API itself.
    #[error("vk api error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// The response decoded, but not into the expected shape.
    #[error("unexpected vk response shape: {0}")]
    Decode(String),

    /// The client was constructed with unusable settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl VkError {
    pub fn api(code: i64, msg: impl Into<String>) -> Self {
        Self::Api {
            code,
            msg: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether another attempt can reasonably succeed.
    ///
    /// Transport failures and the API's own rate-limit signal are retryable;
    /// every other API error (bad token, deleted group, wrong call) is
    /// permanent and must surface to the caller unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            VkError::Http(_) => true,
            VkError::Api { code, .. } => *code == TOO_MANY_REQUESTS,
            VkError::Decode(_) | VkError::Config(_) => false,
        }
    }
}
