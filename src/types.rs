// Type definitions shared by the LLM layer, the pipeline stages and the HTTP routes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

impl LLMResponse {
    /// The model stopped at `max_tokens` rather than finishing its answer.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == "length"
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Proxy activation failed; nothing downstream runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Search error: {0}")]
    Search(String),

    /// The completion endpoint failed (transport, status, auth, quota).
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "configuration",
            AppError::Search(_) => "search",
            AppError::Upstream(_) => "upstream",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Search(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(kind = self.kind(), status = %status, "Request failed: {}", self);

        (
            status,
            Json(serde_json::json!({
                "error": self.kind(),
                "details": self.to_string(),
            })),
        )
            .into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(LLMMessage::system("s").role, "system");
        assert_eq!(LLMMessage::user("u").role, "user");
        assert_eq!(LLMMessage::user("u").content, "u");
    }

    #[test]
    fn test_truncated_response() {
        let response = |reason: &str| LLMResponse {
            content: "partial".to_string(),
            finish_reason: reason.to_string(),
            usage: TokenUsage::default(),
        };
        assert!(response("length").is_truncated());
        assert!(!response("stop").is_truncated());
        assert!(!response("unknown").is_truncated());
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Configuration("proxy".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::Upstream("llm".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Search("page".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::InvalidRequest("query".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
