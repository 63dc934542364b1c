//! Error types for the storefront client

use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-success status returned by the backend.
    /// `message` is the `message` field of the error body when present.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Backend {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Something bad happened; please try again later.")]
    RetriesExhausted { attempts: u32 },
}

impl ClientError {
    /// Message to show a user: the backend's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Backend {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
