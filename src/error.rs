//! API Errors
//!
//! Failure taxonomy for backend calls: transport, authorization,
//! not-found and server-side rejection.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("not authorized ({status}): {}", .message.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { status: u16, message: Option<String> },

    #[error("not found: {}", .0.as_deref().unwrap_or("no such resource"))]
    NotFound(Option<String>),

    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, message: Option<String> },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        match status {
            401 | 403 => ApiError::Unauthorized { status, message },
            404 => ApiError::NotFound(message),
            _ => ApiError::Rejected { status, message },
        }
    }

    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message, .. } | ApiError::Rejected { message, .. } => message.as_deref(),
            ApiError::NotFound(message) => message.as_deref(),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// Text for a user notification: the server's words, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// `{"message": "..."}` as returned by the backend on failures
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
