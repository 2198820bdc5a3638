// HTTP client error types
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failure talking to the backend. Every variant is recoverable: callers log
/// it, surface a notification and keep their previous state.
#[derive(Debug, Error)]
pub enum ClientError {
    // Connection refused, DNS, TLS, timeout
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // 400 / 422 with optional per-field messages
    #[error("Validation failed: {message}")]
    Validation {
        status: u16,
        message: String,
        field_errors: HashMap<String, String>,
    },

    // Any other non-2xx
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl ClientError {
    /// HTTP status, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Validation { status, .. } => Some(*status),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Decode(_) | ClientError::InvalidEndpoint { .. } => None,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(e) if e.is_timeout() => "TIMEOUT",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Status { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Status { .. } => "REQUEST_REJECTED",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::InvalidEndpoint { .. } => "INVALID_ENDPOINT",
        }
    }

    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Build the error for a non-success response from its status and body.
    /// The body is read leniently: `message`, `error` or raw text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            401 => ClientError::Unauthorized(message),
            400 | 422 => {
                let field_errors = parsed
                    .as_ref()
                    .and_then(|v| v.get("field_errors").or_else(|| v.get("errors")))
                    .and_then(|v| v.as_object())
                    .map(|obj| {
                        obj.iter()
                            .map(|(k, v)| {
                                let msg = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                                (k.clone(), msg)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                ClientError::Validation { status, message, field_errors }
            }
            _ => ClientError::Status { status, message },
        }
    }
}
