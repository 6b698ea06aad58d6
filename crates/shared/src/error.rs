use serde::{Deserialize, Serialize};
use thiserror::Error;

const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Internal,
    Unavailable,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Validation,
            500 => Self::Internal,
            503 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request. Please check your input.",
            Self::Unauthorized => "Unauthorized. Please log in again.",
            Self::Forbidden => "Access denied. You don't have permission.",
            Self::NotFound => "Resource not found.",
            Self::Conflict => "Conflict. This item already exists.",
            Self::Validation => "Validation failed. Please check your input.",
            Self::Internal => "Server error. Please try again later.",
            Self::Unavailable => "Service unavailable. Please try again later.",
            Self::Unknown => GENERIC_MESSAGE,
        }
    }
}

/// A server-side failure resolved to the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    /// Builds the error for an unsuccessful response. The server's own
    /// message wins over the status table when the body carries one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let code = ErrorCode::from_status(status);
        let message =
            server_message(body).unwrap_or_else(|| code.default_message().to_string());
        Self { code, message }
    }
}

fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text),
        Ok(serde_json::Value::Object(fields)) => fields
            .get("message")
            .and_then(|value| value.as_str())
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string),
        Ok(_) => None,
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_have_distinct_messages() {
        let statuses = [400, 401, 403, 404, 409, 422, 500, 503];
        let mut messages: Vec<_> = statuses
            .iter()
            .map(|status| ErrorCode::from_status(*status).default_message())
            .collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), statuses.len());
        assert!(!messages.contains(&GENERIC_MESSAGE));
    }

    #[test]
    fn unknown_status_falls_back_to_generic_message() {
        let err = ApiError::from_response(418, "");
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.message, GENERIC_MESSAGE);
    }

    #[test]
    fn server_message_overrides_status_table() {
        let err = ApiError::from_response(409, r#"{"message":"alice already exists"}"#);
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "alice already exists");

        let err = ApiError::from_response(400, "Username is required");
        assert_eq!(err.message, "Username is required");

        let err = ApiError::from_response(400, r#""quoted reason""#);
        assert_eq!(err.message, "quoted reason");
    }

    #[test]
    fn structured_body_without_message_uses_status_table() {
        let err = ApiError::from_response(422, r#"{"errors":[{"msg":"bad"}]}"#);
        assert_eq!(err.message, ErrorCode::Validation.default_message());
    }
}
