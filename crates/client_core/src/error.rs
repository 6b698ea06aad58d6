use shared::error::ErrorCode;
use thiserror::Error;

const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("http {status}: {message}")]
    Http {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("unexpected response payload: {0}")]
    Decode(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not logged in")]
    NotAuthenticated,
    #[error("invalid api url '{0}'")]
    InvalidBaseUrl(String),
    #[error("session storage failure: {0}")]
    Storage(#[from] std::io::Error),
    #[error("session data is malformed: {0}")]
    SessionData(#[from] serde_json::Error),
}

impl ClientError {
    /// Short text suitable for a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            Self::NotAuthenticated => "Please log in first.".to_string(),
            Self::InvalidBaseUrl(_) | Self::Decode(_) | Self::Storage(_) | Self::SessionData(_) => {
                GENERIC_MESSAGE.to_string()
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
