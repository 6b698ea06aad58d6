use serde::{Deserialize, Serialize};

use crate::domain::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Body of `PATCH /users/:username`. Only changed fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_birth_date: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.new_username.is_none()
            && self.new_password.is_none()
            && self.new_email.is_none()
            && self.new_birth_date.is_none()
    }

    /// Username and password changes invalidate the issued token.
    pub fn invalidates_credentials(&self) -> bool {
        self.new_username.is_some() || self.new_password.is_some()
    }
}

/// Empty JSON object sent with favorite mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyBody {}
