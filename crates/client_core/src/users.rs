use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use shared::{
    domain::{MovieId, User},
    protocol::{EmptyBody, ProfileUpdate},
};
use tracing::{info, warn};

use crate::{
    error::Result,
    favorites::FavoritesApi,
    forms::RegistrationForm,
    notice::SHORT_NOTICE,
    request::ApiRequester,
};

pub struct UserService {
    requester: Arc<ApiRequester>,
}

impl UserService {
    pub fn new(requester: Arc<ApiRequester>) -> Self {
        Self { requester }
    }

    /// `POST /users`. Registration does not log the new account in.
    pub async fn register(&self, form: &RegistrationForm) -> Result<User> {
        let request = form.validate()?;
        match self
            .requester
            .send_json::<_, User>(Method::POST, &["users"], &request)
            .await
        {
            Ok(user) => {
                info!("users: registered username={}", user.username);
                self.requester.notifier().success(
                    "Registration successful! You can now log in.",
                    SHORT_NOTICE,
                );
                Ok(user)
            }
            Err(err) => {
                warn!("users: registration failed username={} error={err}", request.username);
                self.requester.notifier().error(
                    "Registration failed. Please check your details and try again.",
                    SHORT_NOTICE,
                );
                Err(err)
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.requester.get_json(&["users"]).await
    }

    pub async fn update_user(&self, username: &str, update: &ProfileUpdate) -> Result<User> {
        self.requester
            .send_json(Method::PATCH, &["users", username], update)
            .await
    }

    /// Returns the server's plain-text confirmation.
    pub async fn delete_user(&self, username: &str) -> Result<String> {
        self.requester
            .send_for_text(Method::DELETE, &["users", username])
            .await
    }
}

#[async_trait]
impl FavoritesApi for UserService {
    async fn add_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User> {
        self.requester
            .send_json(
                Method::PATCH,
                &["users", username, movie_id.as_str()],
                &EmptyBody::default(),
            )
            .await
    }

    async fn remove_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User> {
        self.requester
            .request_json(Method::DELETE, &["users", username, movie_id.as_str()])
            .await
    }
}
