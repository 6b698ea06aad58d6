use std::sync::Arc;

use reqwest::Method;
use shared::{domain::User, protocol::LoginResponse};
use tracing::{info, warn};

use crate::{
    error::Result,
    forms::LoginForm,
    notice::SHORT_NOTICE,
    request::ApiRequester,
    session::SessionStore,
};

pub struct AuthService {
    requester: Arc<ApiRequester>,
}

impl AuthService {
    pub fn new(requester: Arc<ApiRequester>) -> Self {
        Self { requester }
    }

    fn session(&self) -> &SessionStore {
        self.requester.session()
    }

    /// `POST /login`; on success the token and user become the session.
    pub async fn login(&self, form: &LoginForm) -> Result<User> {
        let request = form.validate()?;
        let response: LoginResponse = match self
            .requester
            .send_json(Method::POST, &["login"], &request)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("auth: login failed username={} error={err}", request.username);
                self.requester.notifier().error(
                    "Login failed. Please check your credentials and try again.",
                    SHORT_NOTICE,
                );
                return Err(err);
            }
        };

        self.session().start(&response.token, &response.user).await?;
        info!("auth: logged in username={}", response.user.username);
        self.requester
            .notifier()
            .success("Login successful!", SHORT_NOTICE);
        Ok(response.user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session().clear().await?;
        info!("auth: session cleared");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<User>> {
        self.session().user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session().is_authenticated().await
    }
}
