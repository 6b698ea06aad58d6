use std::sync::Arc;

use tracing::{info, warn};

use shared::domain::User;

use crate::{
    error::{ClientError, Result},
    forms::ProfileForm,
    notice::{Notifier, DEFAULT_NOTICE, LONG_NOTICE},
    session::SessionStore,
    users::UserService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSaveOutcome {
    NoChanges,
    Updated(User),
    /// Credentials changed; the session was cleared.
    LoggedOut,
}

pub struct ProfileEditor {
    users: Arc<UserService>,
    session: Arc<SessionStore>,
    notifier: Notifier,
}

impl ProfileEditor {
    pub fn new(users: Arc<UserService>, session: Arc<SessionStore>, notifier: Notifier) -> Self {
        Self {
            users,
            session,
            notifier,
        }
    }

    pub async fn save(&self, form: &ProfileForm) -> Result<ProfileSaveOutcome> {
        let current = self.require_user().await?;
        form.validate()?;

        let update = form.changes_from(&current);
        if update.is_empty() {
            self.notifier.info("No changes to update.", DEFAULT_NOTICE);
            return Ok(ProfileSaveOutcome::NoChanges);
        }

        let updated = match self.users.update_user(&current.username, &update).await {
            Ok(updated) => updated,
            Err(err) => {
                warn!("profile: update failed username={} error={err}", current.username);
                self.notifier.error("Failed to update profile.", LONG_NOTICE);
                return Err(err);
            }
        };

        if update.invalidates_credentials() {
            self.session.clear().await?;
            info!("profile: credentials changed, session cleared username={}", current.username);
            self.notifier.info(
                "Username/password changed. You are logged out for security.",
                LONG_NOTICE,
            );
            return Ok(ProfileSaveOutcome::LoggedOut);
        }

        self.session.set_user(&updated).await?;
        info!("profile: updated username={}", updated.username);
        self.notifier
            .success("Profile updated successfully.", DEFAULT_NOTICE);
        Ok(ProfileSaveOutcome::Updated(updated))
    }

    /// Deletes the session's account and ends the session.
    pub async fn delete_account(&self) -> Result<String> {
        let current = self.require_user().await?;
        let confirmation = match self.users.delete_user(&current.username).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                warn!("profile: delete failed username={} error={err}", current.username);
                self.notifier.error("Failed to delete account.", LONG_NOTICE);
                return Err(err);
            }
        };

        self.session.clear().await?;
        info!("profile: account deleted username={}", current.username);
        self.notifier.info("Account deleted. Goodbye!", LONG_NOTICE);
        Ok(confirmation)
    }

    async fn require_user(&self) -> Result<User> {
        match self.session.user().await? {
            Some(user) => Ok(user),
            None => {
                self.notifier.info("Please log in first.", DEFAULT_NOTICE);
                Err(ClientError::NotAuthenticated)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/profile_tests.rs"]
mod tests;
