//! Favorites toggle with the server as the single source of truth.
//!
//! Nothing flips locally before the server answers: the session user is
//! replaced wholesale by the server's response, and favorite state is always
//! derived from that last confirmed snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use shared::domain::{Movie, MovieId, User};
use tracing::{info, warn};

use crate::{
    error::Result,
    notice::{Notifier, DEFAULT_NOTICE, ERROR_NOTICE, SHORT_NOTICE},
    session::SessionStore,
};

#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn add_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User>;
    async fn remove_favorite(&self, username: &str, movie_id: &MovieId) -> Result<User>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Added,
    Removed,
}

impl FavoriteAction {
    fn phrase(self) -> &'static str {
        match self {
            Self::Added => "added to",
            Self::Removed => "removed from",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied { action: FavoriteAction, user: User },
    NotAuthenticated,
}

pub struct FavoritesReconciler {
    api: Arc<dyn FavoritesApi>,
    session: Arc<SessionStore>,
    notifier: Notifier,
}

impl FavoritesReconciler {
    pub fn new(api: Arc<dyn FavoritesApi>, session: Arc<SessionStore>, notifier: Notifier) -> Self {
        Self {
            api,
            session,
            notifier,
        }
    }

    /// Toggles for the session user. A stored user without a token counts as
    /// logged out.
    pub async fn toggle_for_session(&self, movie: &Movie) -> Result<ToggleOutcome> {
        let user = if self.session.is_authenticated().await {
            self.session.user().await?
        } else {
            None
        };
        self.toggle_favorite(user.as_ref(), movie).await
    }

    pub async fn toggle_favorite(&self, user: Option<&User>, movie: &Movie) -> Result<ToggleOutcome> {
        let Some(user) = user.filter(|_| !movie.id.is_empty()) else {
            self.notifier
                .info("Please log in to manage favorites.", DEFAULT_NOTICE);
            return Ok(ToggleOutcome::NotAuthenticated);
        };

        let action = if user.has_favorite(&movie.id) {
            FavoriteAction::Removed
        } else {
            FavoriteAction::Added
        };

        let response = match action {
            FavoriteAction::Added => self.api.add_favorite(&user.username, &movie.id).await,
            FavoriteAction::Removed => self.api.remove_favorite(&user.username, &movie.id).await,
        };

        let updated = match response {
            Ok(updated) => updated,
            Err(err) => {
                warn!(
                    "favorites: toggle failed username={} movie={} action={action:?} error={err}",
                    user.username, movie.id
                );
                self.notifier.error(
                    format!("Could not update favorites for {}.", movie.title),
                    ERROR_NOTICE,
                );
                return Err(err);
            }
        };

        self.session.set_user(&updated).await?;
        info!(
            "favorites: reconciled username={} movie={} action={action:?} total={}",
            updated.username,
            movie.id,
            updated.favorites.len()
        );
        self.notifier.success(
            format!("{} {} favorites.", movie.title, action.phrase()),
            SHORT_NOTICE,
        );

        Ok(ToggleOutcome::Applied {
            action,
            user: updated,
        })
    }
}

pub fn is_favorite(user: Option<&User>, movie: &Movie) -> bool {
    match user {
        Some(user) if !movie.id.is_empty() => user.has_favorite(&movie.id),
        _ => false,
    }
}

/// Catalog movies in the user's favorites. Ids missing from the catalog are skipped.
pub fn favorite_movies<'a>(user: &User, catalog: &'a [Movie]) -> Vec<&'a Movie> {
    catalog
        .iter()
        .filter(|movie| user.has_favorite(&movie.id))
        .collect()
}

#[cfg(test)]
#[path = "tests/favorites_tests.rs"]
mod tests;
