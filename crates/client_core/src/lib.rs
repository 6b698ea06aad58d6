use std::sync::Arc;

use shared::domain::{Movie, User};
use tokio::sync::broadcast;
use tracing::info;

pub mod auth;
pub mod carousel;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod forms;
pub mod movies;
pub mod notice;
pub mod profile;
pub mod request;
pub mod session;
pub mod storage;
pub mod users;
pub mod view;

pub use auth::AuthService;
pub use carousel::Carousel;
pub use catalog::{CatalogCache, CatalogSnapshot, CatalogSource, CatalogState};
pub use error::{ClientError, Result};
pub use favorites::{FavoriteAction, FavoritesApi, FavoritesReconciler, ToggleOutcome};
pub use forms::{LoginForm, ProfileForm, RegistrationForm};
pub use movies::MovieService;
pub use notice::{Notice, NoticeLevel, Notifier};
pub use profile::{ProfileEditor, ProfileSaveOutcome};
pub use request::ApiRequester;
pub use session::SessionStore;
pub use storage::{FileLocalStorage, LocalStorage, MemoryLocalStorage};
pub use users::UserService;
pub use view::CatalogBrowser;

/// Everything a front end needs, wired around one session and one notice
/// channel.
pub struct KinoClient {
    session: Arc<SessionStore>,
    notifier: Notifier,
    auth: AuthService,
    movies: Arc<MovieService>,
    users: Arc<UserService>,
    catalog: CatalogCache,
    favorites: FavoritesReconciler,
    profile: ProfileEditor,
}

impl KinoClient {
    pub fn new(api_url: &str, storage: impl LocalStorage + 'static) -> Result<Self> {
        let session = Arc::new(SessionStore::new(storage));
        let notifier = Notifier::default();
        let requester = Arc::new(ApiRequester::new(
            api_url,
            Arc::clone(&session),
            notifier.clone(),
        )?);

        let movies = Arc::new(MovieService::new(Arc::clone(&requester)));
        let users = Arc::new(UserService::new(Arc::clone(&requester)));
        let catalog = CatalogCache::new(Arc::clone(&movies) as Arc<dyn CatalogSource>);
        let favorites = FavoritesReconciler::new(
            Arc::clone(&users) as Arc<dyn FavoritesApi>,
            Arc::clone(&session),
            notifier.clone(),
        );
        let profile = ProfileEditor::new(Arc::clone(&users), Arc::clone(&session), notifier.clone());

        info!("client: configured api_url={}", requester.base_url());
        Ok(Self {
            session,
            notifier,
            auth: AuthService::new(requester),
            movies,
            users,
            catalog,
            favorites,
            profile,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn movies(&self) -> &MovieService {
        &self.movies
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    pub fn favorites(&self) -> &FavoritesReconciler {
        &self.favorites
    }

    pub fn profile(&self) -> &ProfileEditor {
        &self.profile
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        self.auth.login(&LoginForm::new(username, password)).await
    }

    pub async fn browser(&self) -> CatalogBrowser {
        CatalogBrowser::new(self.catalog.fetch_all().await)
    }

    /// Favorite movies of the session user, resolved against the cached catalog.
    pub async fn favorite_movies(&self) -> Result<Vec<Movie>> {
        let Some(user) = self.session.user().await? else {
            return Err(ClientError::NotAuthenticated);
        };
        let catalog = self.catalog.fetch_all().await;
        Ok(favorites::favorite_movies(&user, &catalog)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Looks a movie up in the cached catalog by id, then by exact title.
    pub async fn find_movie(&self, id_or_title: &str) -> Option<Movie> {
        let catalog = self.catalog.fetch_all().await;
        catalog
            .iter()
            .find(|movie| movie.id.as_str() == id_or_title)
            .or_else(|| {
                catalog
                    .iter()
                    .find(|movie| movie.title.eq_ignore_ascii_case(id_or_title))
            })
            .cloned()
    }

    pub async fn toggle_favorite(&self, movie: &Movie) -> Result<ToggleOutcome> {
        self.favorites.toggle_for_session(movie).await
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
