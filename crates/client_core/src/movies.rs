use std::sync::Arc;

use async_trait::async_trait;
use shared::domain::{Actor, Director, Genre, Movie};
use tracing::info;

use crate::{catalog::CatalogSource, error::Result, request::ApiRequester};

/// Read-only catalog endpoints. Full-catalog reads are uncached here; wrap the
/// service in a [`crate::catalog::CatalogCache`] to share them.
pub struct MovieService {
    requester: Arc<ApiRequester>,
}

impl MovieService {
    pub fn new(requester: Arc<ApiRequester>) -> Self {
        Self { requester }
    }

    /// Failures here are logged only. The cache turns them into an empty
    /// catalog, so there is nothing for the user to act on.
    pub async fn all_movies(&self) -> Result<Vec<Movie>> {
        let movies: Vec<Movie> = self.requester.get_json_unreported(&["movies"]).await?;
        info!("movies: fetched catalog total={}", movies.len());
        Ok(movies)
    }

    pub async fn movie_titles(&self) -> Result<Vec<String>> {
        self.requester.get_json(&["movies", "list"]).await
    }

    pub async fn movie_by_title(&self, title: &str) -> Result<Movie> {
        self.requester.get_json(&["movies", title]).await
    }

    pub async fn genre(&self, name: &str) -> Result<Genre> {
        self.requester.get_json(&["movies", "genres", name]).await
    }

    pub async fn director(&self, name: &str) -> Result<Director> {
        self.requester.get_json(&["movies", "directors", name]).await
    }

    pub async fn actor(&self, name: &str) -> Result<Actor> {
        self.requester.get_json(&["movies", "actors", name]).await
    }

    pub async fn starring(&self, title: &str) -> Result<Vec<String>> {
        self.requester
            .get_json(&["movies", title, "starring"])
            .await
    }
}

#[async_trait]
impl CatalogSource for MovieService {
    async fn fetch_movies(&self) -> Result<Vec<Movie>> {
        self.all_movies().await
    }
}
