use futures::Stream;
use shared::domain::Movie;
use tokio::sync::watch;
use tokio_stream::{wrappers::WatchStream, StreamExt};

use crate::catalog::CatalogSnapshot;

/// Queries shorter than this (after trimming) leave the catalog unfiltered.
pub const MIN_QUERY_LEN: usize = 5;

pub fn filter_movies(movies: &[Movie], query: &str) -> Vec<Movie> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return movies.to_vec();
    }

    let needle = query.to_lowercase();
    movies
        .iter()
        .filter(|movie| matches_query(movie, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lower-cased.
pub fn matches_query(movie: &Movie, needle: &str) -> bool {
    movie.title.to_lowercase().contains(needle)
        || movie.director_name().to_lowercase().contains(needle)
        || movie.genre_name().to_lowercase().contains(needle)
        || movie.starring.join(" ").to_lowercase().contains(needle)
}

/// Emits the filtered catalog whenever either the snapshot or the query
/// changes, starting with the current pair.
pub fn filtered_movies(
    catalog: watch::Receiver<CatalogSnapshot>,
    query: watch::Receiver<String>,
) -> impl Stream<Item = Vec<Movie>> {
    // Only the catalog side yields the current value, so the first emission
    // covers the initial pair once.
    let catalog_changes = WatchStream::new(catalog.clone()).map(|_| ());
    let query_changes = WatchStream::from_changes(query.clone()).map(|_| ());

    catalog_changes.merge(query_changes).map(move |()| {
        let movies = catalog.borrow().clone();
        let query = query.borrow().clone();
        filter_movies(&movies, &query)
    })
}
