use std::sync::Arc;

use shared::domain::Movie;

use crate::{carousel::Carousel, catalog::CatalogSnapshot, filter::filter_movies};

/// Search box, filtered result and carousel over one catalog snapshot.
pub struct CatalogBrowser {
    catalog: CatalogSnapshot,
    query: String,
    filtered: Vec<Movie>,
    carousel: Carousel,
}

impl CatalogBrowser {
    pub fn new(catalog: CatalogSnapshot) -> Self {
        let filtered = catalog.as_ref().clone();
        Self {
            catalog,
            query: String::new(),
            filtered,
            carousel: Carousel::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Arc::new(Vec::new()))
    }

    pub fn set_catalog(&mut self, catalog: CatalogSnapshot) {
        self.catalog = catalog;
        self.filtered = filter_movies(&self.catalog, &self.query);
    }

    /// A new query always restarts the carousel.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.filtered = filter_movies(&self.catalog, &self.query);
        self.carousel.reset();
    }

    pub fn next(&mut self) {
        self.carousel.next(self.filtered.len());
    }

    pub fn previous(&mut self) {
        self.carousel.previous(self.filtered.len());
    }

    pub fn visible(&self) -> Vec<&Movie> {
        self.carousel.visible_window(&self.filtered)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> &[Movie] {
        &self.filtered
    }

    pub fn catalog(&self) -> &[Movie] {
        &self.catalog
    }

    pub fn position(&self) -> usize {
        self.carousel.position()
    }
}
