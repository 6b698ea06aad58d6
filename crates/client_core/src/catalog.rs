//! Memoized full-catalog reads.
//!
//! The first [`CatalogCache::fetch_all`] performs the network read; every
//! later or concurrent caller shares its result. A failed read resolves to an
//! empty snapshot so dependent views always get a collection. Only
//! [`CatalogCache::refresh`] replaces the snapshot.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use shared::domain::Movie;
use tokio::sync::{OnceCell, RwLock};
use tracing::{error, info};

use crate::error::Result;

pub type CatalogSnapshot = Arc<Vec<Movie>>;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_movies(&self) -> Result<Vec<Movie>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Pending,
    Resolved { movies: usize },
}

#[derive(Default)]
struct CatalogSlot {
    in_flight: AtomicBool,
    snapshot: OnceCell<CatalogSnapshot>,
}

/// Marks a read as in flight until dropped, so a cancelled read falls back to
/// `Uninitialized` instead of staying `Pending`.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    slot: RwLock<Arc<CatalogSlot>>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            slot: RwLock::new(Arc::new(CatalogSlot::default())),
        }
    }

    pub async fn fetch_all(&self) -> CatalogSnapshot {
        let slot = Arc::clone(&*self.slot.read().await);
        slot.snapshot
            .get_or_init(|| async {
                let _in_flight = InFlight::start(&slot.in_flight);
                match self.source.fetch_movies().await {
                    Ok(movies) => {
                        info!("catalog: cached movies total={}", movies.len());
                        Arc::new(movies)
                    }
                    Err(err) => {
                        error!("catalog: fetch failed, serving empty catalog error={err}");
                        Arc::new(Vec::new())
                    }
                }
            })
            .await
            .clone()
    }

    /// Drops the current snapshot and reads the catalog again.
    pub async fn refresh(&self) -> CatalogSnapshot {
        {
            let mut slot = self.slot.write().await;
            *slot = Arc::new(CatalogSlot::default());
        }
        info!("catalog: snapshot invalidated");
        self.fetch_all().await
    }

    pub async fn state(&self) -> CatalogState {
        let slot = self.slot.read().await;
        match slot.snapshot.get() {
            Some(movies) => CatalogState::Resolved {
                movies: movies.len(),
            },
            None if slot.in_flight.load(Ordering::SeqCst) => CatalogState::Pending,
            None => CatalogState::Uninitialized,
        }
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
