//! Published index handle.
//!
//! A [`SearchHandle`] is created at startup and passed to whatever serves
//! requests. Indexes are built off to the side and swapped in whole with
//! [`SearchHandle::publish`]; a search clones the current `Arc` and runs
//! without holding the lock, so a swap never blocks on, or changes the answer
//! of, a search already in flight.

use std::sync::Arc;

use grub_types::{ConfigError, FoodRecord, Nutrient, SearchConfig, SearchError, SearchHit, Weight};
use parking_lot::RwLock;
use tracing::info;

use crate::index::{FoodIndex, QueryEngine};

/// Shared entry point for searching the currently published index.
#[derive(Debug)]
pub struct SearchHandle {
    engine: QueryEngine,
    current: RwLock<Option<Arc<FoodIndex>>>,
}

impl SearchHandle {
    /// Creates a handle with nothing published.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is out of range.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: QueryEngine::new(config)?,
            current: RwLock::new(None),
        })
    }

    /// Creates a handle with `index` already published.
    pub fn with_index(config: SearchConfig, index: FoodIndex) -> Result<Self, ConfigError> {
        let handle = Self::new(config)?;
        handle.publish(index);
        Ok(handle)
    }

    /// Publishes a fully built index, returning the one it replaces.
    pub fn publish(&self, index: FoodIndex) -> Option<Arc<FoodIndex>> {
        let stats = index.stats();
        let next = Arc::new(index);
        let previous = self.current.write().replace(next);
        info!(%stats, replaced = previous.is_some(), "index published");
        previous
    }

    /// Returns `true` once an index has been published.
    pub fn is_published(&self) -> bool {
        self.current.read().is_some()
    }

    /// Returns the current index.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::IndexNotBuilt`] before the first publish.
    pub fn snapshot(&self) -> Result<Arc<FoodIndex>, SearchError> {
        self.current
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(SearchError::IndexNotBuilt)
    }

    /// Searches the current index.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::IndexNotBuilt`] before the first publish, and
    /// otherwise whatever [`QueryEngine::search`] reports.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let index = self.snapshot()?;
        self.engine.search(index.as_ref(), query)
    }

    /// Looks up a food by id in the current index.
    pub fn food(&self, id: &str) -> Result<Option<FoodRecord>, SearchError> {
        Ok(self.snapshot()?.get(id).cloned())
    }

    /// Household weights for a food in the current index.
    pub fn weights(&self, food_id: &str) -> Result<Vec<Weight>, SearchError> {
        let index = self.snapshot()?;
        Ok(index.catalog().weights(food_id).into_iter().cloned().collect())
    }

    /// Nutrients for a food in the current index, in display order.
    ///
    /// # Errors
    ///
    /// [`SearchError::Catalog`] if a value names an unknown definition.
    pub fn nutrients(&self, food_id: &str) -> Result<Vec<Nutrient>, SearchError> {
        Ok(self.snapshot()?.catalog().nutrients(food_id)?)
    }
}
