//! Favorited products, mirrored to persisted storage on every change.
//!
//! The list keeps insertion order and never holds two products with the same
//! id. The full list is rewritten under the same lock as the in-memory
//! change, so storage always matches memory once a call returns (unless the
//! write itself failed, which is logged).

#[cfg(test)]
#[path = "favorites_test.rs"]
mod favorites_test;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::net::types::Product;
use crate::storage::{FAVORITES_KEY, KeyValueStore};

pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    items: Mutex<Vec<Product>>,
}

impl FavoritesStore {
    /// Empty store; call [`FavoritesStore::reload`] to read persisted items.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage, items: Mutex::new(Vec::new()) }
    }

    /// Store populated from persisted storage.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.reload();
        store
    }

    /// Replace the in-memory list with the persisted one. Unreadable or
    /// unparseable data yields an empty list; a single bad entry is dropped
    /// on its own.
    pub fn reload(&self) {
        let loaded = self.read_persisted();
        *self.lock() = loaded;
    }

    fn read_persisted(&self) -> Vec<Product> {
        let raw = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read favorites from storage");
                return Vec::new();
            }
        };
        let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "failed to parse stored favorites");
                return Vec::new();
            }
        };
        let products = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Product>(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "dropping unreadable stored favorite");
                    None
                }
            })
            .collect();
        dedupe(products)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Product>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[Product]) {
        let body = match serde_json::to_string(items) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize favorites");
                return;
            }
        };
        if let Err(e) = self.storage.set(FAVORITES_KEY, &body) {
            warn!(error = %e, "failed to save favorites to storage");
        }
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<Product> {
        self.lock().clone()
    }

    #[must_use]
    pub fn favorites_count(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.lock().iter().any(|p| p.id == product_id)
    }

    /// Append `product` unless its id is already present. Returns whether it
    /// was added.
    pub fn add_favorite(&self, product: Product) -> bool {
        let mut items = self.lock();
        if items.iter().any(|p| p.id == product.id) {
            return false;
        }
        debug!(product_id = %product.id, "favorite added");
        items.push(product);
        self.persist(&items);
        true
    }

    /// Drop the product with `product_id`. Returns whether one was removed.
    pub fn remove_favorite(&self, product_id: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|p| p.id != product_id);
        if items.len() == before {
            return false;
        }
        debug!(%product_id, "favorite removed");
        self.persist(&items);
        true
    }

    /// Add if absent, remove if present. Returns whether `product` is a
    /// favorite afterwards.
    pub fn toggle_favorite(&self, product: Product) -> bool {
        let mut items = self.lock();
        let existing = items.iter().position(|p| p.id == product.id);
        let now_favorite = match existing {
            Some(pos) => {
                items.remove(pos);
                false
            }
            None => {
                items.push(product);
                true
            }
        };
        self.persist(&items);
        now_favorite
    }
}

fn dedupe(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}
