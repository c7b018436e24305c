//! In-memory adapters.

use crate::ports::{ClientStorage, Navigator};
use parking_lot::RwLock;
use shared_types::Route;
use std::collections::HashMap;

/// Process-local client storage.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    items: RwLock<HashMap<String, String>>,
}

impl InMemoryClientStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl ClientStorage for InMemoryClientStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.write().insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.write().remove(key);
    }

    fn clear(&self) {
        self.items.write().clear();
    }
}

/// Navigator that records every redirect.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: RwLock<Vec<Route>>,
}

impl RecordingNavigator {
    /// Create a navigator with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.visited.read().clone()
    }

    /// Most recent route.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.visited.read().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visited.write().push(route);
    }
}
