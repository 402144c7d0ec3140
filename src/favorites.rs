//! Client-local "liked" listings. Never persisted; the set lives and dies
//! with the current page view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::PropertyId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    ids: HashSet<PropertyId>,
}

impl Favorites {
    /// Adds the id if absent, removes it if present. Returns whether the id
    /// is a favorite afterwards.
    pub fn toggle(&mut self, id: PropertyId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
