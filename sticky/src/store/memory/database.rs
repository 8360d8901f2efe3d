use super::InMemoryCollection;
use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::store::{DatabaseProvider, StoreCollection};
use dashmap::DashMap;

/// A named database whose collections are created on first access.
pub struct InMemoryDatabase {
    name: String,
    collections: DashMap<String, StoreCollection>,
}

impl InMemoryDatabase {
    pub fn new(name: &str) -> Self {
        InMemoryDatabase {
            name: name.to_string(),
            collections: DashMap::new(),
        }
    }
}

impl DatabaseProvider for InMemoryDatabase {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn collection(&self, name: &str) -> StickyResult<StoreCollection> {
        if name.is_empty() {
            log::error!("Collection name cannot be empty in database {}", self.name);
            return Err(StickyError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating collection {} in database {}", name, self.name);
                StoreCollection::new(InMemoryCollection::new(name))
            })
            .clone();
        Ok(collection)
    }

    fn list_collection_names(&self) -> StickyResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    fn drop_collection(&self, name: &str) -> StickyResult<()> {
        self.collections.remove(name);
        Ok(())
    }
}
