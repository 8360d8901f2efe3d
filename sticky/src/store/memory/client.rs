use super::InMemoryDatabase;
use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::store::{Database, StoreClient, StoreClientProvider};
use dashmap::DashMap;
use uuid::Uuid;

/// A store connection backed by process memory.
///
/// Every client is an isolated store; databases are created on first access
/// and shared by all handles obtained from the same client.
pub struct InMemoryClient {
    instance: Uuid,
    databases: DashMap<String, Database>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        InMemoryClient {
            instance: Uuid::new_v4(),
            databases: DashMap::new(),
        }
    }

    /// Opens a fresh in-memory store as a [StoreClient] handle.
    pub fn connect() -> StoreClient {
        StoreClient::new(InMemoryClient::new())
    }
}

impl Default for InMemoryClient {
    fn default() -> Self {
        InMemoryClient::new()
    }
}

impl StoreClientProvider for InMemoryClient {
    fn description(&self) -> String {
        format!("memory://{}", self.instance)
    }

    fn database(&self, name: &str) -> StickyResult<Database> {
        if name.is_empty() {
            log::error!("Database name cannot be empty");
            return Err(StickyError::new(
                "Database name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        let database = self
            .databases
            .entry(name.to_string())
            .or_insert_with(|| Database::new(InMemoryDatabase::new(name)))
            .clone();
        Ok(database)
    }

    fn list_database_names(&self) -> StickyResult<Vec<String>> {
        let mut names: Vec<String> = self.databases.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}
