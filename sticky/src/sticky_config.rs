//! Connection registry shared by every repository of a [Sticky](crate::sticky::Sticky) instance.

use crate::common::DEFAULT_ALIAS;
use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::store::{Database, StoreClient};
use dashmap::DashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Maps connection aliases to store clients and selected databases.
///
/// Aliases are registered at startup and read by every repository
/// afterwards. Registering an alias again replaces the previous entry.
#[derive(Clone)]
pub struct StickyConfig {
    inner: Arc<StickyConfigInner>,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StickyConfig {
    pub fn new() -> Self {
        StickyConfig {
            inner: Arc::new(StickyConfigInner::new()),
        }
    }

    /// Registers `client` under the default alias and selects `database_name` on it.
    pub fn connect(&self, database_name: &str, client: StoreClient) -> StickyResult<()> {
        self.inner.register_connection(client, DEFAULT_ALIAS)?;
        self.inner.register_database(database_name, DEFAULT_ALIAS)
    }

    pub fn register_connection(&self, client: StoreClient, alias: &str) -> StickyResult<()> {
        self.inner.register_connection(client, alias)
    }

    pub fn register_database(&self, database_name: &str, alias: &str) -> StickyResult<()> {
        self.inner.register_database(database_name, alias)
    }

    pub fn client(&self, alias: &str) -> StickyResult<StoreClient> {
        self.inner.client(alias)
    }

    pub fn database(&self, alias: &str) -> StickyResult<Database> {
        self.inner.database(alias)
    }

    /// Registered connection aliases, sorted.
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .inner
            .clients
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        aliases.sort();
        aliases
    }
}

impl Debug for StickyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickyConfig")
            .field("aliases", &self.aliases())
            .finish()
    }
}

struct StickyConfigInner {
    clients: DashMap<String, StoreClient>,
    databases: DashMap<String, Database>,
}

impl StickyConfigInner {
    fn new() -> Self {
        StickyConfigInner {
            clients: DashMap::new(),
            databases: DashMap::new(),
        }
    }

    fn register_connection(&self, client: StoreClient, alias: &str) -> StickyResult<()> {
        if alias.is_empty() {
            log::error!("Connection alias cannot be empty");
            return Err(StickyError::new(
                "Connection alias cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        log::debug!("Registering connection {} as '{}'", client.description(), alias);
        self.clients.insert(alias.to_string(), client);
        // a new connection invalidates the database selected on the old one
        self.databases.remove(alias);
        Ok(())
    }

    fn register_database(&self, database_name: &str, alias: &str) -> StickyResult<()> {
        let client = self.client(alias)?;
        let database = client.database(database_name)?;
        log::debug!("Selecting database '{}' for '{}'", database_name, alias);
        self.databases.insert(alias.to_string(), database);
        Ok(())
    }

    fn client(&self, alias: &str) -> StickyResult<StoreClient> {
        match self.clients.get(alias) {
            Some(client) => Ok(client.clone()),
            None => {
                log::error!("No connection registered as '{}'", alias);
                Err(StickyError::new(
                    &format!("No connection registered as '{}'", alias),
                    ErrorKind::ConnectionNotFound(alias.to_string()),
                ))
            }
        }
    }

    fn database(&self, alias: &str) -> StickyResult<Database> {
        match self.databases.get(alias) {
            Some(database) => Ok(database.clone()),
            None => {
                log::error!("No database selected for '{}'", alias);
                Err(StickyError::new(
                    &format!("No database selected for '{}'", alias),
                    ErrorKind::ConnectionNotFound(alias.to_string()),
                ))
            }
        }
    }
}
