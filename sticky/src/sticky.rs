use crate::common::DEFAULT_ALIAS;
use crate::errors::StickyResult;
use crate::repository::{Repository, RepositoryOptions};
use crate::schema::Schema;
use crate::sticky_builder::StickyBuilder;
use crate::sticky_config::StickyConfig;
use crate::store::{Database, StoreClient};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Entry point holding the connection registry and handing out repositories.
///
/// `Sticky` is a cheap clonable handle; every clone shares the same
/// registry, so connections configured once are visible to all
/// repositories created from any clone.
///
/// ```rust,ignore
/// use sticky::Sticky;
/// use sticky::store::memory::InMemoryClient;
///
/// let sticky = Sticky::builder()
///     .connect("library", InMemoryClient::connect())
///     .open()?;
///
/// let books = sticky.repository::<Book>()?;
/// let mut book = Book::new("1984");
/// books.save(&mut book)?;
/// ```
#[derive(Clone)]
pub struct Sticky {
    inner: Arc<StickyInner>,
}

impl Sticky {
    pub fn builder() -> StickyBuilder {
        StickyBuilder::new()
    }

    pub(crate) fn new(sticky_config: StickyConfig) -> Self {
        Sticky {
            inner: Arc::new(StickyInner { sticky_config }),
        }
    }

    pub fn config(&self) -> &StickyConfig {
        &self.inner.sticky_config
    }

    /// Registers `client` under the default alias and selects `database_name` on it.
    pub fn connect(&self, database_name: &str, client: StoreClient) -> StickyResult<()> {
        self.inner.sticky_config.connect(database_name, client)
    }

    pub fn register_connection(&self, client: StoreClient, alias: &str) -> StickyResult<()> {
        self.inner.sticky_config.register_connection(client, alias)
    }

    pub fn register_database(&self, database_name: &str, alias: &str) -> StickyResult<()> {
        self.inner.sticky_config.register_database(database_name, alias)
    }

    /// The database selected for `alias`.
    ///
    /// Fails with [ConnectionNotFound](crate::errors::ErrorKind::ConnectionNotFound)
    /// when nothing is registered under it.
    pub fn database(&self, alias: &str) -> StickyResult<Database> {
        self.inner.sticky_config.database(alias)
    }

    pub fn default_database(&self) -> StickyResult<Database> {
        self.database(DEFAULT_ALIAS)
    }

    /// Creates a repository for `T` with the defaults of its descriptor.
    pub fn repository<T: Schema>(&self) -> StickyResult<Repository<T>> {
        self.repository_with(RepositoryOptions::new())
    }

    /// Creates a repository for `T`; unset options fall back to the descriptor.
    pub fn repository_with<T: Schema>(&self, options: RepositoryOptions) -> StickyResult<Repository<T>> {
        let descriptor = T::descriptor();
        let database = self.database(&options.resolved_alias())?;
        Ok(Repository::new(
            database,
            options.resolved_primary_key(descriptor),
            options.resolved_collection_name(descriptor),
        ))
    }
}

impl Debug for Sticky {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sticky")
            .field("config", &self.inner.sticky_config)
            .finish()
    }
}

struct StickyInner {
    sticky_config: StickyConfig,
}
