use super::{DeleteResult, DocumentStream, FindOptions, UpdateOptions, UpdateResult};
use crate::collection::Document;
use crate::errors::StickyResult;
use crate::filter::Filter;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// A connection to a document store.
///
/// Drivers implement this to hand out named databases. Asking for a
/// database that does not exist yet creates it, like document stores do.
pub trait StoreClientProvider: Send + Sync {
    /// A human readable description of the connection, used in logs.
    fn description(&self) -> String;

    /// Returns the database with the given name.
    fn database(&self, name: &str) -> StickyResult<Database>;

    fn list_database_names(&self) -> StickyResult<Vec<String>>;
}

/// A named database holding collections of documents.
pub trait DatabaseProvider: Send + Sync {
    fn name(&self) -> String;

    /// Returns the collection with the given name, creating it when absent.
    fn collection(&self, name: &str) -> StickyResult<StoreCollection>;

    fn list_collection_names(&self) -> StickyResult<Vec<String>>;

    /// Drops the collection with all its documents.
    fn drop_collection(&self, name: &str) -> StickyResult<()>;
}

/// Document CRUD primitives of one collection.
pub trait StoreCollectionProvider: Send + Sync {
    fn name(&self) -> String;

    /// Finds documents matching `filter`, ordered, skipped and limited per `options`.
    fn find(&self, filter: &Filter, options: &FindOptions) -> StickyResult<DocumentStream>;

    /// Finds the first document matching `filter`.
    fn find_one(&self, filter: &Filter) -> StickyResult<Option<Document>> {
        match self.find(filter, &FindOptions::new().limit(1))?.next() {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    fn count_documents(&self, filter: &Filter) -> StickyResult<u64>;

    /// Sets the fields of `update` on the first document matching `filter`.
    ///
    /// When nothing matches and the options request an upsert, a document
    /// built from the filter's equality fields and `update` is inserted. A
    /// missing `_id` is generated and reported as `upserted_id`.
    fn update_one(
        &self,
        filter: &Filter,
        update: &Document,
        options: &UpdateOptions,
    ) -> StickyResult<UpdateResult>;

    fn delete_one(&self, filter: &Filter) -> StickyResult<DeleteResult>;

    fn delete_many(&self, filter: &Filter) -> StickyResult<DeleteResult>;
}

/// A clonable handle to a store connection.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<dyn StoreClientProvider>,
}

impl StoreClient {
    pub fn new<T: StoreClientProvider + 'static>(inner: T) -> Self {
        StoreClient {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreClient {
    type Target = Arc<dyn StoreClientProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for StoreClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreClient({})", self.inner.description())
    }
}

/// A clonable handle to a database.
#[derive(Clone)]
pub struct Database {
    inner: Arc<dyn DatabaseProvider>,
}

impl Database {
    pub fn new<T: DatabaseProvider + 'static>(inner: T) -> Self {
        Database {
            inner: Arc::new(inner),
        }
    }

    /// Checks whether both handles point at the same database instance.
    pub fn same_as(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for Database {
    type Target = Arc<dyn DatabaseProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database({})", self.inner.name())
    }
}

/// A clonable handle to a collection.
#[derive(Clone)]
pub struct StoreCollection {
    inner: Arc<dyn StoreCollectionProvider>,
}

impl StoreCollection {
    pub fn new<T: StoreCollectionProvider + 'static>(inner: T) -> Self {
        StoreCollection {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreCollection {
    type Target = Arc<dyn StoreCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for StoreCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "StoreCollection({})", self.inner.name())
    }
}
