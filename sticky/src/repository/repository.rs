use super::cursor::Cursor;
use super::resolver::{to_object_id, translate_id_filter, ReferenceResolver};
use crate::collection::ObjectId;
use crate::common::{Value, DOC_ID, ID_FIELD};
use crate::errors::{EntityTag, ErrorKind, StickyError, StickyResult};
use crate::filter::{by_id, Filter};
use crate::schema::{Schema, SchemaDescriptor};
use crate::store::{Database, StoreCollection};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

/// Typed access to the stored entities of one schema.
///
/// A repository saves entities together with everything they reference,
/// fetches single entities with `get`, iterates matches with `find` and
/// deletes by identity. Repositories are cheap to clone; clones share the
/// underlying collection handle.
///
/// ```rust,ignore
/// let books = sticky.repository::<Book>()?;
/// let mut book = Book { id: None, title: "1984".into(), author: Some(orwell) };
/// books.save(&mut book)?;
/// let same = books.get(field("title").eq("1984"))?;
/// ```
pub struct Repository<T: Schema> {
    inner: Arc<RepositoryInner>,
    _phantom: PhantomData<fn() -> T>,
}

struct RepositoryInner {
    resolver: ReferenceResolver,
    schema: &'static SchemaDescriptor,
    primary_key: Vec<String>,
    collection_name: String,
    collection: OnceLock<StoreCollection>,
}

impl<T: Schema> Repository<T> {
    pub(crate) fn new(database: Database, primary_key: Vec<String>, collection_name: String) -> Self {
        log::debug!(
            "Opening repository for {} on {}.{} keyed by {:?}",
            T::descriptor().name(),
            database.name(),
            collection_name,
            primary_key
        );
        Repository {
            inner: Arc::new(RepositoryInner {
                resolver: ReferenceResolver::new(database),
                schema: T::descriptor(),
                primary_key,
                collection_name,
                collection: OnceLock::new(),
            }),
            _phantom: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static SchemaDescriptor {
        self.inner.schema
    }

    pub fn primary_key(&self) -> &[String] {
        &self.inner.primary_key
    }

    pub fn collection_name(&self) -> &str {
        &self.inner.collection_name
    }

    /// The store collection backing this repository, looked up once.
    pub fn collection(&self) -> StickyResult<StoreCollection> {
        if let Some(collection) = self.inner.collection.get() {
            return Ok(collection.clone());
        }
        let collection = self
            .inner
            .resolver
            .database()
            .collection(&self.inner.collection_name)?;
        Ok(self.inner.collection.get_or_init(|| collection).clone())
    }

    /// Saves `entity` and every entity it references.
    ///
    /// Documents are upserted by the primary key: a stored document with the
    /// same key values is overwritten, otherwise a new one is created. On
    /// success `entity` is replaced by its reloaded form, so generated ids
    /// become visible at every level.
    pub fn save(&self, entity: &mut T) -> StickyResult<ObjectId> {
        let document = entity.dump()?;
        let collection = self.collection()?;
        let (id, expanded) = self.inner.resolver.persist(
            self.inner.schema,
            document,
            &self.inner.primary_key,
            &collection,
        )?;
        *entity = self.inner.resolver.load::<T>(&expanded)?;
        log::debug!("Saved {} with id {}", self.inner.schema.name(), id);
        Ok(id)
    }

    /// Fetches the single entity matching `filter`.
    ///
    /// Fails with [ErrorKind::DoesNotExist] when nothing matches and with
    /// [ErrorKind::MultipleObjectsReturned] when more than one document does;
    /// both carry this entity type.
    pub fn get(&self, filter: Filter) -> StickyResult<T> {
        let filter = translate_id_filter(filter)?;
        let collection = self.collection()?;

        let count = collection.count_documents(&filter)?;
        match count {
            0 => {
                log::debug!("No {} matches {}", self.inner.schema.name(), filter);
                Err(StickyError::new(
                    &format!("{} matching {} does not exist", self.inner.schema.name(), filter),
                    ErrorKind::DoesNotExist(EntityTag::of::<T>()),
                ))
            }
            1 => {
                let document = collection.find_one(&filter)?;
                match self.inner.resolver.to_object::<T>(document)? {
                    Some(entity) => Ok(entity),
                    // removed between count and fetch
                    None => Err(StickyError::new(
                        &format!("{} matching {} does not exist", self.inner.schema.name(), filter),
                        ErrorKind::DoesNotExist(EntityTag::of::<T>()),
                    )),
                }
            }
            _ => {
                log::debug!("{} documents of {} match {}", count, self.inner.schema.name(), filter);
                Err(StickyError::new(
                    &format!(
                        "get() returned {} {} documents matching {}",
                        count,
                        self.inner.schema.name(),
                        filter
                    ),
                    ErrorKind::MultipleObjectsReturned(EntityTag::of::<T>()),
                ))
            }
        }
    }

    /// Fetches the entity stored under `id`.
    pub fn get_by_id(&self, id: ObjectId) -> StickyResult<T> {
        self.get(by_id(id))
    }

    /// Returns a lazy cursor over the entities matching `filter`.
    ///
    /// Nothing is read until the cursor is iterated.
    pub fn find(&self, filter: Filter) -> StickyResult<Cursor<T>> {
        let filter = translate_id_filter(filter)?;
        Ok(Cursor::new(
            self.collection()?,
            self.inner.resolver.clone(),
            filter,
        ))
    }

    /// Deletes the stored document of `entity`.
    ///
    /// With the default `id` key the entity must carry an id, otherwise this
    /// fails with [ErrorKind::NotIdentifiable]. With a custom primary key the
    /// document matching the entity's key values is deleted. Referenced
    /// entities are left untouched. Returns whether a document was deleted.
    pub fn delete(&self, entity: &T) -> StickyResult<bool> {
        let document = entity.dump()?;
        let mut filter = Filter::new();
        for field in &self.inner.primary_key {
            if field == ID_FIELD {
                let id = match document.get_ref(ID_FIELD) {
                    None | Some(Value::Null) => {
                        log::error!("Cannot delete {} without an id", self.inner.schema.name());
                        return Err(StickyError::new(
                            &format!("Cannot delete {} without an id", self.inner.schema.name()),
                            ErrorKind::NotIdentifiable,
                        ));
                    }
                    Some(value) => to_object_id(value)?,
                };
                filter = filter.with(DOC_ID, id);
            } else {
                filter = filter.with(field, document.get(field)?);
            }
        }

        let result = self.collection()?.delete_one(&filter)?;
        log::debug!(
            "Deleted {} {} document(s) by {}",
            result.deleted_count,
            self.inner.schema.name(),
            filter
        );
        Ok(result.deleted_count > 0)
    }

    /// Deletes every document matching `filter` and returns how many were removed.
    pub fn delete_many(&self, filter: Filter) -> StickyResult<u64> {
        let filter = translate_id_filter(filter)?;
        let result = self.collection()?.delete_many(&filter)?;
        log::debug!(
            "Deleted {} {} document(s) by {}",
            result.deleted_count,
            self.inner.schema.name(),
            filter
        );
        Ok(result.deleted_count)
    }

    /// Number of stored documents matching `filter`.
    pub fn count(&self, filter: Filter) -> StickyResult<u64> {
        let filter = translate_id_filter(filter)?;
        self.collection()?.count_documents(&filter)
    }
}

impl<T: Schema> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            inner: self.inner.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Schema> Debug for Repository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("schema", &self.inner.schema.name())
            .field("collection", &self.inner.collection_name)
            .field("primary_key", &self.inner.primary_key)
            .finish()
    }
}
