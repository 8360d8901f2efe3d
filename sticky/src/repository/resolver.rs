use crate::collection::{Document, ObjectId};
use crate::common::{Value, DOC_ID, ID_FIELD};
use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::filter::{by_id, Filter};
use crate::schema::{FieldDescriptor, Schema, SchemaDescriptor};
use crate::store::{upsert, Database, StoreCollection};
use indexmap::IndexMap;

/// Moves entity references between their stored and expanded forms.
///
/// On save, nested entities are written to their own collections and the
/// parent stores only their [ObjectId]s. On load, stored ids are looked up
/// again and replaced by the referenced documents, recursively, so the
/// schema sees a fully expanded document.
///
/// The resolver is bound to one database; referenced collections are
/// looked up in it by the target schema's collection name.
#[derive(Clone, Debug)]
pub struct ReferenceResolver {
    database: Database,
}

impl ReferenceResolver {
    pub fn new(database: Database) -> Self {
        ReferenceResolver { database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The collection storing documents of `schema`.
    pub fn collection_for(&self, schema: &SchemaDescriptor) -> StickyResult<StoreCollection> {
        self.database.collection(&schema.collection_name())
    }

    /// Fields of `schema` holding entity references, by name in declaration order.
    ///
    /// A nested field is a reference when its target declares `id`. For a
    /// polymorphic target the decision is made from `document`: the field
    /// counts when one of its values is a document whose concrete schema
    /// declares `id`, or a raw identifier.
    pub fn reference_fields<'s>(
        schema: &'s SchemaDescriptor,
        document: Option<&Document>,
    ) -> IndexMap<&'s str, &'s FieldDescriptor> {
        schema
            .fields()
            .iter()
            .filter(|field| match field.target() {
                None => false,
                Some(target) if target.has_id() => true,
                Some(target) if target.is_polymorphic() => document
                    .and_then(|d| d.get_ref(field.name()))
                    .map(|value| match value {
                        Value::Array(items) => {
                            items.iter().any(|item| Self::is_reference_value(target, item))
                        }
                        single => Self::is_reference_value(target, single),
                    })
                    .unwrap_or(false),
                Some(_) => false,
            })
            .map(|field| (field.name(), field))
            .collect()
    }

    /// Whether `value` at a field targeting `target` is an entity reference.
    fn is_reference_value(target: &'static SchemaDescriptor, value: &Value) -> bool {
        match value {
            Value::Null => false,
            _ if target.has_id() => true,
            Value::Document(document) if target.is_polymorphic() => target
                .resolve(document)
                .map(|concrete| concrete.has_id())
                .unwrap_or(false),
            Value::ObjectId(_) => target.is_polymorphic(),
            Value::String(s) => target.is_polymorphic() && ObjectId::parse(s).is_ok(),
            _ => false,
        }
    }

    /// Writes `document` and every entity it references.
    ///
    /// `document` is the dumped, expanded form of an entity of `schema`. Each
    /// non-null reference is persisted first, in its target's collection, and
    /// replaced by its id in the stored document. The stored document never
    /// carries `id`; it is upserted into `collection` by the filter built
    /// from `primary_key`.
    ///
    /// Returns the store id of the written document and the expanded
    /// document with `id` assigned at every entity level.
    ///
    /// References written before a failing write stay persisted.
    pub fn persist(
        &self,
        schema: &'static SchemaDescriptor,
        document: Document,
        primary_key: &[String],
        collection: &StoreCollection,
    ) -> StickyResult<(ObjectId, Document)> {
        let concrete = schema.resolve(&document)?;
        let mut expanded = document;
        let mut stored = expanded.clone();

        for (name, field) in Self::reference_fields(concrete, Some(&expanded)) {
            let target = match field.target() {
                Some(target) => target,
                None => continue,
            };

            let value = expanded.get_ref(name).cloned().unwrap_or_default();
            let (expanded_value, stored_value) = match value {
                Value::Null => continue,
                Value::Array(items) => {
                    let mut expanded_items = Vec::with_capacity(items.len());
                    let mut stored_items = Vec::with_capacity(items.len());
                    for item in items {
                        let (e, s) = self.persist_reference(target, item)?;
                        expanded_items.push(e);
                        stored_items.push(s);
                    }
                    (Value::Array(expanded_items), Value::Array(stored_items))
                }
                single => self.persist_reference(target, single)?,
            };

            expanded.put(name, expanded_value)?;
            stored.put(name, stored_value)?;
        }

        let supplied_id = stored.remove(ID_FIELD).unwrap_or_default();
        let filter = Self::write_filter(primary_key, &supplied_id, &stored)?;
        log::debug!(
            "Saving {} into {} by {}",
            concrete.name(),
            collection.name(),
            filter
        );

        let result = collection.update_one(&filter, &stored, &upsert())?;
        let id = match result.upserted_id {
            Some(id) => id,
            None => match filter.get(DOC_ID) {
                Some(Value::ObjectId(id)) => *id,
                _ => collection
                    .find_one(&filter)?
                    .and_then(|d| d.id())
                    .ok_or_else(|| {
                        log::error!("Saved {} document not found by {}", concrete.name(), filter);
                        StickyError::new(
                            &format!("Saved {} document not found", concrete.name()),
                            ErrorKind::StoreError,
                        )
                    })?,
            },
        };

        if concrete.has_id() {
            expanded.put(ID_FIELD, id.to_string())?;
        }
        Ok((id, expanded))
    }

    /// Persists one value of a reference field, returning its expanded and stored forms.
    fn persist_reference(
        &self,
        target: &'static SchemaDescriptor,
        value: Value,
    ) -> StickyResult<(Value, Value)> {
        match value {
            Value::Document(document) => {
                let is_entity = match target.resolve(&document) {
                    Ok(concrete) => concrete.has_id(),
                    Err(_) => target.has_id(),
                };
                if !is_entity {
                    // embedded value of a polymorphic variant without identity
                    let embedded = Value::Document(document);
                    return Ok((embedded.clone(), embedded));
                }

                let collection = self.collection_for(target)?;
                let primary_key = target
                    .default_primary_key()
                    .map(|fields| fields.to_vec())
                    .unwrap_or_else(|| vec![ID_FIELD.to_string()]);
                let (id, expanded) = self.persist(target, document, &primary_key, &collection)?;
                Ok((Value::Document(expanded), Value::ObjectId(id)))
            }
            Value::String(s) => match ObjectId::parse(&s) {
                Ok(id) => Ok((Value::String(s), Value::ObjectId(id))),
                Err(_) => Ok((Value::String(s.clone()), Value::String(s))),
            },
            other => Ok((other.clone(), other)),
        }
    }

    /// Builds the upsert filter from the primary-key fields of `stored`.
    ///
    /// `id` translates to the store key `_id`; a missing id becomes a null
    /// criterion that matches no stored document.
    fn write_filter(primary_key: &[String], supplied_id: &Value, stored: &Document) -> StickyResult<Filter> {
        let mut filter = Filter::new();
        for field in primary_key {
            if field == ID_FIELD {
                let id = match supplied_id {
                    Value::Null => Value::Null,
                    other => Value::ObjectId(to_object_id(other)?),
                };
                filter = filter.with(DOC_ID, id);
            } else {
                filter = filter.with(field, stored.get(field)?);
            }
        }
        Ok(filter)
    }

    /// Expands the stored references of `document` into the referenced documents.
    ///
    /// `None` passes through. The store key `_id` is renamed to `id` (as a
    /// string) when the schema, or the concrete schema it resolves to,
    /// declares `id` or when the schema is polymorphic; otherwise it is
    /// dropped.
    pub fn dereference(
        &self,
        schema: &'static SchemaDescriptor,
        document: Option<Document>,
    ) -> StickyResult<Option<Document>> {
        let mut document = match document {
            Some(document) => document,
            None => return Ok(None),
        };

        let concrete = schema.resolve(&document)?;
        for (name, field) in Self::reference_fields(concrete, Some(&document)) {
            let target = match field.target() {
                Some(target) => target,
                None => continue,
            };

            let resolved = match document.get_ref(name).cloned().unwrap_or_default() {
                Value::Array(items) => {
                    let mut resolved = Vec::with_capacity(items.len());
                    for item in items {
                        resolved.push(self.dereference_value(target, item)?);
                    }
                    Value::Array(resolved)
                }
                single => self.dereference_value(target, single)?,
            };
            document.put(name, resolved)?;
        }

        if let Some(id) = document.remove(DOC_ID) {
            if schema.has_id() || concrete.has_id() || schema.is_polymorphic() {
                document.put(ID_FIELD, id_string(&id))?;
            }
        }
        Ok(Some(document))
    }

    fn dereference_value(&self, target: &'static SchemaDescriptor, value: Value) -> StickyResult<Value> {
        let id = match &value {
            Value::ObjectId(id) => *id,
            Value::String(s) => match ObjectId::parse(s) {
                Ok(id) => id,
                Err(_) => return Ok(value),
            },
            // null or an embedded value
            _ => return Ok(value),
        };

        let collection = self.collection_for(target)?;
        let referenced = collection.find_one(&by_id(id))?;
        if referenced.is_none() {
            log::warn!(
                "Dangling reference {} to {} in collection {}",
                id,
                target.name(),
                collection.name()
            );
        }

        Ok(match self.dereference(target, referenced)? {
            Some(document) => Value::Document(document),
            None => Value::Null,
        })
    }

    /// Loads a domain object from an expanded document.
    ///
    /// Polymorphic entities get a single retry when the load fails with
    /// exactly [ErrorKind::UnknownField] on `id`: the concrete variant does
    /// not declare `id` even though the stored document had one. The retry
    /// strips `id`; every other failure propagates unchanged.
    pub fn load<T: Schema>(&self, document: &Document) -> StickyResult<T> {
        match T::load(document) {
            Ok(entity) => Ok(entity),
            Err(e) if Self::is_polymorphic_id_mismatch::<T>(&e, document) => {
                log::warn!(
                    "Retrying load of {} without '{}': {}",
                    T::descriptor().name(),
                    ID_FIELD,
                    e.message()
                );
                let mut stripped = document.clone();
                stripped.remove(ID_FIELD);
                T::load(&stripped)
            }
            Err(e) => Err(e),
        }
    }

    fn is_polymorphic_id_mismatch<T: Schema>(error: &StickyError, document: &Document) -> bool {
        T::descriptor().is_polymorphic()
            && matches!(error.kind(), ErrorKind::UnknownField(field) if field == ID_FIELD)
            && document.contains_key(ID_FIELD)
    }

    /// Dereferences a stored document and loads it as `T`.
    pub fn to_object<T: Schema>(&self, document: Option<Document>) -> StickyResult<Option<T>> {
        match self.dereference(T::descriptor(), document)? {
            Some(expanded) => Ok(Some(self.load::<T>(&expanded)?)),
            None => Ok(None),
        }
    }
}

/// Converts a domain id value into a store id, failing with [ErrorKind::InvalidId].
pub(crate) fn to_object_id(value: &Value) -> StickyResult<ObjectId> {
    match value {
        Value::ObjectId(id) => Ok(*id),
        Value::String(s) => ObjectId::parse(s),
        other => {
            log::error!("Value {} is not a valid id", other);
            Err(StickyError::new(
                &format!("Value {} is not a valid id", other),
                ErrorKind::InvalidId,
            ))
        }
    }
}

fn id_string(value: &Value) -> Value {
    match value {
        Value::ObjectId(id) => Value::String(id.to_string()),
        other => other.clone(),
    }
}

/// Rewrites every criterion on `id` into a criterion on the store key `_id`,
/// keeping the order of criteria.
pub(crate) fn translate_id_filter(filter: Filter) -> StickyResult<Filter> {
    let mut translated = Filter::new();
    for (name, value) in filter.criteria() {
        translated = if name == ID_FIELD {
            match value {
                Value::Null => translated.with(DOC_ID, Value::Null),
                other => translated.with(DOC_ID, to_object_id(other)?),
            }
        } else {
            translated.with(name, value.clone())
        };
    }
    Ok(translated)
}
