use crate::collection::{Document, ObjectId};
use crate::common::{SortOrder, SortableFields, Value, DOC_ID};
use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::filter::Filter;
use crate::store::{
    DeleteResult, DocumentStream, FindOptions, StoreCollectionProvider, UpdateOptions,
    UpdateResult,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::cmp::Ordering;

/// A collection whose documents are kept in insertion order in memory.
pub struct InMemoryCollection {
    name: String,
    documents: RwLock<IndexMap<ObjectId, Document>>,
}

impl InMemoryCollection {
    pub fn new(name: &str) -> Self {
        InMemoryCollection {
            name: name.to_string(),
            documents: RwLock::new(IndexMap::new()),
        }
    }

    /// Ids of matching documents in insertion order.
    fn matching_ids(documents: &IndexMap<ObjectId, Document>, filter: &Filter) -> Vec<ObjectId> {
        // direct lookup when the filter pins the store id
        if let Some(Value::ObjectId(id)) = filter.get(DOC_ID) {
            return match documents.get(id) {
                Some(doc) if filter.matches(doc) => vec![*id],
                _ => Vec::new(),
            };
        }

        documents
            .iter()
            .filter(|(_, doc)| filter.matches(doc))
            .map(|(id, _)| *id)
            .collect()
    }

    fn compare(a: &Document, b: &Document, sort_by: &SortableFields) -> Ordering {
        for (field, order) in sort_by.sorting_order() {
            let left = a.get(field).unwrap_or_default();
            let right = b.get(field).unwrap_or_default();
            let ordering = match order {
                SortOrder::Ascending => left.cmp(&right),
                SortOrder::Descending => right.cmp(&left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn apply_update(existing: &Document, update: &Document) -> StickyResult<Document> {
        let mut updated = existing.clone();
        for (key, value) in update.iter() {
            if key == DOC_ID {
                if existing.get_ref(DOC_ID) != Some(value) {
                    log::error!("Attempt to change {} of document {:?}", DOC_ID, existing.id());
                    return Err(StickyError::new(
                        &format!("Field {} is immutable", DOC_ID),
                        ErrorKind::InvalidOperation,
                    ));
                }
                continue;
            }
            updated.put(key, value.clone())?;
        }
        Ok(updated)
    }
}

impl StoreCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> StickyResult<DocumentStream> {
        let documents = self.documents.read();
        let mut results: Vec<Document> = Self::matching_ids(&documents, filter)
            .into_iter()
            .filter_map(|id| documents.get(&id).cloned())
            .collect();
        drop(documents);

        if !options.sorting().is_empty() {
            // stable, ties keep insertion order
            results.sort_by(|a, b| Self::compare(a, b, options.sorting()));
        }

        let skip = options.skip_count().unwrap_or(0) as usize;
        // a zero limit means no limit
        let limit = options
            .limit_count()
            .filter(|l| *l > 0)
            .map(|l| l as usize)
            .unwrap_or(usize::MAX);
        let results: Vec<Document> = results.into_iter().skip(skip).take(limit).collect();

        log::debug!(
            "Found {} documents in {} for {}",
            results.len(),
            self.name,
            filter
        );
        Ok(DocumentStream::from_documents(results))
    }

    fn count_documents(&self, filter: &Filter) -> StickyResult<u64> {
        let documents = self.documents.read();
        Ok(Self::matching_ids(&documents, filter).len() as u64)
    }

    fn update_one(
        &self,
        filter: &Filter,
        update: &Document,
        options: &UpdateOptions,
    ) -> StickyResult<UpdateResult> {
        let mut documents = self.documents.write();

        if let Some(id) = Self::matching_ids(&documents, filter).into_iter().next() {
            let existing = documents.get_mut(&id).ok_or_else(|| {
                StickyError::new("Matched document vanished", ErrorKind::InternalError)
            })?;
            let updated = Self::apply_update(existing, update)?;
            let modified = updated != *existing;
            *existing = updated;
            return Ok(UpdateResult::matched(modified));
        }

        if !options.is_upsert() {
            return Ok(UpdateResult::default());
        }

        let mut document = filter.to_document();
        for (key, value) in update.iter() {
            document.put(key, value.clone())?;
        }

        let id = match document.id() {
            Some(id) => id,
            None => {
                let id = ObjectId::new();
                document.put(DOC_ID, id)?;
                id
            }
        };

        if documents.contains_key(&id) {
            log::error!("Duplicate {} {} in collection {}", DOC_ID, id, self.name);
            return Err(StickyError::new(
                &format!("Duplicate {} {} in collection {}", DOC_ID, id, self.name),
                ErrorKind::StoreError,
            ));
        }

        log::debug!("Inserted document {} into {}", id, self.name);
        documents.insert(id, document);
        Ok(UpdateResult::upserted(id))
    }

    fn delete_one(&self, filter: &Filter) -> StickyResult<DeleteResult> {
        let mut documents = self.documents.write();
        match Self::matching_ids(&documents, filter).into_iter().next() {
            Some(id) => {
                documents.shift_remove(&id);
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }

    fn delete_many(&self, filter: &Filter) -> StickyResult<DeleteResult> {
        let mut documents = self.documents.write();
        let before = documents.len();
        documents.retain(|_, doc| !filter.matches(doc));
        Ok(DeleteResult::new((before - documents.len()) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::filter::{all, by_id, field};
    use crate::store::upsert;

    fn insert(collection: &InMemoryCollection, document: Document) -> ObjectId {
        let filter = Filter::new().with(DOC_ID, Value::Null);
        collection
            .update_one(&filter, &document, &upsert())
            .unwrap()
            .upserted_id
            .unwrap()
    }

    fn titles(stream: DocumentStream) -> Vec<String> {
        stream
            .map(|d| d.unwrap().get("title").unwrap().as_string().unwrap().clone())
            .collect()
    }

    #[test]
    fn upsert_with_null_id_generates_id() {
        let collection = InMemoryCollection::new("book");
        let id = insert(&collection, doc! { title: "1984" });
        let stored = collection.find_one(&by_id(id)).unwrap().unwrap();
        assert_eq!(stored.id(), Some(id));
        assert_eq!(stored.get("title").unwrap(), Value::from("1984"));
    }

    #[test]
    fn upsert_merges_filter_fields() {
        let collection = InMemoryCollection::new("foo");
        let filter = field("bar").eq("x").and(field("baz").eq("y"));
        let result = collection
            .update_one(&filter, &doc! { qux: 1 }, &upsert())
            .unwrap();
        assert!(result.upserted_id.is_some());

        let stored = collection.find_one(&filter).unwrap().unwrap();
        assert_eq!(stored.get("bar").unwrap(), Value::from("x"));
        assert_eq!(stored.get("qux").unwrap(), Value::I64(1));
    }

    #[test]
    fn update_sets_fields_on_match() {
        let collection = InMemoryCollection::new("book");
        let id = insert(&collection, doc! { title: "1984", year: 1949 });

        let result = collection
            .update_one(&by_id(id), &doc! { title: "Animal Farm" }, &upsert())
            .unwrap();
        assert_eq!(result, UpdateResult::matched(true));

        let stored = collection.find_one(&by_id(id)).unwrap().unwrap();
        assert_eq!(stored.get("title").unwrap(), Value::from("Animal Farm"));
        assert_eq!(stored.get("year").unwrap(), Value::I64(1949));

        let result = collection
            .update_one(&by_id(id), &doc! { title: "Animal Farm" }, &upsert())
            .unwrap();
        assert_eq!(result.modified_count, 0);
        assert_eq!(collection.count_documents(&all()).unwrap(), 1);
    }

    #[test]
    fn update_without_upsert_does_nothing() {
        let collection = InMemoryCollection::new("book");
        let result = collection
            .update_one(&field("title").eq("x"), &doc! { a: 1 }, &UpdateOptions::default())
            .unwrap();
        assert_eq!(result, UpdateResult::default());
        assert_eq!(collection.count_documents(&all()).unwrap(), 0);
    }

    #[test]
    fn update_rejects_id_change() {
        let collection = InMemoryCollection::new("book");
        let id = insert(&collection, doc! { title: "1984" });
        let mut update = Document::new();
        update.put(DOC_ID, ObjectId::new()).unwrap();
        let err = collection.update_one(&by_id(id), &update, &upsert()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn find_sorts_skips_and_limits() {
        let collection = InMemoryCollection::new("book");
        for title in ["b", "c", "a", "d"] {
            insert(&collection, doc! { title: title });
        }

        let options = FindOptions::new().sort_by("title", SortOrder::Ascending);
        assert_eq!(titles(collection.find(&all(), &options).unwrap()), vec!["a", "b", "c", "d"]);

        let options = FindOptions::new()
            .sort_by("title", SortOrder::Descending)
            .skip(1)
            .limit(2);
        assert_eq!(titles(collection.find(&all(), &options).unwrap()), vec!["c", "b"]);

        // unsorted keeps insertion order
        assert_eq!(
            titles(collection.find(&all(), &FindOptions::new()).unwrap()),
            vec!["b", "c", "a", "d"]
        );
    }

    #[test]
    fn find_with_zero_limit_returns_everything() {
        let collection = InMemoryCollection::new("book");
        for title in ["b", "a", "c"] {
            insert(&collection, doc! { title: title });
        }
        let options = FindOptions::new().sort_by("title", SortOrder::Ascending).limit(0);
        assert_eq!(titles(collection.find(&all(), &options).unwrap()), vec!["a", "b", "c"]);

        let options = FindOptions::new().skip(1).limit(0);
        assert_eq!(titles(collection.find(&all(), &options).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn find_sort_by_multiple_fields() {
        let collection = InMemoryCollection::new("book");
        insert(&collection, doc! { title: "x", year: 2 });
        insert(&collection, doc! { title: "y", year: 1 });
        insert(&collection, doc! { title: "z", year: 2 });
        let options = FindOptions::new()
            .sort_by("year", SortOrder::Descending)
            .sort_by("title", SortOrder::Descending);
        assert_eq!(titles(collection.find(&all(), &options).unwrap()), vec!["z", "x", "y"]);
    }

    #[test]
    fn count_and_delete() {
        let collection = InMemoryCollection::new("book");
        let id = insert(&collection, doc! { title: "a", kind: "novel" });
        insert(&collection, doc! { title: "b", kind: "novel" });
        insert(&collection, doc! { title: "c", kind: "essay" });

        assert_eq!(collection.count_documents(&field("kind").eq("novel")).unwrap(), 2);
        assert_eq!(collection.delete_one(&by_id(id)).unwrap().deleted_count, 1);
        assert_eq!(collection.delete_one(&by_id(id)).unwrap().deleted_count, 0);
        assert_eq!(collection.delete_many(&all()).unwrap().deleted_count, 2);
        assert_eq!(collection.count_documents(&all()).unwrap(), 0);
    }

    #[test]
    fn find_one_on_empty_collection() {
        let collection = InMemoryCollection::new("book");
        assert!(collection.find_one(&all()).unwrap().is_none());
    }
}
