use super::resolver::{translate_id_filter, ReferenceResolver};
use crate::common::{SortOrder, DOC_ID, ID_FIELD};
use crate::errors::StickyResult;
use crate::filter::Filter;
use crate::schema::Schema;
use crate::store::{DocumentStream, FindOptions, StoreCollection};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A query modifier recorded on a [Cursor] before it runs.
#[derive(Debug, Clone, PartialEq)]
enum CursorModifier {
    Find(Filter),
    Limit(u64),
    Skip(u64),
    Sort(Vec<(String, SortOrder)>),
}

/// A lazy, chainable query over the entities of one repository.
///
/// Modifiers only record intent; the store is queried on the first call to
/// `next`. Every yielded document is dereferenced and loaded as `T`.
///
/// ```rust,ignore
/// let titles: Vec<String> = books
///     .find(all())?
///     .sort(&["-year", "title"])
///     .skip(10)
///     .limit(5)
///     .map(|book| book.map(|b| b.title))
///     .collect::<StickyResult<_>>()?;
/// ```
pub struct Cursor<T: Schema> {
    collection: StoreCollection,
    resolver: ReferenceResolver,
    filter: Filter,
    modifiers: Vec<CursorModifier>,
    stream: Option<DocumentStream>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Schema> Cursor<T> {
    pub(crate) fn new(collection: StoreCollection, resolver: ReferenceResolver, filter: Filter) -> Self {
        Cursor {
            collection,
            resolver,
            filter,
            modifiers: Vec::new(),
            stream: None,
            _phantom: PhantomData,
        }
    }

    /// Narrows the query with an additional filter.
    pub fn find(mut self, filter: Filter) -> Self {
        self.modifiers.push(CursorModifier::Find(filter));
        self
    }

    /// Yields at most `limit` entities; `limit(0)` leaves the query unlimited.
    pub fn limit(mut self, limit: u64) -> Self {
        self.modifiers.push(CursorModifier::Limit(limit));
        self
    }

    /// Skips the first `skip` matching entities.
    pub fn skip(mut self, skip: u64) -> Self {
        self.modifiers.push(CursorModifier::Skip(skip));
        self
    }

    /// Orders the results by the given fields; a leading `-` sorts descending.
    pub fn sort(mut self, fields: &[&str]) -> Self {
        let fields = fields.iter().map(|f| SortOrder::parse_field(f)).collect();
        self.modifiers.push(CursorModifier::Sort(fields));
        self
    }

    /// Number of stored documents matching the filter the cursor was created
    /// with, ignoring every recorded modifier.
    ///
    /// Takes the cursor by value so it is picked over [Iterator::count].
    pub fn count(self) -> StickyResult<u64> {
        self.collection.count_documents(&self.filter)
    }

    /// The first entity of the query, if any.
    pub fn first(mut self) -> StickyResult<Option<T>> {
        self.next().transpose()
    }

    fn execute(&self) -> StickyResult<DocumentStream> {
        let mut filter = self.filter.clone();
        let mut options = FindOptions::new();
        for modifier in &self.modifiers {
            match modifier {
                CursorModifier::Find(extra) => {
                    filter = filter.and(translate_id_filter(extra.clone())?);
                }
                CursorModifier::Limit(limit) => options = options.limit(*limit),
                CursorModifier::Skip(skip) => options = options.skip(*skip),
                CursorModifier::Sort(fields) => {
                    for (name, order) in fields {
                        let name = if name == ID_FIELD { DOC_ID } else { name.as_str() };
                        options = options.sort_by(name, *order);
                    }
                }
            }
        }

        log::debug!(
            "Querying {} by {} with {:?}",
            self.collection.name(),
            filter,
            options
        );
        self.collection.find(&filter, &options)
    }
}

impl<T: Schema> Iterator for Cursor<T> {
    type Item = StickyResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream.is_none() {
            match self.execute() {
                Ok(stream) => self.stream = Some(stream),
                Err(e) => {
                    // a failed query ends the cursor
                    self.stream = Some(DocumentStream::empty());
                    return Some(Err(e));
                }
            }
        }

        let document = match self.stream.as_mut()?.next()? {
            Ok(document) => document,
            Err(e) => return Some(Err(e)),
        };
        self.resolver.to_object::<T>(Some(document)).transpose()
    }
}

impl<T: Schema> Debug for Cursor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("collection", &self.collection.name())
            .field("filter", &self.filter)
            .field("modifiers", &self.modifiers)
            .field("started", &self.stream.is_some())
            .finish()
    }
}
