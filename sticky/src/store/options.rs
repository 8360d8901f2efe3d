use crate::common::{SortOrder, SortableFields};

/// Options for controlling find operations on documents.
///
/// ```rust,ignore
/// let options = FindOptions::new()
///     .sort_by("title", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: SortableFields,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Appends a sort key; earlier keys take precedence.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.sort_by = self.sort_by.add_sorted_field(field_name.to_string(), sort_order);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Caps the number of results; `0` means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sorting(&self) -> &SortableFields {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}

/// Options for `update_one`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    upsert: bool,
}

impl UpdateOptions {
    pub fn new(upsert: bool) -> Self {
        Self { upsert }
    }

    /// Whether a document is inserted when the filter matches nothing.
    pub fn is_upsert(&self) -> bool {
        self.upsert
    }
}

/// Creates `UpdateOptions` that insert when nothing matches.
pub fn upsert() -> UpdateOptions {
    UpdateOptions::new(true)
}
