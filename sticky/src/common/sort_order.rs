/// Specifies the direction for sorting documents.
///
/// # Usage
/// Cursor sort specifications use a leading `-` for descending order:
/// ```text
/// let cursor = repository.find(all())?.sort(&["-title", "year"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// Splits a sort specification such as `"-title"` into its field name and order.
    ///
    /// A leading `-` selects [`SortOrder::Descending`]; anything else sorts ascending.
    pub fn parse_field(spec: &str) -> (String, SortOrder) {
        match spec.strip_prefix('-') {
            Some(field) => (field.to_string(), SortOrder::Descending),
            None => (spec.to_string(), SortOrder::Ascending),
        }
    }
}

/// Ordered list of `(field, order)` pairs, first entry sorts first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortableFields {
    fields: Vec<(String, SortOrder)>,
}

impl SortableFields {
    pub fn new() -> Self {
        SortableFields { fields: Vec::new() }
    }

    pub fn add_sorted_field(mut self, field_name: String, sort_order: SortOrder) -> Self {
        self.fields.push((field_name, sort_order));
        self
    }

    pub fn sorting_order(&self) -> &[(String, SortOrder)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
