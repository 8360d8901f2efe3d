use crate::collection::{Document, ObjectId};
use crate::common::{Value, DOC_ID};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// An equality query over documents.
///
/// A filter is an ordered conjunction of `(field, value)` criteria. A
/// document matches when every criterion matches; the empty filter matches
/// every document. Field names may be dotted to reach embedded documents.
///
/// A criterion matches when the field's value equals the expected value,
/// when the field holds an array containing the expected value, or when the
/// expected value is null and the field is missing.
///
/// # Examples
///
/// ```rust,ignore
/// use sticky::filter::{all, field};
///
/// let orwell = field("author.name").eq("Orwell");
/// let novel_1949 = orwell.and(field("year").eq(1949));
/// let everything = all();
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    criteria: Vec<(String, Value)>,
}

impl Filter {
    /// Creates a filter with no criteria.
    pub fn new() -> Self {
        Filter {
            criteria: Vec::new(),
        }
    }

    /// Returns this filter with one more equality criterion.
    pub fn with<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.criteria.push((field.to_string(), value.into()));
        self
    }

    /// Combines this filter with another, both must match.
    pub fn and(&self, filter: Filter) -> Self {
        let mut criteria = self.criteria.clone();
        criteria.extend(filter.criteria);
        Filter { criteria }
    }

    pub fn criteria(&self) -> &[(String, Value)] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns the first value expected for `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.criteria
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Removes every criterion on `field`, returning the first removed value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let position = self.criteria.iter().position(|(name, _)| name == field)?;
        let (_, value) = self.criteria.remove(position);
        self.criteria.retain(|(name, _)| name != field);
        Some(value)
    }

    /// Replaces every criterion on `from` with the same criterion on `to`.
    pub fn rename(mut self, from: &str, to: &str) -> Self {
        for (name, _) in self.criteria.iter_mut() {
            if name == from {
                *name = to.to_string();
            }
        }
        self
    }

    /// Checks whether `document` satisfies every criterion.
    pub fn matches(&self, document: &Document) -> bool {
        self.criteria.iter().all(|(field, expected)| {
            match document.get(field) {
                Ok(actual) => Self::value_matches(&actual, expected),
                Err(_) => false,
            }
        })
    }

    /// Top-level equality criteria as a document, used to seed upserted documents.
    ///
    /// Dotted fields become embedded documents; a null `_id` is left out.
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        for (field, value) in &self.criteria {
            if field == DOC_ID && !value.is_object_id() {
                continue;
            }
            if let Err(e) = document.put(field, value.clone()) {
                log::debug!("Skipping filter field {} in upsert document: {}", field, e);
            }
        }
        document
    }

    fn value_matches(actual: &Value, expected: &Value) -> bool {
        if actual == expected {
            return true;
        }
        match actual {
            Value::Array(items) if !expected.is_array() => items.contains(expected),
            _ => false,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.criteria.is_empty() {
            return write!(f, "All");
        }
        write!(
            f,
            "({})",
            self.criteria
                .iter()
                .map(|(field, value)| format!("{} == {}", field, value))
                .join(" && ")
        )
    }
}

/// Creates a filter that matches every document.
pub fn all() -> Filter {
    Filter::new()
}

/// Creates a filter that matches a document by its store identifier.
pub fn by_id(id: ObjectId) -> Filter {
    Filter::new().with(DOC_ID, id)
}

/// Combines multiple filters, all of them must match.
pub fn and(filters: Vec<Filter>) -> Filter {
    filters.into_iter().fold(Filter::new(), |acc, f| acc.and(f))
}
