use crate::collection::ObjectId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, StickyError, StickyResult};
use im::OrdMap;
use itertools::Itertools;
use std::fmt::{Debug, Display};

/// A stored document: field names mapped to [Value]s.
///
/// Documents are what the store driver reads and writes. The reserved key
/// `_id` holds the store-assigned [ObjectId]; every other key is data.
///
/// Values of embedded documents can be read with a dotted key, so for
/// `{"author": {"name": "Orwell"}}` the call `document.get("author.name")`
/// returns `"Orwell"`. Numeric segments index into arrays.
///
/// Backed by a persistent `im::OrdMap`, so clones are cheap and keys iterate
/// in sorted order.
#[derive(Clone, Eq, PartialEq, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`, creating embedded documents for dotted keys.
    ///
    /// # Errors
    ///
    /// * the key (or one of its segments) is empty
    /// * the key is `_id` and the value is not an [ObjectId]
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("title", "1984")?;
    /// doc.put("author.name", "Orwell")?;
    /// assert_eq!(doc.get("author.name")?, Value::from("Orwell"));
    /// ```
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> StickyResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StickyError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key == DOC_ID && !value.is_object_id() {
            log::error!("Reserved field {} must hold an object id, found {}", DOC_ID, value);
            return Err(StickyError::new(
                &format!("Reserved field {} must hold an object id", DOC_ID),
                ErrorKind::InvalidId,
            ));
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Returns the value stored under `key`, or [Value::Null] when absent.
    pub fn get(&self, key: &str) -> StickyResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None if key.contains(FIELD_SEPARATOR) => self.get_by_embedded_key(key),
            None => Ok(Value::Null),
        }
    }

    /// Borrows a top-level value without cloning it.
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Mutably borrows a top-level value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Removes a top-level key and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the store identifier, if the document has been stored.
    pub fn id(&self) -> Option<ObjectId> {
        self.data.get(DOC_ID).and_then(|v| v.as_object_id()).copied()
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    /// Top-level field names, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Iterates over top-level `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Merges `other` into this document, recursing into embedded documents.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            if let (Some(Value::Document(existing)), Value::Document(incoming)) =
                (self.data.get_mut(key), value)
            {
                existing.merge(incoming);
                continue;
            }
            self.data.insert(key.clone(), value.clone());
        }
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> StickyResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StickyError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if splits.len() == 1 {
            return self.put(key, value);
        }

        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        if !entry.is_document() {
            // scalar in the way, replace it with an embedded document
            *entry = Value::Document(Document::new());
        }
        match entry.as_document_mut() {
            Some(nested) => nested.deep_put(&splits[1..], value),
            None => Err(StickyError::new(
                "Failed to create embedded document",
                ErrorKind::InternalError,
            )),
        }
    }

    fn get_by_embedded_key(&self, key: &str) -> StickyResult<Value> {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        if splits.iter().any(|s| s.is_empty()) {
            log::error!("Document does not support empty key segment in {}", key);
            return Err(StickyError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(Self::recursive_get(self.data.get(splits[0]), &splits[1..]))
    }

    fn recursive_get(value: Option<&Value>, splits: &[&str]) -> Value {
        let value = match value {
            None => return Value::Null,
            Some(v) => v,
        };

        if splits.is_empty() {
            return value.clone();
        }

        match value {
            Value::Document(obj) => Self::recursive_get(obj.data.get(splits[0]), &splits[1..]),
            Value::Array(arr) => match splits[0].parse::<usize>() {
                Ok(index) => Self::recursive_get(arr.get(index), &splits[1..]),
                // non-numeric segment, collect the key from every element
                Err(_) => Value::Array(
                    arr.iter()
                        .map(|item| Self::recursive_get(Some(item), splits))
                        .filter(|v| !v.is_null())
                        .collect(),
                ),
            },
            _ => Value::Null,
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.data
                .iter()
                .map(|(k, v)| format!("\"{}\": {}", k, v))
                .join(", ")
        )
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = im::ordmap::ConsumingIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust,ignore
/// use sticky::doc;
///
/// let book = doc! {
///     title: "1984",
///     author: { name: "Orwell" },
///     tags: ["dystopia", "classic"],
///     year: (1900 + 49)
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
