use super::SchemaDescriptor;
use crate::collection::Document;
use crate::common::{Convertible, Value};
use crate::errors::{ErrorKind, StickyError, StickyResult};

/// A persistable entity type.
///
/// `Schema` ties a Rust type to the [SchemaDescriptor] that tells
/// repositories which of its fields reference other entities and where its
/// documents are stored. Conversion to and from documents comes from
/// [Convertible].
///
/// Usually derived:
///
/// ```rust,ignore
/// use sticky_derive::{Convertible, Schema};
///
/// #[derive(Convertible, Schema)]
/// pub struct Book {
///     pub id: Option<String>,
///     pub title: String,
///     #[schema(nested)]
///     pub author: Option<Author>,
/// }
/// ```
pub trait Schema: Convertible<Output = Self> + Sized + 'static {
    fn descriptor() -> &'static SchemaDescriptor;

    /// Serializes the entity into a document.
    fn dump(&self) -> StickyResult<Document> {
        match self.to_value()? {
            Value::Document(document) => Ok(document),
            other => {
                log::error!("{} did not serialize to a document: {}", Self::descriptor().name(), other);
                Err(StickyError::new(
                    &format!("{} did not serialize to a document", Self::descriptor().name()),
                    ErrorKind::ValidationError,
                ))
            }
        }
    }

    /// Builds the entity from a fully expanded document.
    fn load(document: &Document) -> StickyResult<Self> {
        Self::from_value(&Value::Document(document.clone()))
    }
}

/// Borrows `value` as a document, failing with a validation error naming `type_name`.
pub fn expect_document<'a>(value: &'a Value, type_name: &str) -> StickyResult<&'a Document> {
    match value {
        Value::Document(document) => Ok(document),
        other => {
            log::error!("Value {} is not a document for {}", other, type_name);
            Err(StickyError::new(
                &format!("Value {} is not a document for {}", other, type_name),
                ErrorKind::ValidationError,
            ))
        }
    }
}

/// Fails with [ErrorKind::UnknownField] on the first key outside `known`.
pub fn check_unknown_fields(document: &Document, known: &[&str], type_name: &str) -> StickyResult<()> {
    match document.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) => {
            log::error!("Unknown field {} for {}", key, type_name);
            Err(StickyError::new(
                &format!("Unknown field '{}' for {}", key, type_name),
                ErrorKind::UnknownField(key.clone()),
            ))
        }
        None => Ok(()),
    }
}

/// Reads field `name` of `document` as `T`, naming the field in validation errors.
pub fn read_field<T: Convertible>(
    document: &Document,
    name: &str,
    type_name: &str,
) -> StickyResult<T::Output> {
    let value = document.get_ref(name).cloned().unwrap_or_default();
    T::from_value(&value).map_err(|e| {
        if matches!(e.kind(), ErrorKind::ValidationError) {
            StickyError::new_with_cause(
                &format!("Invalid value for field '{}' of {}", name, type_name),
                ErrorKind::ValidationError,
                e,
            )
        } else {
            e
        }
    })
}
