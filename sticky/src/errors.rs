use backtrace::Backtrace;
use parking_lot::Mutex;
use std::any::TypeId;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Identifies the entity type a repository error belongs to.
///
/// `DoesNotExist` and `MultipleObjectsReturned` carry the tag of the entity
/// the failing repository was bound to, so a caller handling the error for
/// one entity type never accidentally handles it for another.
///
/// # Examples
///
/// ```rust,ignore
/// match books.get(field("title").eq("1984")) {
///     Err(e) if e.is_does_not_exist::<Book>() => println!("no such book"),
///     other => other?,
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityTag {
    type_id: TypeId,
    type_name: &'static str,
}

impl EntityTag {
    /// Creates the tag of entity type `T`.
    pub fn of<T: 'static>() -> Self {
        EntityTag {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name of the entity.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the unqualified type name of the entity.
    pub fn short_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }

    /// Checks whether this tag belongs to entity type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Error kinds for sticky operations
///
/// Each kind describes one category of failure so call sites can match on
/// the kind instead of parsing messages.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Repository lookups
    /// `get` matched no document for the tagged entity
    DoesNotExist(EntityTag),
    /// `get` matched more than one document for the tagged entity
    MultipleObjectsReturned(EntityTag),

    // Schema validation
    /// A value could not be converted to the declared field type
    ValidationError,
    /// A document carries a field the schema does not declare
    UnknownField(String),
    /// A polymorphic document has no or an unregistered type tag
    UnknownType(String),

    // Identity
    /// The identifier is not a valid store identifier
    InvalidId,
    /// The object carries no identifier to address it by
    NotIdentifiable,

    // Registry
    /// No connection or database is registered under the alias
    ConnectionNotFound(String),

    // Store driver
    /// Failure reported by the document-store driver
    StoreError,

    // Generic
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DoesNotExist(tag) => write!(f, "{} does not exist", tag.short_name()),
            ErrorKind::MultipleObjectsReturned(tag) => {
                write!(f, "Multiple {} objects returned", tag.short_name())
            }
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::UnknownField(name) => write!(f, "Unknown field '{}'", name),
            ErrorKind::UnknownType(tag) => write!(f, "Unknown type '{}'", tag),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::NotIdentifiable => write!(f, "Not identifiable"),
            ErrorKind::ConnectionNotFound(alias) => write!(f, "Connection '{}' not found", alias),
            ErrorKind::StoreError => write!(f, "Store error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom sticky error type.
///
/// `StickyError` carries a message, a kind, an optional cause and a lazily
/// resolved backtrace captured where the error was created.
///
/// # Examples
///
/// ```rust,ignore
/// use sticky::errors::{StickyError, ErrorKind};
///
/// let err = StickyError::new("Invalid object id 'xyz'", ErrorKind::InvalidId);
/// let cause = StickyError::new("connection reset", ErrorKind::StoreError);
/// let err = StickyError::new_with_cause("Failed to save book", ErrorKind::StoreError, cause);
/// ```
#[derive(Clone)]
pub struct StickyError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StickyError>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl StickyError {
    /// Creates a new `StickyError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StickyError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `StickyError` wrapping a cause error.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StickyError) -> Self {
        StickyError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StickyError> {
        self.cause.as_deref()
    }

    /// Checks whether this is a `DoesNotExist` raised by a repository of `T`.
    pub fn is_does_not_exist<T: 'static>(&self) -> bool {
        matches!(&self.error_kind, ErrorKind::DoesNotExist(tag) if tag.is::<T>())
    }

    /// Checks whether this is a `MultipleObjectsReturned` raised by a repository of `T`.
    pub fn is_multiple_objects_returned<T: 'static>(&self) -> bool {
        matches!(&self.error_kind, ErrorKind::MultipleObjectsReturned(tag) if tag.is::<T>())
    }

    /// Checks whether this error was raised while validating a field mapping.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::ValidationError | ErrorKind::UnknownField(_) | ErrorKind::UnknownType(_)
        )
    }
}

impl Display for StickyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StickyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.lock();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, *backtrace)
            }
        }
    }
}

impl Error for StickyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for sticky operations.
pub type StickyResult<T> = Result<T, StickyError>;

impl From<std::num::ParseIntError> for StickyError {
    fn from(err: std::num::ParseIntError) -> Self {
        StickyError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidId,
        )
    }
}

impl From<std::fmt::Error> for StickyError {
    fn from(err: std::fmt::Error) -> Self {
        StickyError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for StickyError {
    fn from(msg: String) -> Self {
        StickyError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StickyError {
    fn from(msg: &str) -> Self {
        StickyError::new(msg, ErrorKind::InternalError)
    }
}
