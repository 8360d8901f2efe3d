use crate::errors::{ErrorKind, StickyError, StickyResult};
use crate::ID_GENERATOR;
use std::fmt::{Debug, Display};
use std::str::FromStr;

const MAX_VALUE: u64 = 10_000_000_000_000_000_000;
const MIN_VALUE: u64 = 1_000_000_000_000_000_000;

/// Store-assigned identifier of a document.
///
/// Every stored document carries its `ObjectId` under the reserved `_id` key.
/// Repositories expose it to domain objects as the decimal string in their
/// `id` field, and [ObjectId::parse] turns that string back into an id.
///
/// Generated ids are 64-bit snowflake values in the range [10^18, 10^19),
/// so their string form is always 19 digits and ids sort roughly by
/// creation time.
///
/// # Examples
///
/// ```rust,ignore
/// use sticky::collection::ObjectId;
///
/// let id = ObjectId::new();
/// let same = ObjectId::parse(&id.to_string())?;
/// assert_eq!(id, same);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct ObjectId {
    id_value: u64,
}

impl ObjectId {
    /// Generates a new unique `ObjectId`.
    pub fn new() -> Self {
        ObjectId {
            id_value: ID_GENERATOR.get_id(),
        }
    }

    /// Creates an `ObjectId` from a raw value, which must lie in [10^18, 10^19).
    pub fn create_id(id_value: u64) -> StickyResult<ObjectId> {
        ObjectId::valid_id(id_value)?;
        Ok(ObjectId { id_value })
    }

    /// Parses the string form of an id, failing with [ErrorKind::InvalidId].
    pub fn parse(value: &str) -> StickyResult<ObjectId> {
        let id_value = value.trim().parse::<u64>().map_err(|_| {
            log::error!("'{}' is not a valid object id", value);
            StickyError::new(
                &format!("'{}' is not a valid object id", value),
                ErrorKind::InvalidId,
            )
        })?;
        ObjectId::create_id(id_value)
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }

    pub(crate) fn valid_id(id_value: u64) -> StickyResult<()> {
        if id_value >= MAX_VALUE {
            log::error!("Id value {} is too large", id_value);
            return Err(StickyError::new(
                &format!("ObjectId validation error: id value must be less than 10^19 ({})", MAX_VALUE),
                ErrorKind::InvalidId,
            ));
        } else if id_value < MIN_VALUE {
            log::error!("Id value {} is too small", id_value);
            return Err(StickyError::new(
                &format!(
                    "ObjectId validation error: id value must be greater than or equal to 10^18 ({})",
                    MIN_VALUE
                ),
                ErrorKind::InvalidId,
            ));
        }
        Ok(())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::new()
    }
}

impl FromStr for ObjectId {
    type Err = StickyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_value)
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.id_value)
    }
}
