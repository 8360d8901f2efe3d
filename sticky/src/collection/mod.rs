mod document;
mod object_id;
pub(crate) mod snowflake;

pub use document::*;
pub use object_id::*;
