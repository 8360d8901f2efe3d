// document constants
pub const DOC_ID: &str = "_id";
pub const ID_FIELD: &str = "id";
pub const TYPE_FIELD: &str = "type";
pub const RESERVED_FIELDS: [&str; 1] = [DOC_ID];

// schema constants
pub const SCHEMA_SUFFIX: &str = "Schema";

// registry constants
pub const DEFAULT_ALIAS: &str = "default";

// field separator for embedded field access
pub const FIELD_SEPARATOR: &str = ".";

pub const STICKY_VERSION: &str = env!("CARGO_PKG_VERSION");
