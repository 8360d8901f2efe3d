mod cursor;
mod options;
mod repository;
mod resolver;

pub use cursor::*;
pub use options::*;
pub use repository::*;
pub use resolver::ReferenceResolver;
