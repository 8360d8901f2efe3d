pub mod memory;
mod options;
mod results;
mod store;
mod stream;

pub use options::*;
pub use results::*;
pub use store::*;
pub use stream::*;
