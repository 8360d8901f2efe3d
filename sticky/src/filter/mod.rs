mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
