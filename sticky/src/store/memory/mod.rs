//! In-memory document store driver.
//!
//! Documents live in process memory and vanish with the last handle. The
//! driver implements the full store interface and is what tests run on.

mod client;
mod collection;
mod database;

pub use client::*;
pub use collection::*;
pub use database::*;
