//! # Sticky - Typed Persistence over Document Stores
//!
//! Sticky layers relational-style persistence on a schemaless document
//! store. Entities are plain Rust types deriving `Convertible` and `Schema`;
//! repositories save them together with the entities they reference, load
//! them back with references expanded, and query them through lazy cursors.
//!
//! ## Key Features
//!
//! - **References**: nested entities are stored in their own collections and
//!   linked by id, then expanded again on load
//! - **Primary keys**: saves upsert by `id` or by any list of fields
//! - **Polymorphism**: one-of schemas dispatch on a type tag
//! - **Lazy cursors**: chain `find`, `sort`, `skip` and `limit` before the
//!   first read
//! - **Pluggable stores**: drivers implement three small traits; an
//!   in-memory driver ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sticky::filter::field;
//! use sticky::store::memory::InMemoryClient;
//! use sticky::Sticky;
//! use sticky_derive::{Convertible, Schema};
//!
//! #[derive(Convertible, Schema)]
//! pub struct Author {
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//!
//! #[derive(Convertible, Schema)]
//! pub struct Book {
//!     pub id: Option<String>,
//!     pub title: String,
//!     #[schema(nested)]
//!     pub author: Option<Author>,
//! }
//!
//! let sticky = Sticky::builder()
//!     .connect("library", InMemoryClient::connect())
//!     .open()?;
//!
//! let books = sticky.repository::<Book>()?;
//! let mut book = Book {
//!     id: None,
//!     title: "1984".to_string(),
//!     author: Some(Author { id: None, name: "Orwell".to_string() }),
//! };
//! books.save(&mut book)?;
//!
//! let loaded = books.get(field("title").eq("1984"))?;
//! assert_eq!(loaded.author.unwrap().name, "Orwell");
//! ```

use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod schema;
pub mod sticky;
pub mod sticky_builder;
pub mod sticky_config;
pub mod store;

pub use crate::sticky::Sticky;

pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);
