#![recursion_limit = "128"]
//! # Sticky Derive Macros
//!
//! Procedural macros implementing the `sticky` traits for entity types.
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Derives conversion between a Rust type and a document value. Loads are
//! strict: a stored field the struct does not declare is rejected.
//!
//! - **Supported for**: structs with named fields and enums
//! - **Container attribute**: `#[converter(ignored = "a, b")]` skips fields;
//!   skipped fields load as `Default::default()`
//!
//! Enums carrying `#[schema(...)]` are one-of entities: every variant wraps
//! one entity type and is stored as that entity's document plus a type tag.
//! Other enums are stored as `{ variant, value }` documents.
//!
//! ### `Schema`
//!
//! Derives the descriptor telling repositories where an entity is stored and
//! which of its fields reference other entities.
//!
//! - **Container attributes**: `#[schema(name = "...", collection = "...",
//!   primary_key = "a, b")]`; enums require `type_field = "..."`
//! - **Field attribute**: `#[schema(nested)]` marks a field holding another
//!   schema type, optionally wrapped in `Option`, `Box` or `Vec`
//! - **Variant attribute**: `#[schema(tag = "...")]`, defaulting to the
//!   lowercased variant name
//!
//! # Examples
//!
//! ```rust,ignore
//! use sticky_derive::{Convertible, Schema};
//!
//! #[derive(Convertible, Schema)]
//! pub struct A {
//!     pub id: Option<String>,
//!     pub foo: String,
//! }
//!
//! #[derive(Convertible, Schema)]
//! #[schema(type_field = "type")]
//! pub enum Foo {
//!     #[schema(tag = "a")]
//!     A(A),
//! }
//!
//! #[derive(Convertible, Schema)]
//! pub struct Master {
//!     #[schema(nested)]
//!     pub foos: Vec<Foo>,
//! }
//! ```

extern crate proc_macro;
mod attributes;
mod convertible;
mod schema;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::schema::{generate_schema_for_enum, generate_schema_for_struct};
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Convertible` trait.
///
/// Every stored field must implement `Convertible` itself.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convert(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible for unions. Unions are not supported by the Convertible derive macro.",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => {
            let error = syn::Error::new(
                e.span(),
                format!("Failed to derive Convertible for '{}': {}", ast.ident, e),
            );
            error.to_compile_error().into()
        }
    }
}

/// Derives the `Schema` trait.
///
/// Structs become plain schemas; enums become one-of schemas dispatching on
/// their type field. Must be combined with `#[derive(Convertible)]`.
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_schema_for_struct(&ast, data),
        Data::Enum(ref data) => generate_schema_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast,
            "Cannot derive Schema for unions. Only structs and enums are supported.",
        )),
    };

    match result {
        Ok(token_stream) => token_stream,
        Err(e) => {
            let error = syn::Error::new(
                e.span(),
                format!("Failed to derive Schema for '{}': {}", ast.ident, e),
            );
            error.to_compile_error().into()
        }
    }
}
