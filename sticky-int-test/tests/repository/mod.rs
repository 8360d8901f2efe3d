mod book_repository_test;
mod cursor_test;
mod delete_test;
mod one_of_schema_test;
mod primary_key_test;

use fake::faker::name::en::Name;
use fake::Fake;
use sticky_derive::{Convertible, Schema};

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct Author {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct Book {
    pub id: Option<String>,
    pub title: String,
    #[schema(nested)]
    pub author: Option<Author>,
}

impl Book {
    pub fn new(title: &str, author: Option<Author>) -> Self {
        Book {
            id: None,
            title: title.to_string(),
            author,
        }
    }
}

pub fn generate_author() -> Author {
    Author {
        id: None,
        name: Name().fake(),
    }
}

/// Identified by its `(bar, baz)` pair instead of an id.
#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
#[schema(primary_key = "bar, baz")]
pub struct Keyed {
    pub bar: String,
    pub baz: String,
    pub qux: String,
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct Bar {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct A {
    pub id: Option<String>,
    pub foo: String,
    pub bar: String,
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct B {
    pub id: Option<String>,
    pub foo: String,
    pub baz: String,
}

/// A variant without identity, embedded wherever it appears.
#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct Memo {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
#[schema(type_field = "type")]
pub enum Foo {
    A(A),
    B(B),
    #[schema(tag = "memo")]
    Memo(Memo),
}

#[derive(Debug, Clone, PartialEq, Convertible, Schema)]
pub struct Master {
    #[schema(nested)]
    pub foos: Vec<Foo>,
}
