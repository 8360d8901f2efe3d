use crate::repository::{generate_author, Author, Bar, Book};
use sticky::collection::ObjectId;
use sticky::common::{Value, DOC_ID, ID_FIELD};
use sticky::filter::{all, by_id, field};
use sticky::repository::RepositoryOptions;
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_save_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new(
                "Nineteen Eighty-Four",
                Some(Author {
                    id: None,
                    name: "George Orwell".to_string(),
                }),
            );

            let id = books.save(&mut book)?;
            assert_eq!(book.id, Some(id.to_string()));
            let author_id = book.author.as_ref().and_then(|a| a.id.clone());
            assert!(author_id.is_some(), "nested author should get an id");

            let loaded = books.get_by_id(id)?;
            assert_eq!(loaded, book);
            assert_eq!(loaded.author.unwrap().name, "George Orwell");
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_reference_stored_as_id() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("1984", Some(generate_author()));
            books.save(&mut book)?;

            let stored = books.collection()?.find_one(&all())?.unwrap();
            let reference = stored.get("author")?;
            assert!(reference.is_object_id(), "author should be stored as an id");

            let authors = ctx.sticky().repository::<Author>()?;
            assert_eq!(authors.collection_name(), "author");
            let author = authors.get_by_id(*reference.as_object_id().unwrap())?;
            assert_eq!(Some(author), book.author);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_get_by_title() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            books.save(&mut Book::new("1984", Some(generate_author())))?;
            books.save(&mut Book::new("Animal Farm", Some(generate_author())))?;

            let book = books.get(field("title").eq("Animal Farm"))?;
            assert_eq!(book.title, "Animal Farm");
            assert!(book.author.is_some());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_get_by_id_field_string() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("1984", None);
            books.save(&mut book)?;

            let id = book.id.clone().unwrap();
            let loaded = books.get(field("id").eq(id.as_str()).and(field("title").eq("1984")))?;
            assert_eq!(loaded, book);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_null_reference() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("Anonymous", None);
            let id = books.save(&mut book)?;

            let stored = books.collection()?.find_one(&by_id(id))?.unwrap();
            assert!(stored.get("author")?.is_null());
            assert_eq!(ctx.sticky().repository::<Author>()?.count(all())?, 0);

            let loaded = books.get_by_id(id)?;
            assert_eq!(loaded.author, None);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_dangling_reference_loads_as_null() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("Orphan", Some(generate_author()));
            let id = books.save(&mut book)?;

            let authors = ctx.sticky().repository::<Author>()?;
            assert_eq!(authors.delete_many(all())?, 1);

            let loaded = books.get_by_id(id)?;
            assert_eq!(loaded.author, None);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_save_existing_replaces_document() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("1984", Some(generate_author()));
            let id = books.save(&mut book)?;

            book.title = "Nineteen Eighty-Four".to_string();
            if let Some(author) = book.author.as_mut() {
                author.name = "Eric Blair".to_string();
            }
            assert_eq!(books.save(&mut book)?, id);

            assert_eq!(books.count(all())?, 1);
            assert_eq!(ctx.sticky().repository::<Author>()?.count(all())?, 1);
            let loaded = books.get_by_id(id)?;
            assert_eq!(loaded.title, "Nineteen Eighty-Four");
            assert_eq!(loaded.author.unwrap().name, "Eric Blair");
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_save_without_id_creates_new_document() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let author = generate_author();
            books.save(&mut Book::new("1984", Some(author.clone())))?;
            books.save(&mut Book::new("1984", Some(author)))?;
            assert_eq!(books.count(field("title").eq("1984"))?, 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_id_not_stored() {
    run_test(
        create_test_context,
        |ctx| {
            let bars = ctx.sticky().repository::<Bar>()?;
            let mut bar = Bar { id: None };
            let id = bars.save(&mut bar)?;

            let stored = bars.collection()?.find_one(&all())?.unwrap();
            assert!(!stored.contains_key(ID_FIELD));
            assert_eq!(stored.get(DOC_ID)?, Value::ObjectId(id));
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_does_not_exist_is_scoped_per_entity() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let err = books.get(field("title").eq("missing")).unwrap_err();
            assert!(err.is_does_not_exist::<Book>());
            assert!(!err.is_does_not_exist::<Author>());
            assert!(!err.is_multiple_objects_returned::<Book>());

            let err = books.get_by_id(ObjectId::new()).unwrap_err();
            assert!(err.is_does_not_exist::<Book>());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_multiple_objects_returned() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            books.save(&mut Book::new("1984", None))?;
            books.save(&mut Book::new("1984", None))?;

            let err = books.get(field("title").eq("1984")).unwrap_err();
            assert!(err.is_multiple_objects_returned::<Book>());
            assert!(!err.is_multiple_objects_returned::<Author>());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_invalid_id_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let err = books.get(field("id").eq("not-an-id")).unwrap_err();
            assert_eq!(err.kind(), &sticky::errors::ErrorKind::InvalidId);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_references_ignore_repository_collection_override() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let writers = ctx
                .sticky()
                .repository_with::<Author>(RepositoryOptions::new().collection_name("writers"))?;

            let mut book = Book::new("1984", Some(generate_author()));
            books.save(&mut book)?;

            // the nested author lands in the descriptor's collection
            assert_eq!(writers.count(all())?, 0);
            assert_eq!(ctx.sticky().repository::<Author>()?.count(all())?, 1);

            let mut author = generate_author();
            writers.save(&mut author)?;
            assert_eq!(writers.count(all())?, 1);
            assert_eq!(ctx.sticky().repository::<Author>()?.count(all())?, 1);
            Ok(())
        },
        cleanup,
    );
}
