use crate::repository::{generate_author, Author, Book};
use sticky::errors::ErrorKind;
use sticky::filter::{all, field};
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_delete_saved_entity() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("1984", Some(generate_author()));
            let id = books.save(&mut book)?;

            assert!(books.delete(&book)?);
            assert!(books.get_by_id(id).unwrap_err().is_does_not_exist::<Book>());
            // references are not cascaded
            assert_eq!(ctx.sticky().repository::<Author>()?.count(all())?, 1);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_delete_unsaved_entity_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let err = books.delete(&Book::new("never saved", None)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotIdentifiable);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_delete_twice() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut book = Book::new("1984", None);
            books.save(&mut book)?;
            assert!(books.delete(&book)?);
            assert!(!books.delete(&book)?);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_delete_many_by_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            for title in ["a", "b", "b", "c"] {
                books.save(&mut Book::new(title, None))?;
            }

            assert_eq!(books.delete_many(field("title").eq("b"))?, 2);
            assert_eq!(books.count(all())?, 2);
            assert_eq!(books.delete_many(all())?, 2);
            assert_eq!(books.count(all())?, 0);
            assert_eq!(books.delete_many(all())?, 0);
            Ok(())
        },
        cleanup,
    );
}
