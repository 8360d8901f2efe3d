use crate::repository::Book;
use sticky::common::DEFAULT_ALIAS;
use sticky::errors::ErrorKind;
use sticky::filter::all;
use sticky::repository::RepositoryOptions;
use sticky::store::memory::InMemoryClient;
use sticky::Sticky;
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_register_and_get_default_database() {
    run_test(
        create_test_context,
        |ctx| {
            let database = ctx.sticky().database(DEFAULT_ALIAS)?;
            assert_eq!(database.name(), ctx.database_name());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_register_and_get_database_with_alias() {
    let sticky = Sticky::builder()
        .register_connection(InMemoryClient::connect(), "bar")
        .register_database("foo", "bar")
        .open()
        .unwrap();
    assert_eq!(sticky.database("bar").unwrap().name(), "foo");
}

#[test]
fn test_get_database_with_alias_does_not_exist() {
    let sticky = Sticky::builder()
        .connect("foo", InMemoryClient::connect())
        .open()
        .unwrap();
    let err = sticky.database("bar").unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConnectionNotFound("bar".to_string()));
}

#[test]
fn test_get_database_without_default_does_not_exist() {
    let sticky = Sticky::builder()
        .register_connection(InMemoryClient::connect(), "bar")
        .register_database("foo", "bar")
        .open()
        .unwrap();
    let err = sticky.database(DEFAULT_ALIAS).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::ConnectionNotFound(DEFAULT_ALIAS.to_string())
    );
    assert!(sticky.repository::<Book>().is_err());
}

#[test]
fn test_repositories_on_separate_aliases() {
    run_test(
        create_test_context,
        |ctx| {
            let sticky = ctx.sticky();
            sticky.register_connection(InMemoryClient::connect(), "archive")?;
            sticky.register_database("old_books", "archive")?;

            let current = sticky.repository::<Book>()?;
            let archived =
                sticky.repository_with::<Book>(RepositoryOptions::new().alias("archive"))?;

            current.save(&mut Book::new("new", None))?;
            archived.save(&mut Book::new("old", None))?;
            archived.save(&mut Book::new("older", None))?;

            assert_eq!(current.count(all())?, 1);
            assert_eq!(archived.count(all())?, 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_references_follow_repository_database() {
    run_test(
        create_test_context,
        |ctx| {
            let sticky = ctx.sticky();
            sticky.register_connection(InMemoryClient::connect(), "archive")?;
            sticky.register_database("old_books", "archive")?;

            let archived =
                sticky.repository_with::<Book>(RepositoryOptions::new().alias("archive"))?;
            archived.save(&mut Book::new("old", Some(crate::repository::generate_author())))?;

            let archived_authors = sticky.repository_with::<crate::repository::Author>(
                RepositoryOptions::new().alias("archive"),
            )?;
            assert_eq!(archived_authors.count(all())?, 1);
            assert_eq!(
                sticky.repository::<crate::repository::Author>()?.count(all())?,
                0
            );
            Ok(())
        },
        cleanup,
    );
}
