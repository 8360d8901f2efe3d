use crate::repository::{generate_author, Book};
use fake::faker::lorem::en::Word;
use fake::Fake;
use sticky::errors::StickyResult;
use sticky::filter::{all, field};
use sticky::repository::Repository;
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

fn seed(books: &Repository<Book>, titles: &[&str]) -> StickyResult<()> {
    for title in titles {
        books.save(&mut Book::new(title, Some(generate_author())))?;
    }
    Ok(())
}

fn titles<I: Iterator<Item = StickyResult<Book>>>(cursor: I) -> StickyResult<Vec<String>> {
    cursor.map(|book| book.map(|b| b.title)).collect()
}

#[test]
fn test_sort_descending_and_ascending() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            seed(&books, &["b", "c", "a"])?;

            assert_eq!(titles(books.find(all())?.sort(&["-title"]))?, vec!["c", "b", "a"]);
            assert_eq!(titles(books.find(all())?.sort(&["title"]))?, vec!["a", "b", "c"]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sort_generated_titles() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let mut generated: Vec<String> = (0..20).map(|_| Word().fake::<String>()).collect();
            for title in &generated {
                books.save(&mut Book::new(title, None))?;
            }
            generated.sort();

            assert_eq!(titles(books.find(all())?.sort(&["title"]))?, generated);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_count_ignores_limit_and_skip() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            seed(&books, &["a", "b", "c", "d", "e"])?;

            let cursor = || books.find(all()).map(|c| c.limit(2).skip(1).sort(&["title"]));
            assert_eq!(cursor()?.count()?, 5);
            assert_eq!(titles(cursor()?)?, vec!["b", "c"]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_find_narrows_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            seed(&books, &["a", "b", "a"])?;

            assert_eq!(books.find(field("title").eq("a"))?.count()?, 2);
            let first = books
                .find(all())?
                .find(field("title").eq("b"))
                .first()?
                .unwrap();
            assert_eq!(first.title, "b");
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_exhaustion_is_not_an_error() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            seed(&books, &["only"])?;

            let mut cursor = books.find(all())?;
            let book = cursor.next().unwrap()?;
            assert_eq!(book.title, "only");
            assert!(book.author.is_some(), "cursor results are dereferenced");
            assert!(cursor.next().is_none());
            assert!(cursor.next().is_none());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_sort_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            seed(&books, &["x", "y", "z"])?;

            let ascending: Vec<String> = books
                .find(all())?
                .sort(&["id"])
                .map(|book| book.map(|b| b.id.unwrap_or_default()))
                .collect::<StickyResult<_>>()?;
            let mut expected = ascending.clone();
            expected.sort_by_key(|id| id.parse::<u64>().unwrap_or_default());
            assert_eq!(ascending, expected);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_lazy_until_iterated() {
    run_test(
        create_test_context,
        |ctx| {
            let books = ctx.sticky().repository::<Book>()?;
            let cursor = books.find(all())?.sort(&["title"]);
            // documents saved after the cursor was built are still seen
            seed(&books, &["late"])?;
            assert_eq!(titles(cursor)?, vec!["late"]);
            Ok(())
        },
        cleanup,
    );
}
