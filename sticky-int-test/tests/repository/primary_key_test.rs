use crate::repository::Keyed;
use sticky::filter::{all, field};
use sticky::repository::RepositoryOptions;
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

fn keyed(bar: &str, baz: &str, qux: &str) -> Keyed {
    Keyed {
        bar: bar.to_string(),
        baz: baz.to_string(),
        qux: qux.to_string(),
    }
}

#[test]
fn test_primary_key_from_schema() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.sticky().repository::<Keyed>()?;
            assert_eq!(repository.primary_key(), &["bar".to_string(), "baz".to_string()]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_overwrites_object() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.sticky().repository::<Keyed>()?;
            let mut foo = keyed("1", "2", "3");
            repository.save(&mut foo)?;
            assert_eq!(repository.find(all())?.count()?, 1);

            foo.qux = "4".to_string();
            repository.save(&mut foo)?;
            assert_eq!(repository.find(all())?.count()?, 1);
            assert_eq!(repository.get(field("bar").eq("1"))?.qux, "4");
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_saves_new_object() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.sticky().repository::<Keyed>()?;
            let mut foo = keyed("1", "2", "3");
            repository.save(&mut foo)?;
            assert_eq!(repository.find(all())?.count()?, 1);

            foo.bar = "4".to_string();
            repository.save(&mut foo)?;
            assert_eq!(repository.find(all())?.count()?, 2);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_two_repositories_share_documents() {
    run_test(
        create_test_context,
        |ctx| {
            let first = ctx.sticky().repository::<Keyed>()?;
            let second = ctx.sticky().repository::<Keyed>()?;
            first.save(&mut keyed("1", "2", "3"))?;
            second.save(&mut keyed("1", "2", "5"))?;

            assert_eq!(first.count(all())?, 1);
            assert_eq!(second.get(field("baz").eq("2"))?.qux, "5");
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_primary_key_from_options() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.sticky().repository_with::<Keyed>(
                RepositoryOptions::new()
                    .primary_key(&["qux"])
                    .collection_name("by_qux"),
            )?;
            assert_eq!(repository.collection_name(), "by_qux");

            repository.save(&mut keyed("1", "2", "3"))?;
            repository.save(&mut keyed("5", "6", "3"))?;
            assert_eq!(repository.count(all())?, 1);
            assert_eq!(repository.get(field("qux").eq("3"))?.bar, "5");

            let defaults = ctx.sticky().repository::<Keyed>()?;
            assert_eq!(defaults.count(all())?, 0);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_delete_by_primary_key() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.sticky().repository::<Keyed>()?;
            let foo = keyed("1", "2", "3");
            repository.save(&mut foo.clone())?;
            repository.save(&mut keyed("1", "3", "3"))?;

            assert!(repository.delete(&foo)?);
            assert_eq!(repository.count(all())?, 1);
            assert_eq!(repository.get(all())?.baz, "3");
            Ok(())
        },
        cleanup,
    );
}
