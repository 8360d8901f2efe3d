use crate::repository::{Foo, Master, Memo, A, B};
use sticky::common::{Value, ID_FIELD};
use sticky::errors::ErrorKind;
use sticky::filter::{all, field};
use sticky::schema::Schema;
use sticky_int_test::test_util::{cleanup, create_test_context, run_test};

fn a(foo: &str, bar: &str) -> Foo {
    Foo::A(A {
        id: None,
        foo: foo.to_string(),
        bar: bar.to_string(),
    })
}

#[test]
fn test_collection_name() {
    run_test(
        create_test_context,
        |ctx| {
            let foos = ctx.sticky().repository::<Foo>()?;
            assert_eq!(foos.collection()?.name(), "foo");
            assert!(Foo::descriptor().is_polymorphic());
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_saves_reference() {
    run_test(
        create_test_context,
        |ctx| {
            let masters = ctx.sticky().repository::<Master>()?;
            let foos = ctx.sticky().repository::<Foo>()?;

            let mut master = Master {
                foos: vec![a("x", "y")],
            };
            masters.save(&mut master)?;

            let stored = masters.collection()?.find_one(&all())?.unwrap();
            let stored_foos = stored.get("foos")?;
            assert!(stored_foos.as_array().unwrap()[0].is_object_id());
            assert!(foos.collection()?.find_one(&all())?.is_some());

            match &master.foos[0] {
                Foo::A(inner) => assert!(inner.id.is_some()),
                other => panic!("unexpected variant {:?}", other),
            }
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_round_trip_mixed_variants() {
    run_test(
        create_test_context,
        |ctx| {
            let masters = ctx.sticky().repository::<Master>()?;
            let mut master = Master {
                foos: vec![
                    a("x", "y"),
                    Foo::B(B {
                        id: None,
                        foo: "z".to_string(),
                        baz: "w".to_string(),
                    }),
                    Foo::Memo(Memo {
                        text: "embedded".to_string(),
                    }),
                ],
            };
            masters.save(&mut master)?;

            let stored = masters.collection()?.find_one(&all())?.unwrap();
            let stored_foos = stored.get("foos")?;
            let stored_foos = stored_foos.as_array().unwrap();
            assert!(stored_foos[0].is_object_id());
            assert!(stored_foos[1].is_object_id());
            assert!(stored_foos[2].is_document());
            assert_eq!(ctx.sticky().repository::<Foo>()?.count(all())?, 2);

            let loaded = masters.get(all())?;
            assert_eq!(loaded, master);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_type_tag_is_stored() {
    run_test(
        create_test_context,
        |ctx| {
            let foos = ctx.sticky().repository::<Foo>()?;
            foos.save(&mut a("x", "y"))?;

            let stored = foos.collection()?.find_one(&all())?.unwrap();
            assert_eq!(stored.get("type")?, Value::from("a"));
            assert!(!stored.contains_key(ID_FIELD));

            let loaded = foos.get(field("type").eq("a"))?;
            match loaded {
                Foo::A(inner) => {
                    assert_eq!(inner.bar, "y");
                    assert!(inner.id.is_some());
                }
                other => panic!("unexpected variant {:?}", other),
            }
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_polymorphic_load_retries_without_id() {
    run_test(
        create_test_context,
        |ctx| {
            let foos = ctx.sticky().repository::<Foo>()?;
            let mut memo = Foo::Memo(Memo {
                text: "standalone".to_string(),
            });
            let id = foos.save(&mut memo)?;

            // the stored id surfaces as `id`, which Memo does not declare
            let loaded = foos.get_by_id(id)?;
            assert_eq!(loaded, memo);

            let all_foos: Vec<Foo> = foos.find(all())?.collect::<Result<_, _>>()?;
            assert_eq!(all_foos, vec![memo]);
            Ok(())
        },
        cleanup,
    );
}

#[test]
fn test_unknown_type_tag() {
    run_test(
        create_test_context,
        |ctx| {
            let foos = ctx.sticky().repository::<Foo>()?;
            let mut document = sticky::doc! { type: "zzz", foo: "x" };
            document.put("_id", sticky::collection::ObjectId::new())?;
            foos.collection()?.update_one(
                &sticky::filter::Filter::new(),
                &document,
                &sticky::store::upsert(),
            )?;

            let err = foos.get(all()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnknownType("zzz".to_string()));
            Ok(())
        },
        cleanup,
    );
}
