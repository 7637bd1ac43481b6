use docweave::doc;
use docweave::store::{DocumentStore, InMemoryStore};
use docweave_int_test::test_util::{cleanup, create_test_context_with_store, run_test};
use std::collections::HashSet;
use std::thread;

#[test]
fn test_ids_continue_after_existing_documents() {
    run_test(
        || {
            let store = DocumentStore::new(InMemoryStore::new());
            for id in [3, 8, 5] {
                store.insert_one("questions", doc! { "_id": id, text: "seeded" })?;
            }
            create_test_context_with_store(store)
        },
        |ctx| {
            let weave = ctx.weave();
            let ids = (0..4)
                .map(|_| weave.insert("questions", doc! { text: "new" }))
                .collect::<Result<Vec<i64>, _>>()?;
            assert_eq!(ids, vec![9, 10, 11, 12]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_ids_are_per_collection() {
    run_test(
        || create_test_context_with_store(DocumentStore::new(InMemoryStore::new())),
        |ctx| {
            let weave = ctx.weave();
            assert_eq!(weave.insert("questions", doc! { text: "a" })?, 1);
            assert_eq!(weave.insert("categories", doc! { name: "b" })?, 1);
            assert_eq!(weave.insert("questions", doc! { text: "c" })?, 2);
            assert_eq!(weave.id_allocator().next_id("categories")?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_inserts_get_distinct_ids() {
    run_test(
        || create_test_context_with_store(DocumentStore::new(InMemoryStore::new())),
        |ctx| {
            let handles: Vec<_> = (0..4)
                .map(|worker| {
                    let weave = ctx.weave();
                    thread::spawn(move || {
                        (0..25)
                            .map(|i| weave.insert("answers", doc! { worker: worker, index: i }))
                            .collect::<Result<Vec<i64>, _>>()
                    })
                })
                .collect();

            let mut ids = HashSet::new();
            for handle in handles {
                let inserted = handle.join().map_err(|_| "insert thread panicked")??;
                for id in inserted {
                    assert!(ids.insert(id), "id {} assigned twice", id);
                }
            }
            assert_eq!(ids.len(), 100);
            assert_eq!(ctx.weave().store().count("answers", &docweave::filter::all())?, 100);
            Ok(())
        },
        cleanup,
    )
}
