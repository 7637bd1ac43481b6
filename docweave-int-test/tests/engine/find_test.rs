use docweave::collection::{limit_to, order_by, FindOptions};
use docweave::common::{Projection, SortOrder, Value};
use docweave::doc;
use docweave::errors::ErrorKind;
use docweave::filter::{all, field};
use docweave_int_test::test_util::{cleanup, create_test_context, insert_questions, run_test};

#[test]
fn test_find_all_sorted_by_id_with_total() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 25)?;

            let first = weave.find("questions", &all(), &FindOptions::new())?;
            assert_eq!(first.ids(), (1..=10).collect::<Vec<i64>>());
            assert_eq!(first.total_count(), 25);

            let last = weave.find("questions", &all(), &FindOptions::new().skip(20))?;
            assert_eq!(last.ids(), vec![21, 22, 23, 24, 25]);
            assert_eq!(last.total_count(), 25);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_filter_counts_matches_only() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 9)?;

            let result = weave.find("questions", &field("category_id").eq(2), &limit_to(2))?;
            assert_eq!(result.ids(), vec![2, 4]);
            assert_eq!(result.total_count(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_past_last_page_on_plain_path() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 3)?;

            let result = weave.find("questions", &all(), &FindOptions::new().skip(10))?;
            assert!(result.is_empty());
            assert_eq!(result.total_count(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_sort_descending_is_stable() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 6)?;

            let result = weave.find(
                "questions",
                &all(),
                &order_by("category_id", SortOrder::Descending),
            )?;
            // ties keep the _id order of the collection
            assert_eq!(result.ids(), vec![2, 4, 6, 1, 3, 5]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_projection() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 2)?;

            let options = FindOptions::new().projection(Projection::include(&["text"]));
            let result = weave.find("questions", &all(), &options)?;
            assert_eq!(
                result.documents()[0],
                doc! { "_id": 1, text: "question 0" }
            );

            let options = FindOptions::new().projection(Projection::exclude(&["text", "author_id"]));
            let result = weave.find("questions", &all(), &options)?;
            assert_eq!(
                result.documents()[1],
                doc! { "_id": 2, category_id: 2 }
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_on_missing_collection_is_empty() {
    run_test(
        create_test_context,
        |ctx| {
            let result = ctx.weave().find("nothing", &all(), &FindOptions::new())?;
            assert!(result.is_empty());
            assert_eq!(result.total_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_nested_field_without_embed() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            weave.insert("quizzes", doc! { title: "a", meta: { level: 1 } })?;
            weave.insert("quizzes", doc! { title: "b", meta: { level: 2 } })?;

            let result = weave.find("quizzes", &field("meta.level").eq(2), &FindOptions::new())?;
            assert_eq!(result.ids(), vec![2]);
            assert_eq!(result.total_count(), 1);
            assert_eq!(
                result.documents()[0].get_path("meta.level"),
                Some(&Value::I64(2))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_rejects_limit_out_of_range() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            for limit in [0, 201] {
                let error = weave
                    .find("questions", &all(), &limit_to(limit))
                    .err()
                    .ok_or("expected an error")?;
                assert_eq!(error.kind(), &ErrorKind::Invalid);
            }
            assert!(weave.find("questions", &all(), &limit_to(200)).is_ok());
            Ok(())
        },
        cleanup,
    )
}
