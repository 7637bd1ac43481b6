use docweave::common::Value;
use docweave::doc;
use docweave::errors::ErrorKind;
use docweave::query::QueryModel;
use docweave::Weave;
use docweave_int_test::test_util::{
    cleanup, create_test_context, insert_categories, insert_questions, run_test, TestContext,
};

#[test]
fn test_query_sort_descending_and_exclude() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            weave.insert("categories", doc! { name: "Biology", parent_id: 0 })?;

            let query = QueryModel::from_normalized(&doc! {
                sort: ["-name"],
                exclude: ["parent_id"],
            })?;
            let result = weave.find_with_query("categories", &query)?;
            assert_eq!(result.ids(), vec![1, 3, 2]);
            for category in result.documents() {
                assert!(!category.contains_key("parent_id"));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_list_filter_mixes_exact_and_patterns() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            weave.insert("categories", doc! { name: "Geometry", parent_id: 1 })?;

            let query = QueryModel::from_normalized(&doc! { name: ["^ALG", "try$"] })?;
            let result = weave.find_with_query("categories", &query)?;
            assert_eq!(result.ids(), vec![2, 3]);

            let query = QueryModel::from_normalized(&doc! { "_id": [1, 3] })?;
            let result = weave.find_with_query("categories", &query)?;
            assert_eq!(result.ids(), vec![1, 3]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_paging_and_embed() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            insert_questions(&weave, 6)?;

            let query = QueryModel::from_normalized(&doc! {
                category_id: [2],
                limit: 2,
                skip: 1,
                embed: ["category"],
            })?;
            let result = weave.find_with_query("questions", &query)?;
            assert_eq!(result.ids(), vec![4, 6]);
            assert_eq!(result.total_count(), 3);
            assert_eq!(
                result.documents()[0].get_path("category.name"),
                Some(&Value::from("Algebra"))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_rejects_invalid_parameters() {
    run_test(
        create_test_context,
        |ctx| {
            for query in [doc! { limit: 0 }, doc! { name: ["[unclosed"] }] {
                let error = QueryModel::from_normalized(&query)
                    .err()
                    .ok_or("expected an error")?;
                assert_eq!(error.kind(), &ErrorKind::Invalid);
            }

            let query = QueryModel::from_normalized(&doc! { limit: 500 })?;
            let error = ctx
                .weave()
                .find_with_query("questions", &query)
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::Invalid);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_query_limit_follows_configured_maximum() {
    run_test(
        || Weave::builder().max_limit(500).open().map(TestContext::new),
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 320)?;

            let query = QueryModel::from_normalized(&doc! { limit: 300 })?;
            let result = weave.find_with_query("questions", &query)?;
            assert_eq!(result.len(), 300);
            assert_eq!(result.total_count(), 320);

            let query = QueryModel::from_normalized(&doc! { limit: 501 })?;
            let error = weave
                .find_with_query("questions", &query)
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::Invalid);
            Ok(())
        },
        cleanup,
    )
}
