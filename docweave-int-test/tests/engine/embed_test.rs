use docweave::collection::{embed_all, FindOptions};
use docweave::common::{Projection, SortOrder, Value};
use docweave::doc;
use docweave::errors::ErrorKind;
use docweave::filter::{all, field};
use docweave_int_test::test_util::{
    cleanup, create_test_context, insert_categories, insert_questions, run_test,
};

#[test]
fn test_filter_on_embed_hides_it() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            let result = weave.find(
                "categories",
                &field("parent.name").eq("Math"),
                &FindOptions::new(),
            )?;
            assert_eq!(result.ids(), vec![2]);
            assert_eq!(result.total_count(), 1);
            let algebra = &result.documents()[0];
            assert!(!algebra.contains_key("parent"));
            assert_eq!(algebra.get("name"), Some(&Value::from("Algebra")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_on_requested_embed_returns_it() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            let result = weave.find(
                "categories",
                &field("parent.name").eq("Math"),
                &embed_all(&["parent"]),
            )?;
            assert_eq!(result.ids(), vec![2]);
            let algebra = &result.documents()[0];
            assert_eq!(
                algebra.get("parent"),
                Some(&Value::from(doc! { "_id": 1, name: "Math", parent_id: 0 }))
            );
            assert!(!algebra.contains_key("parent_id"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unmatched_join_is_null() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            let result = weave.find("categories", &all(), &embed_all(&["parent"]))?;
            assert_eq!(result.ids(), vec![1, 2]);
            assert_eq!(result.total_count(), 2);
            assert_eq!(result.documents()[0].get("parent"), Some(&Value::Null));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_array_embed_collects_all_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            insert_questions(&weave, 5)?;

            let math = weave.find_one_by_id("categories", 1, None, &["questions"])?;
            let questions = math
                .get("questions")
                .and_then(Value::as_array)
                .ok_or("questions missing")?;
            assert_eq!(questions.len(), 3);
            // the host _id is the local field and stays visible
            assert_eq!(math.id(), Some(1));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_function_embed_replaces_local_field() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_questions(&weave, 4)?;

            let result = weave.find("questions", &all(), &embed_all(&["author_tag"]))?;
            assert_eq!(result.total_count(), 4);
            for (i, question) in result.documents().iter().enumerate() {
                assert!(!question.contains_key("author_id"));
                assert_eq!(
                    question.get("author_tag"),
                    Some(&Value::from(format!("author-{}", i % 3)))
                );
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_joined_and_computed_embeds_together() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            insert_questions(&weave, 2)?;

            let question = weave.find_one(
                "questions",
                &field("category.name").eq("Algebra"),
                Some(Projection::include(&["text"])),
                &["category", "author_tag"],
            )?;
            assert_eq!(question.id(), Some(2));
            assert_eq!(question.get("text"), Some(&Value::from("question 1")));
            assert_eq!(
                question.get_path("category.name"),
                Some(&Value::from("Algebra"))
            );
            assert_eq!(question.get("author_tag"), Some(&Value::from("author-1")));
            assert!(!question.contains_key("category_id"));
            assert!(!question.contains_key("author_id"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_embed_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let error = ctx
                .weave()
                .find("categories", &all(), &embed_all(&["grandparent"]))
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::NotFound);
            assert_eq!(error.code(), "unknown_embed");
            assert!(error.message().contains("grandparent"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_join_page_reports_zero_total() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            let result = weave.find(
                "categories",
                &all(),
                &embed_all(&["parent"]).skip(5),
            )?;
            assert!(result.is_empty());
            assert_eq!(result.total_count(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_total_count_on_join_path_ignores_paging() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            insert_questions(&weave, 7)?;

            let result = weave.find(
                "questions",
                &field("category.name").eq("Math"),
                &FindOptions::new().limit(2).skip(1),
            )?;
            assert_eq!(result.ids(), vec![3, 5]);
            assert_eq!(result.total_count(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_resolver_error_propagates() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            weave.insert("questions", doc! { text: "x", author_id: (-5) })?;

            let error = weave
                .find("questions", &all(), &embed_all(&["author_tag"]))
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::NotFound);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_embed_sort_on_excluded_field_matches_plain_order() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;
            weave.insert("categories", doc! { name: "Zoology", parent_id: 0 })?;

            let options = FindOptions::new()
                .projection(Projection::exclude(&["name"]))
                .sort_by("name", SortOrder::Descending);
            let plain = weave.find("categories", &all(), &options)?;
            assert_eq!(plain.ids(), vec![3, 1, 2]);

            let embedded = weave.find("categories", &all(), &options.clone().embed("parent"))?;
            assert_eq!(embedded.ids(), vec![3, 1, 2]);
            assert!(embedded.documents().iter().all(|d| d.get("name").is_none()));
            let parent = embedded.documents()[2]
                .get("parent")
                .and_then(Value::as_document)
                .and_then(|p| p.get("name"));
            assert_eq!(parent, Some(&Value::from("Math")));
            Ok(())
        },
        cleanup,
    )
}
