use docweave::common::Value;
use docweave::doc;
use docweave::errors::ErrorKind;
use docweave::filter::field;
use docweave_int_test::test_util::{cleanup, create_test_context, insert_categories, run_test};

#[test]
fn test_update_merges_only_given_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            weave.insert(
                "questions",
                doc! { text: "2+2", answer: 4, meta: { level: 1, public: true } },
            )?;

            weave.update("questions", 1, &doc! { answer: 5, "meta.level": 2 })?;

            let question = weave.find_one_by_id("questions", 1, None, &[])?;
            assert_eq!(question.get("text"), Some(&Value::from("2+2")));
            assert_eq!(question.get("answer"), Some(&Value::I64(5)));
            assert_eq!(question.get_path("meta.level"), Some(&Value::I64(2)));
            assert_eq!(question.get_path("meta.public"), Some(&Value::Bool(true)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_missing_document_is_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let error = ctx
                .weave()
                .update("questions", 17, &doc! { answer: 5 })
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::NotFound);
            assert_eq!(error.code(), "question_not_found");
            assert_eq!(error.entities(), &[17]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_twice() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            weave.delete("categories", 2)?;
            let error = weave
                .delete("categories", 2)
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.kind(), &ErrorKind::NotFound);
            assert_eq!(error.code(), "category_not_found");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one_not_found() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            insert_categories(&weave)?;

            let error = weave
                .find_one("categories", &field("name").eq("Physics"), None, &[])
                .err()
                .ok_or("expected an error")?;
            assert_eq!(error.code(), "category_not_found");
            assert!(error.entities().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_returns_id_and_stores_body() {
    run_test(
        create_test_context,
        |ctx| {
            let weave = ctx.weave();
            let id = weave.insert("answers", doc! { question_id: 3, text: "four" })?;
            assert_eq!(id, 1);

            let answer = weave.find_one_by_id("answers", id, None, &[])?;
            assert_eq!(answer, doc! { "_id": 1, question_id: 3, text: "four" });
            Ok(())
        },
        cleanup,
    )
}
