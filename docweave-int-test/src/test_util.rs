use docweave::collection::Document;
use docweave::common::Value;
use docweave::doc;
use docweave::embed::{ForeignKeyEmbed, FunctionEmbed};
use docweave::errors::{ErrorKind, WeaveError, WeaveResult};
use docweave::store::{DocumentStore, InMemoryStore};
use docweave::Weave;
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread to avoid thread exhaustion when running many tests in parallel.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> WeaveResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> WeaveResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> WeaveResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    eprintln!("\nBacktrace:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("Panic: {}", message)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    weave: Weave,
}

impl TestContext {
    pub fn new(weave: Weave) -> Self {
        Self { weave }
    }

    pub fn weave(&self) -> Weave {
        self.weave.clone()
    }
}

/// Resolves `author_id` to an author tag; negative ids are rejected.
pub fn author_tag(author_id: &Value) -> WeaveResult<Value> {
    match author_id.as_i64() {
        Some(id) if id >= 0 => Ok(Value::from(format!("author-{}", id))),
        Some(id) => Err(WeaveError::new(
            &format!("Unknown author {}", id),
            ErrorKind::NotFound,
        )),
        None => Ok(Value::Null),
    }
}

/// An engine over a fresh in-memory store with the embeds used across the
/// integration tests registered.
pub fn create_test_context() -> WeaveResult<TestContext> {
    let weave = Weave::builder()
        .store(InMemoryStore::new())
        .register_embed(ForeignKeyEmbed::new("parent", "parent_id", "categories"))
        .register_embed(ForeignKeyEmbed::new("category", "category_id", "categories"))
        .register_embed(
            ForeignKeyEmbed::new("questions", "_id", "questions")
                .on_foreign_field("category_id")
                .array(),
        )
        .register_embed(FunctionEmbed::new("author_tag", "author_id", author_tag))
        .open()?;
    Ok(TestContext::new(weave))
}

/// Like [create_test_context] over a caller supplied store.
pub fn create_test_context_with_store(store: DocumentStore) -> WeaveResult<TestContext> {
    let weave = Weave::builder()
        .document_store(store)
        .register_embed(ForeignKeyEmbed::new("parent", "parent_id", "categories"))
        .open()?;
    Ok(TestContext::new(weave))
}

pub fn cleanup(ctx: TestContext) -> WeaveResult<()> {
    ctx.weave().close()
}

/// Inserts `{_id:1, name:"Math", parent_id:0}` and
/// `{_id:2, name:"Algebra", parent_id:1}` into `categories`.
pub fn insert_categories(weave: &Weave) -> WeaveResult<()> {
    weave.insert("categories", doc! { name: "Math", parent_id: 0 })?;
    weave.insert("categories", doc! { name: "Algebra", parent_id: 1 })?;
    Ok(())
}

/// Inserts `count` questions alternating between categories 1 and 2.
pub fn insert_questions(weave: &Weave, count: i64) -> WeaveResult<Vec<i64>> {
    (0..count)
        .map(|i| {
            let question: Document = doc! {
                text: (format!("question {}", i)),
                category_id: (1 + i % 2),
                author_id: (i % 3),
            };
            weave.insert("questions", question)
        })
        .collect()
}
