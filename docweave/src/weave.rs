use crate::cleaner::ExpiryCleaner;
use crate::collection::{Document, FindOptions, FindResult, IdAllocator};
use crate::common::{Projection, DOC_ID};
use crate::embed::EmbedRegistry;
use crate::errors::{ErrorKind, WeaveError, WeaveResult, INSERT_ERROR};
use crate::filter::{by_id, Filter};
use crate::pipeline::{PipelineBuilder, QueryExecutor};
use crate::query::{check_limit, QueryModel};
use crate::store::DocumentStore;
use crate::weave_builder::WeaveBuilder;
use crate::weave_config::WeaveConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The query-and-embedding engine.
///
/// A `Weave` owns its embed registry, its id sequences (through the store)
/// and an optional expiry cleaner. Nothing is global: independent engines
/// never share state unless they share a store. All clones share the same
/// engine.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::doc;
/// use docweave::filter::field;
/// use docweave::collection::FindOptions;
///
/// let weave = Weave::builder()
///     .register_embed(ForeignKeyEmbed::new("parent", "parent_id", "categories"))
///     .open()?;
///
/// let id = weave.insert("categories", doc! { name: "Algebra", parent_id: 1 })?;
/// let page = weave.find(
///     "categories",
///     &field("parent.name").eq("Math"),
///     &FindOptions::new().embed("parent"),
/// )?;
/// ```
#[derive(Clone)]
pub struct Weave {
    inner: Arc<WeaveInner>,
}

impl Weave {
    /// Creates a [WeaveBuilder].
    pub fn builder() -> WeaveBuilder {
        WeaveBuilder::new()
    }

    pub(crate) fn new(config: WeaveConfig, registry: EmbedRegistry) -> Self {
        Weave {
            inner: Arc::new(WeaveInner::new(config, registry)),
        }
    }

    /// Finds one page of documents of `collection` matching `filter`.
    ///
    /// The result carries the number of matching documents regardless of
    /// pagination. On the join path an empty page reports a total of zero.
    pub fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> WeaveResult<FindResult> {
        self.inner.find(collection, filter, options, true)
    }

    /// [Weave::find] driven by a normalized [QueryModel].
    pub fn find_with_query(&self, collection: &str, query: &QueryModel) -> WeaveResult<FindResult> {
        query.validate(self.inner.config.max_limit())?;
        self.inner.find(collection, query.filter(), query.options(), true)
    }

    /// Finds the first document matching `filter`.
    ///
    /// Fails with `<entity>_not_found` when nothing matches.
    pub fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<Projection>,
        embed: &[&str],
    ) -> WeaveResult<Document> {
        self.inner.find_one(collection, filter, projection, embed, None)
    }

    /// Finds the document with the given `_id`.
    pub fn find_one_by_id(
        &self,
        collection: &str,
        id: i64,
        projection: Option<Projection>,
        embed: &[&str],
    ) -> WeaveResult<Document> {
        self.inner
            .find_one(collection, &by_id(id), projection, embed, Some(id))
    }

    /// Stores `body` under the next id of `collection` and returns that id.
    ///
    /// An `_id` already present in `body` is replaced.
    pub fn insert(&self, collection: &str, body: Document) -> WeaveResult<i64> {
        self.inner.insert(collection, body)
    }

    /// Sets the fields of `partial` (dotted paths allowed) on the document
    /// with the given `_id`, leaving all other fields unchanged.
    pub fn update(&self, collection: &str, id: i64, partial: &Document) -> WeaveResult<()> {
        self.inner.update(collection, id, partial)
    }

    /// Deletes the document with the given `_id`.
    pub fn delete(&self, collection: &str, id: i64) -> WeaveResult<()> {
        self.inner.delete(collection, id)
    }

    pub fn registry(&self) -> &EmbedRegistry {
        &self.inner.registry
    }

    pub fn store(&self) -> DocumentStore {
        self.inner.store.clone()
    }

    pub fn config(&self) -> &WeaveConfig {
        &self.inner.config
    }

    pub fn id_allocator(&self) -> &IdAllocator {
        &self.inner.allocator
    }

    /// The expiry cleaner, when enabled.
    pub fn cleaner(&self) -> Option<&ExpiryCleaner> {
        self.inner.cleaner.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stops the cleaner and closes the store. Closing twice is a no-op.
    pub fn close(&self) -> WeaveResult<()> {
        self.inner.close()
    }
}

struct WeaveInner {
    config: WeaveConfig,
    registry: EmbedRegistry,
    store: DocumentStore,
    executor: QueryExecutor,
    allocator: IdAllocator,
    cleaner: Option<ExpiryCleaner>,
    closed: AtomicBool,
}

impl WeaveInner {
    fn new(config: WeaveConfig, registry: EmbedRegistry) -> Self {
        let store = config.store();
        let cleaner = config.cleaner_interval().map(|interval| {
            let cleaner = ExpiryCleaner::new(store.clone());
            cleaner.start(interval);
            cleaner
        });
        WeaveInner {
            executor: QueryExecutor::new(store.clone()),
            allocator: IdAllocator::new(store.clone()),
            config,
            registry,
            store,
            cleaner,
            closed: AtomicBool::new(false),
        }
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
        with_count: bool,
    ) -> WeaveResult<FindResult> {
        let limit = options
            .get_limit()
            .unwrap_or_else(|| self.config.default_limit());
        check_limit(limit, self.config.max_limit())?;

        let plan = PipelineBuilder::new(&self.registry).build(collection, filter, options, limit)?;
        self.executor.execute(collection, &plan, with_count)
    }

    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<Projection>,
        embed: &[&str],
        id: Option<i64>,
    ) -> WeaveResult<Document> {
        let mut options = FindOptions::new().limit(1);
        if let Some(projection) = projection {
            options = options.projection(projection);
        }
        for name in embed {
            options = options.embed(name);
        }

        let result = self.find(collection, filter, &options, false)?;
        match result.into_documents().into_iter().next() {
            Some(document) => Ok(document),
            None => Err(not_found(collection, id)),
        }
    }

    fn insert(&self, collection: &str, body: Document) -> WeaveResult<i64> {
        let id = self.allocator.next_id(collection)?;
        let mut document = Document::new();
        document.put(DOC_ID, id);
        for (key, value) in body {
            if key != DOC_ID {
                document.put(key, value);
            }
        }

        self.store.insert_one(collection, document).map_err(|e| {
            log::error!("Failed to insert document {} into {}: {}", id, collection, e);
            WeaveError::new_with_cause(
                &format!("Failed to insert document into {}", collection),
                ErrorKind::StoreFailure,
                e,
            )
            .with_code(INSERT_ERROR)
        })?;
        Ok(id)
    }

    fn update(&self, collection: &str, id: i64, partial: &Document) -> WeaveResult<()> {
        let matched = self.store.update_one(collection, &by_id(id), partial)?;
        if matched == 0 {
            return Err(not_found(collection, Some(id)));
        }
        Ok(())
    }

    fn delete(&self, collection: &str, id: i64) -> WeaveResult<()> {
        let deleted = self.store.delete_one(collection, &by_id(id))?;
        if deleted == 0 {
            return Err(not_found(collection, Some(id)));
        }
        Ok(())
    }

    fn close(&self) -> WeaveResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Some(cleaner) = &self.cleaner {
            cleaner.stop();
        }
        self.store.close()
    }
}

fn not_found(collection: &str, id: Option<i64>) -> WeaveError {
    let error = WeaveError::entity_not_found(collection, id);
    log::error!("{} (code {}, ids {:?})", error, error.code(), error.entities());
    error
}
