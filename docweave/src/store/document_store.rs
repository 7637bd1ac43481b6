use crate::collection::Document;
use crate::errors::WeaveResult;
use crate::filter::Filter;
use crate::pipeline::{Pipeline, PlainFind};
use std::ops::Deref;
use std::sync::Arc;

/// Contract every storage backend implements.
///
/// Each call is atomic on its own; nothing spans several calls. Collections
/// that were never written to behave as empty collections.
///
/// # Thread Safety
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
pub trait DocumentStoreProvider: Send + Sync {
    /// Names of the collections that have received documents, sorted. A
    /// collection known only through its id sequence is not listed.
    fn collection_names(&self) -> WeaveResult<Vec<String>>;

    /// Executes a native find: filter, sort, skip, limit, then projection.
    fn find(&self, collection: &str, find: &PlainFind) -> WeaveResult<Vec<Document>>;

    /// Counts the documents matching `filter`.
    fn count(&self, collection: &str, filter: &Filter) -> WeaveResult<u64>;

    /// Runs `pipeline` over the documents of `collection`.
    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> WeaveResult<Vec<Document>>;

    /// Stores a document carrying an integer `_id` not used in the collection.
    fn insert_one(&self, collection: &str, document: Document) -> WeaveResult<()>;

    /// Sets the (possibly dotted) fields of `set` on the first document
    /// matching `filter`. Returns the number of matched documents.
    fn update_one(&self, collection: &str, filter: &Filter, set: &Document) -> WeaveResult<u64>;

    /// Deletes the first document matching `filter`. Returns the number of
    /// deleted documents.
    fn delete_one(&self, collection: &str, filter: &Filter) -> WeaveResult<u64>;

    /// Deletes every document matching `filter`.
    fn delete_many(&self, collection: &str, filter: &Filter) -> WeaveResult<u64>;

    /// Atomically increments and returns the id sequence of `collection`.
    ///
    /// A missing sequence is seeded from the largest `_id` of the collection,
    /// or zero when it is empty.
    fn next_sequence(&self, collection: &str) -> WeaveResult<i64>;

    /// Releases the backend. Later calls fail.
    fn close(&self) -> WeaveResult<()>;
}

/// Cloneable handle to a [DocumentStoreProvider].
///
/// All clones share the same backend.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
