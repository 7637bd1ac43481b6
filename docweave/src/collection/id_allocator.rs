use crate::errors::WeaveResult;
use crate::store::DocumentStore;

/// Hands out sequential integer primary keys per collection.
///
/// The first id of a collection is one more than its largest existing `_id`
/// (1 for an empty collection). Every later call returns the next integer.
/// Increments are performed atomically by the store, so concurrent callers
/// never receive the same id.
#[derive(Clone)]
pub struct IdAllocator {
    store: DocumentStore,
}

impl IdAllocator {
    pub fn new(store: DocumentStore) -> Self {
        IdAllocator { store }
    }

    /// Returns the next unused id of `collection`.
    pub fn next_id(&self, collection: &str) -> WeaveResult<i64> {
        let id = self.store.next_sequence(collection)?;
        log::trace!("Allocated id {} for collection {}", id, collection);
        Ok(id)
    }
}
