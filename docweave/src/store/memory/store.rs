use super::evaluate;
use crate::collection::Document;
use crate::common::DOC_ID;
use crate::errors::{ErrorKind, WeaveError, WeaveResult, CONFLICT};
use crate::filter::Filter;
use crate::pipeline::{Pipeline, PlainFind};
use crate::store::DocumentStoreProvider;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Collection = Arc<RwLock<Vec<Document>>>;

/// In-memory implementation of a document store.
///
/// Every collection is a vector of documents in insertion order guarded by
/// its own `RwLock`. Id sequences live in a `DashMap`, whose entry lock makes
/// seeding and incrementing a sequence one atomic step. All data is lost when
/// the store is dropped.
///
/// ```text
/// let store = DocumentStore::new(InMemoryStore::new());
/// store.insert_one("questions", doc! { "_id": 1, text: "x+1" })?;
/// let id = store.next_sequence("questions")?; // 2
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::default()),
        }
    }
}

impl DocumentStoreProvider for InMemoryStore {
    fn collection_names(&self) -> WeaveResult<Vec<String>> {
        self.inner.check_opened()?;
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn find(&self, collection: &str, find: &PlainFind) -> WeaveResult<Vec<Document>> {
        self.inner.check_opened()?;
        let mut documents: Vec<Document> = self
            .inner
            .snapshot(collection)
            .into_iter()
            .filter(|document| find.filter.matches(document))
            .collect();
        documents.sort_by(|a, b| find.sort.compare(a, b));

        let skip = usize::try_from(find.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(find.limit).unwrap_or(usize::MAX);
        Ok(documents
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| match &find.projection {
                Some(projection) => projection.apply(&document),
                None => document,
            })
            .collect())
    }

    fn count(&self, collection: &str, filter: &Filter) -> WeaveResult<u64> {
        self.inner.check_opened()?;
        let count = match self.inner.collection(collection) {
            Some(documents) => documents.read().iter().filter(|d| filter.matches(d)).count(),
            None => 0,
        };
        Ok(count as u64)
    }

    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> WeaveResult<Vec<Document>> {
        self.inner.check_opened()?;
        let source = self.inner.snapshot(collection);
        Ok(evaluate(source, pipeline, |name| self.inner.snapshot(name)))
    }

    fn insert_one(&self, collection: &str, document: Document) -> WeaveResult<()> {
        self.inner.check_opened()?;
        let Some(id) = document.id() else {
            log::error!("Document inserted into {} has no integer _id", collection);
            return Err(WeaveError::new(
                "Document has no integer _id",
                ErrorKind::Invalid,
            ));
        };

        {
            let documents = self.inner.collection_or_create(collection);
            let mut documents = documents.write();
            if documents.iter().any(|d| d.id() == Some(id)) {
                log::error!("Duplicate _id {} in collection {}", id, collection);
                return Err(WeaveError::new(
                    &format!("Duplicate _id {} in collection {}", id, collection),
                    ErrorKind::Conflict,
                )
                .with_code(CONFLICT));
            }
            documents.push(document);
        }

        // an explicit id beyond the sequence moves the sequence forward
        if let Some(mut sequence) = self.inner.sequences.get_mut(collection) {
            if id > *sequence {
                *sequence = id;
            }
        }
        Ok(())
    }

    fn update_one(&self, collection: &str, filter: &Filter, set: &Document) -> WeaveResult<u64> {
        self.inner.check_opened()?;
        let Some(documents) = self.inner.collection(collection) else {
            return Ok(0);
        };
        let mut documents = documents.write();
        let Some(document) = documents.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(0);
        };

        if let Some(new_id) = set.get(DOC_ID) {
            if document.get(DOC_ID) != Some(new_id) {
                log::error!("Attempt to change _id of a document in {}", collection);
                return Err(WeaveError::new(
                    "The _id of a document cannot be changed",
                    ErrorKind::Invalid,
                ));
            }
        }
        for (path, value) in set.iter() {
            document.put_path(path, value.clone());
        }
        Ok(1)
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> WeaveResult<u64> {
        self.inner.check_opened()?;
        let Some(documents) = self.inner.collection(collection) else {
            return Ok(0);
        };
        let mut documents = documents.write();
        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> WeaveResult<u64> {
        self.inner.check_opened()?;
        let Some(documents) = self.inner.collection(collection) else {
            return Ok(0);
        };
        let mut documents = documents.write();
        let before = documents.len();
        documents.retain(|d| !filter.matches(d));
        Ok((before - documents.len()) as u64)
    }

    fn next_sequence(&self, collection: &str) -> WeaveResult<i64> {
        self.inner.check_opened()?;
        let mut sequence = self
            .inner
            .sequences
            .entry(collection.to_string())
            .or_insert_with(|| self.inner.max_id(collection));
        *sequence += 1;
        Ok(*sequence)
    }

    fn close(&self) -> WeaveResult<()> {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.collections.clear();
        self.inner.sequences.clear();
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    collections: DashMap<String, Collection>,
    sequences: DashMap<String, i64>,
    closed: AtomicBool,
}

impl InMemoryStoreInner {
    fn check_opened(&self) -> WeaveResult<()> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("Store is closed");
            return Err(WeaveError::new("Store is closed", ErrorKind::StoreFailure));
        }
        Ok(())
    }

    fn collection(&self, name: &str) -> Option<Collection> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }

    fn collection_or_create(&self, name: &str) -> Collection {
        self.collections
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Copies the documents of a collection, empty if it does not exist.
    fn snapshot(&self, name: &str) -> Vec<Document> {
        self.collection(name)
            .map(|documents| documents.read().clone())
            .unwrap_or_default()
    }

    fn max_id(&self, name: &str) -> i64 {
        self.collection(name)
            .and_then(|documents| documents.read().iter().filter_map(Document::id).max())
            .unwrap_or(0)
    }
}
