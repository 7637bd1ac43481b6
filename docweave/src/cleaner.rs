use crate::common::EXPIRY_FIELD;
use crate::errors::WeaveResult;
use crate::filter::field;
use crate::store::DocumentStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use timer::{Guard, Timer};

/// Periodically deletes documents whose `exp` field (unix seconds) lies in
/// the past, across every collection of the store.
///
/// The cleaner is idle until [ExpiryCleaner::start] is called and stops when
/// [ExpiryCleaner::stop] is called or the last clone is dropped.
#[derive(Clone)]
pub struct ExpiryCleaner {
    inner: Arc<ExpiryCleanerInner>,
}

struct ExpiryCleanerInner {
    store: DocumentStore,
    timer: Timer,
    guard: Mutex<Option<Guard>>,
}

impl ExpiryCleaner {
    pub fn new(store: DocumentStore) -> Self {
        ExpiryCleaner {
            inner: Arc::new(ExpiryCleanerInner {
                store,
                timer: Timer::new(),
                guard: Mutex::new(None),
            }),
        }
    }

    /// Runs one pass synchronously and returns the number of deleted documents.
    pub fn sweep(&self) -> WeaveResult<u64> {
        sweep_store(&self.inner.store)
    }

    /// Starts sweeping every `interval`. A running schedule is replaced.
    pub fn start(&self, interval: Duration) {
        let chrono_interval = match chrono::Duration::from_std(interval) {
            Ok(duration) => duration,
            Err(e) => {
                log::error!("Invalid cleaner interval {:?}: {}, cleaner not started", interval, e);
                return;
            }
        };

        let store = self.inner.store.clone();
        let guard = self.inner.timer.schedule_repeating(chrono_interval, move || {
            match sweep_store(&store) {
                Ok(0) => {}
                Ok(deleted) => log::debug!("Expiry cleaner deleted {} documents", deleted),
                Err(e) => log::error!("Expiry cleaner failed: {}", e),
            }
        });
        *self.inner.guard.lock() = Some(guard);
    }

    /// Cancels the schedule; a sweep already running completes.
    pub fn stop(&self) {
        self.inner.guard.lock().take();
    }

    pub fn is_running(&self) -> bool {
        self.inner.guard.lock().is_some()
    }
}

fn sweep_store(store: &DocumentStore) -> WeaveResult<u64> {
    let now = chrono::Utc::now().timestamp();
    let expired = field(EXPIRY_FIELD).lt(now);
    let mut deleted = 0;
    for collection in store.collection_names()? {
        deleted += store.delete_many(&collection, &expired)?;
    }
    Ok(deleted)
}
