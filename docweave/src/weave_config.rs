//! Configuration of a [Weave](crate::weave::Weave) engine.

use crate::common::{DEFAULT_CLEANER_INTERVAL_SECS, DEFAULT_LIMIT, MAX_LIMIT};
use crate::errors::{ErrorKind, WeaveError, WeaveResult};
use crate::store::{DocumentStore, InMemoryStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Engine settings shared by all clones.
///
/// Settings can only change until the engine is opened; afterwards every
/// setter fails.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::weave::Weave;
///
/// let weave = Weave::builder()
///     .default_limit(25)
///     .enable_cleaner(Duration::from_secs(60))
///     .open()?;
/// assert_eq!(weave.config().default_limit(), 25);
/// ```
#[derive(Clone)]
pub struct WeaveConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<WeaveConfigInner>,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl WeaveConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        WeaveConfig {
            inner: Arc::new(WeaveConfigInner::new()),
        }
    }

    /// Page size used when a query sets no limit.
    pub fn default_limit(&self) -> u64 {
        self.inner.default_limit.load(Ordering::Relaxed)
    }

    pub fn set_default_limit(&self, limit: u64) -> WeaveResult<()> {
        self.inner.check_not_initialized()?;
        if limit == 0 {
            log::error!("Default limit must be positive");
            return Err(WeaveError::new(
                "Default limit must be positive",
                ErrorKind::Invalid,
            ));
        }
        self.inner.default_limit.store(limit, Ordering::Relaxed);
        Ok(())
    }

    /// Largest page size a query may request.
    pub fn max_limit(&self) -> u64 {
        self.inner.max_limit.load(Ordering::Relaxed)
    }

    pub fn set_max_limit(&self, limit: u64) -> WeaveResult<()> {
        self.inner.check_not_initialized()?;
        if limit == 0 {
            log::error!("Max limit must be positive");
            return Err(WeaveError::new("Max limit must be positive", ErrorKind::Invalid));
        }
        self.inner.max_limit.store(limit, Ordering::Relaxed);
        Ok(())
    }

    /// Interval of the expiry cleaner, `None` when the cleaner is disabled.
    pub fn cleaner_interval(&self) -> Option<Duration> {
        *self.inner.cleaner_interval.lock()
    }

    pub fn set_cleaner_interval(&self, interval: Option<Duration>) -> WeaveResult<()> {
        self.inner.check_not_initialized()?;
        if interval.is_some_and(|i| i.is_zero()) {
            log::error!("Cleaner interval must be positive");
            return Err(WeaveError::new(
                "Cleaner interval must be positive",
                ErrorKind::Invalid,
            ));
        }
        *self.inner.cleaner_interval.lock() = interval;
        Ok(())
    }

    /// The configured store; an in-memory store unless one was set.
    pub fn store(&self) -> DocumentStore {
        self.inner
            .store
            .get_or_init(|| DocumentStore::new(InMemoryStore::new()))
            .clone()
    }

    pub fn set_store(&self, store: DocumentStore) -> WeaveResult<()> {
        self.inner.check_not_initialized()?;
        self.inner.store.set(store).map_err(|_| {
            log::error!("Store is already configured");
            WeaveError::new("Store is already configured", ErrorKind::Invalid)
        })
    }

    /// Validates the settings and freezes them.
    pub(crate) fn initialize(&self) -> WeaveResult<()> {
        self.inner.check_not_initialized()?;
        if self.default_limit() > self.max_limit() {
            log::error!(
                "Default limit {} exceeds max limit {}",
                self.default_limit(),
                self.max_limit()
            );
            return Err(WeaveError::new(
                &format!(
                    "Default limit {} exceeds max limit {}",
                    self.default_limit(),
                    self.max_limit()
                ),
                ErrorKind::Invalid,
            ));
        }
        self.inner.initialized.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }
}

struct WeaveConfigInner {
    default_limit: AtomicU64,
    max_limit: AtomicU64,
    cleaner_interval: Mutex<Option<Duration>>,
    store: OnceLock<DocumentStore>,
    initialized: AtomicBool,
}

impl WeaveConfigInner {
    fn new() -> Self {
        WeaveConfigInner {
            default_limit: AtomicU64::new(DEFAULT_LIMIT),
            max_limit: AtomicU64::new(MAX_LIMIT),
            cleaner_interval: Mutex::new(None),
            store: OnceLock::new(),
            initialized: AtomicBool::new(false),
        }
    }

    fn check_not_initialized(&self) -> WeaveResult<()> {
        if self.initialized.load(Ordering::Acquire) {
            log::error!("Configuration cannot be changed after the engine is opened");
            return Err(WeaveError::new(
                "Configuration cannot be changed after the engine is opened",
                ErrorKind::Invalid,
            ));
        }
        Ok(())
    }
}

/// Interval the expiry cleaner runs at when enabled without one.
pub fn default_cleaner_interval() -> Duration {
    Duration::from_secs(DEFAULT_CLEANER_INTERVAL_SECS)
}
