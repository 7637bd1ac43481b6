use crate::embed::{EmbedDescriptor, EmbedRegistry};
use crate::errors::{WeaveError, WeaveResult};
use crate::store::{DocumentStore, DocumentStoreProvider};
use crate::weave::Weave;
use crate::weave_config::{default_cleaner_interval, WeaveConfig};
use std::time::Duration;

/// Builder for creating and configuring a [Weave] engine.
///
/// The builder captures the first configuration error and reports it from
/// [WeaveBuilder::open]. Embeds registered here make up the engine's
/// registry, which is read-only once the engine is open.
///
/// # Examples
///
/// ```rust,ignore
/// use docweave::embed::{ForeignKeyEmbed, FunctionEmbed};
/// use docweave::weave::Weave;
///
/// let weave = Weave::builder()
///     .store(InMemoryStore::new())
///     .register_embed(ForeignKeyEmbed::new("parent", "parent_id", "categories"))
///     .register_embed(FunctionEmbed::new("author", "author_id", resolve_author))
///     .default_limit(20)
///     .open()?;
/// ```
#[derive(Default)]
pub struct WeaveBuilder {
    error: Option<WeaveError>,
    config: WeaveConfig,
    registry: EmbedRegistry,
}

impl WeaveBuilder {
    /// Creates a builder using an in-memory store and default limits.
    pub fn new() -> Self {
        WeaveBuilder {
            error: None,
            config: WeaveConfig::new(),
            registry: EmbedRegistry::new(),
        }
    }

    /// Sets the storage backend.
    pub fn store<T: DocumentStoreProvider + 'static>(self, store: T) -> Self {
        self.document_store(DocumentStore::new(store))
    }

    /// Sets an already wrapped storage backend, possibly shared with others.
    pub fn document_store(mut self, store: DocumentStore) -> Self {
        self.capture(|config| config.set_store(store));
        self
    }

    /// Registers an embed; a later registration under the same name
    /// replaces the earlier one.
    pub fn register_embed<D: Into<EmbedDescriptor>>(mut self, descriptor: D) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// Page size used when a query sets no limit.
    pub fn default_limit(mut self, limit: u64) -> Self {
        self.capture(|config| config.set_default_limit(limit));
        self
    }

    /// Largest page size a query may request.
    pub fn max_limit(mut self, limit: u64) -> Self {
        self.capture(|config| config.set_max_limit(limit));
        self
    }

    /// Runs the expiry cleaner every `interval`.
    pub fn enable_cleaner(mut self, interval: Duration) -> Self {
        self.capture(|config| config.set_cleaner_interval(Some(interval)));
        self
    }

    /// Runs the expiry cleaner at the default interval of five minutes.
    pub fn enable_default_cleaner(self) -> Self {
        self.enable_cleaner(default_cleaner_interval())
    }

    /// Validates the configuration and opens the engine.
    pub fn open(self) -> WeaveResult<Weave> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.initialize()?;
        Ok(Weave::new(self.config, self.registry))
    }

    fn capture<F: FnOnce(&WeaveConfig) -> WeaveResult<()>>(&mut self, setter: F) {
        if self.error.is_none() {
            if let Err(e) = setter(&self.config) {
                self.error = Some(e);
            }
        }
    }
}
