use super::EmbedDescriptor;
use crate::errors::{ErrorKind, WeaveError, WeaveResult, UNKNOWN_EMBED};
use indexmap::IndexMap;

/// Table of named embed descriptors.
///
/// Iteration follows registration order, which is also the order in which
/// join stages are emitted. Registering a name twice replaces the earlier
/// descriptor in place.
#[derive(Clone, Debug, Default)]
pub struct EmbedRegistry {
    embeds: IndexMap<String, EmbedDescriptor>,
}

impl EmbedRegistry {
    pub fn new() -> Self {
        EmbedRegistry {
            embeds: IndexMap::new(),
        }
    }

    /// Registers a descriptor under its name, returning the one it replaced.
    pub fn register<D: Into<EmbedDescriptor>>(&mut self, descriptor: D) -> Option<EmbedDescriptor> {
        let descriptor = descriptor.into();
        let name = descriptor.name().to_string();
        let previous = self.embeds.insert(name.clone(), descriptor);
        if previous.is_some() {
            log::warn!("Embed {} registered twice, the later descriptor replaces the earlier", name);
        }
        previous
    }

    /// Looks up a descriptor, failing with `unknown_embed` when absent.
    pub fn resolve(&self, name: &str) -> WeaveResult<&EmbedDescriptor> {
        self.embeds.get(name).ok_or_else(|| {
            log::error!("Embed {} is not registered", name);
            WeaveError::new(&format!("Embed {} not found", name), ErrorKind::NotFound)
                .with_code(UNKNOWN_EMBED)
        })
    }

    pub fn get(&self, name: &str) -> Option<&EmbedDescriptor> {
        self.embeds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.embeds.contains_key(name)
    }

    /// Position of the embed in registration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.embeds.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.embeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbedDescriptor> {
        self.embeds.values()
    }
}
