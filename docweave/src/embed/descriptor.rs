use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::WeaveResult;
use crate::pipeline::JoinSpec;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Computes the value of a [FunctionEmbed] from the host document's local field.
///
/// The resolver receives `Value::Null` when the local field is missing.
pub type Resolver = Arc<dyn Fn(&Value) -> WeaveResult<Value> + Send + Sync>;

/// A join resolved by the store through equality between `local_field` of
/// the host document and `foreign_field` of documents in `foreign_collection`.
///
/// The joined documents are written to a field named after the embed. Unless
/// the embed is an array embed, the joined array is flattened to a single
/// document, or to null when nothing matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyEmbed {
    name: String,
    local_field: String,
    foreign_collection: String,
    foreign_field: String,
    is_array: bool,
}

impl ForeignKeyEmbed {
    /// Creates a single-valued embed joining on the foreign `_id`.
    pub fn new(name: &str, local_field: &str, foreign_collection: &str) -> Self {
        ForeignKeyEmbed {
            name: name.to_string(),
            local_field: local_field.to_string(),
            foreign_collection: foreign_collection.to_string(),
            foreign_field: DOC_ID.to_string(),
            is_array: false,
        }
    }

    /// Keeps the joined documents as an array instead of flattening them.
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Joins on `foreign_field` instead of `_id`.
    pub fn on_foreign_field(mut self, foreign_field: &str) -> Self {
        self.foreign_field = foreign_field.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_field(&self) -> &str {
        &self.local_field
    }

    pub fn foreign_collection(&self) -> &str {
        &self.foreign_collection
    }

    pub fn foreign_field(&self) -> &str {
        &self.foreign_field
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The join stage this embed compiles to.
    pub fn join_spec(&self) -> JoinSpec {
        JoinSpec {
            local_field: self.local_field.clone(),
            from_collection: self.foreign_collection.clone(),
            foreign_field: self.foreign_field.clone(),
            output_field: self.name.clone(),
            unwind: !self.is_array,
        }
    }
}

/// A join computed in process after the store returned the page.
#[derive(Clone)]
pub struct FunctionEmbed {
    name: String,
    local_field: String,
    resolver: Resolver,
}

impl FunctionEmbed {
    pub fn new<F>(name: &str, local_field: &str, resolver: F) -> Self
    where
        F: Fn(&Value) -> WeaveResult<Value> + Send + Sync + 'static,
    {
        FunctionEmbed {
            name: name.to_string(),
            local_field: local_field.to_string(),
            resolver: Arc::new(resolver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_field(&self) -> &str {
        &self.local_field
    }

    /// Replaces the local field of `document` with the resolved embed value.
    pub fn resolve(&self, document: &mut Document) -> WeaveResult<()> {
        let local = document.remove_path(&self.local_field).unwrap_or_default();
        let resolved = (self.resolver)(&local)?;
        document.put(self.name.clone(), resolved);
        Ok(())
    }
}

impl Debug for FunctionEmbed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionEmbed")
            .field("name", &self.name)
            .field("local_field", &self.local_field)
            .finish_non_exhaustive()
    }
}

/// A registered embed: exactly one of the two join kinds.
#[derive(Clone, Debug)]
pub enum EmbedDescriptor {
    ForeignKey(ForeignKeyEmbed),
    Function(FunctionEmbed),
}

impl EmbedDescriptor {
    pub fn name(&self) -> &str {
        match self {
            EmbedDescriptor::ForeignKey(embed) => embed.name(),
            EmbedDescriptor::Function(embed) => embed.name(),
        }
    }

    pub fn local_field(&self) -> &str {
        match self {
            EmbedDescriptor::ForeignKey(embed) => embed.local_field(),
            EmbedDescriptor::Function(embed) => embed.local_field(),
        }
    }
}

impl From<ForeignKeyEmbed> for EmbedDescriptor {
    fn from(embed: ForeignKeyEmbed) -> Self {
        EmbedDescriptor::ForeignKey(embed)
    }
}

impl From<FunctionEmbed> for EmbedDescriptor {
    fn from(embed: FunctionEmbed) -> Self {
        EmbedDescriptor::Function(embed)
    }
}
