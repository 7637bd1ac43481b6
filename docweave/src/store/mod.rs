//! Storage backends.
//!
//! The engine talks to storage only through the [DocumentStoreProvider]
//! trait, wrapped in the cloneable [DocumentStore] handle. Providers execute
//! plain finds, counts, pipelines, single-document mutations and the
//! per-collection id sequences.
//!
//! [InMemoryStore] keeps every collection in memory and evaluates all stage
//! kinds in process.

mod document_store;
mod memory;

pub use document_store::*;
pub use memory::*;
