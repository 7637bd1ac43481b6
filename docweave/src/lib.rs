//! # docweave - declarative document queries with embeds
//!
//! docweave turns a normalized query description (filter, projection, sort,
//! pagination and requested embeds) into a multi-stage pipeline executed by a
//! document store. It resolves two kinds of cross-collection relationships,
//! derives pagination totals and allocates sequential integer primary keys.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docweave::collection::FindOptions;
//! use docweave::doc;
//! use docweave::embed::ForeignKeyEmbed;
//! use docweave::filter::field;
//! use docweave::weave::Weave;
//!
//! let weave = Weave::builder()
//!     .register_embed(ForeignKeyEmbed::new("parent", "parent_id", "categories"))
//!     .open()?;
//!
//! weave.insert("categories", doc! { name: "Math", parent_id: 0 })?;
//! weave.insert("categories", doc! { name: "Algebra", parent_id: 1 })?;
//!
//! // joins `parent` to filter on it, then hides it again
//! let page = weave.find("categories", &field("parent.name").eq("Math"), &FindOptions::new())?;
//! assert_eq!(page.ids(), vec![2]);
//! assert_eq!(page.total_count(), 1);
//! ```
//!
//! ## Embeds
//!
//! - A [ForeignKeyEmbed](embed::ForeignKeyEmbed) is joined by the store
//!   (left outer join, flattened to a single document unless it is an array
//!   embed).
//! - A [FunctionEmbed](embed::FunctionEmbed) is computed in process from the
//!   local field once the page has been fetched.
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, find options and results, id allocation
//! - [`common`] - Values, projections, sort keys and constants
//! - [`embed`] - Embed descriptors and the registry
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Field predicates
//! - [`pipeline`] - Pipeline stages, the builder and the executor
//! - [`query`] - Normalized query mapping
//! - [`store`] - Storage backend abstraction and the in-memory store
//! - [`weave`] - The engine
//! - [`weave_builder`] - Engine builder
//! - [`weave_config`] - Engine configuration
//! - [`cleaner`] - Periodic deletion of expired documents

pub mod cleaner;
pub mod collection;
pub mod common;
pub mod embed;
pub mod errors;
pub mod filter;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod weave;
pub mod weave_builder;
pub mod weave_config;

pub use weave::Weave;
