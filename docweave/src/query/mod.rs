//! Normalized query descriptions.
//!
//! A [QueryModel] pairs a [Filter](crate::filter::Filter) with
//! [FindOptions](crate::collection::FindOptions). It is usually built from
//! the normalized query object produced by the request validator:
//!
//! ```rust,ignore
//! use docweave::doc;
//! use docweave::query::QueryModel;
//!
//! let query = QueryModel::from_normalized(&doc! {
//!     name: ["alg"],
//!     sort: ["-name"],
//!     exclude: ["secret"],
//!     limit: 20,
//!     embed: ["parent"],
//! })?;
//! let page = weave.find_with_query("categories", &query)?;
//! ```

mod query_model;

pub use query_model::*;
