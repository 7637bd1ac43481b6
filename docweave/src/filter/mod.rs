//! Query filters for selecting documents from collections.
//!
//! A [Filter] is a conjunction of field predicates. Field names may be dotted
//! paths; a dotted path whose first segment names a registered embed makes the
//! query run on the aggregation path, where the joined documents are matched
//! directly.
//!
//! # Examples
//!
//! ```rust,ignore
//! use docweave::filter::{all, field};
//!
//! let by_name = field("name").eq("Math");
//! let in_set = field("category_id").is_in(vec![1, 2, 3]);
//! let pattern = field("title").regex("^alg")?;
//! let joined = field("parent.name").eq("Math").and(field("level").lt(3));
//! let everything = all();
//! ```

mod filter;

pub use filter::*;
