//! Documents and the per-collection primitives built on them.
//!
//! A `Document` is an insertion-ordered map from field names to [Value]s.
//! Nested fields are addressed with dotted paths.
//!
//! ```rust,ignore
//! use docweave::doc;
//!
//! let mut category = doc! { name: "Algebra", parent_id: 1 };
//! category.put_path("meta.level", 2);
//! assert_eq!(category.get_path("meta.level"), Some(&Value::I64(2)));
//! ```
//!
//! Every document stored in a collection carries a unique integer `_id`,
//! assigned on insert by the [IdAllocator].
//!
//! [Value]: crate::common::Value

mod document;
mod find_options;
mod id_allocator;

pub use document::*;
pub use find_options::*;
pub use id_allocator::*;
