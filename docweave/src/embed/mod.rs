//! Named cross-collection relationships ("embeds").
//!
//! Two kinds exist:
//!
//! - [ForeignKeyEmbed]: resolved by the store through equality between a
//!   local field and a field of a foreign collection (a left outer join).
//! - [FunctionEmbed]: resolved in process by calling a resolver with the
//!   local field's value once the store has returned the page.
//!
//! Descriptors are registered into an [EmbedRegistry] while the engine is
//! being built and are read-only afterwards.

mod descriptor;
mod registry;

pub use descriptor::*;
pub use registry::*;
