//! Pipeline synthesis and execution.
//!
//! A [Pipeline] is an ordered list of [Stage]s executed by the store. The
//! [PipelineBuilder] compiles a query against the embed registry into a
//! [QueryPlan]: either a plain native find, or an aggregation pipeline with
//! join, flatten and shaping stages. The [QueryExecutor] runs a plan, derives
//! the pagination independent total and applies computed embeds to the page.

mod builder;
mod executor;
mod stage;

pub use builder::*;
pub use executor::*;
pub use stage::*;
