mod evaluator;
mod store;

pub(crate) use evaluator::*;
pub use store::*;
