//! Common types shared by every docweave module.

mod constants;
mod fields;
mod projection;
mod sort_order;
mod value;

pub use constants::*;
pub use fields::*;
pub use projection::*;
pub use sort_order::*;
pub use value::*;
