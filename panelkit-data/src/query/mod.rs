//! Sorting and filtering for stores.
//!
//! Both the local materialization pipeline and the remote load parameters
//! use these types.

mod filter;
pub mod keycode;
mod sort;

pub use filter::*;
pub use sort::*;
