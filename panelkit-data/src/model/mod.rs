//! Data model types

mod field;
mod record;
mod tree_record;
mod value;

pub use field::*;
pub use record::*;
pub use tree_record::*;
pub use value::*;
