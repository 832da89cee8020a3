//! Record stores for data-dense admin interfaces
//!
//! Typed records, flat and hierarchical stores with local or remote
//! sorting and filtering, and the data sources that feed them.

pub mod error;
pub mod events;
pub mod model;
pub mod query;
pub mod source;
pub mod store;

pub use error::Error;
pub use store::DataStore;
pub use store::TreeDataStore;
