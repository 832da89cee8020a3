//! Data sources feeding stores.
//!
//! A [`DataSource`] turns [`LoadParams`] into a [`LoadResult`]. Stores call
//! it for every `load()`/`reload()`; the source never sees store state.

mod array;
mod page;
mod params;
mod remote;

use async_trait::async_trait;

pub use array::*;
pub use page::*;
pub use params::*;
pub use remote::*;

use crate::error::LoadError;

/// Supplies rows to a store.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches one batch of rows.
    async fn fetch(&self, params: &LoadParams) -> Result<LoadResult, LoadError>;
}
