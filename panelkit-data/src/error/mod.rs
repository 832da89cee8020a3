//! Error types

mod config;
mod field;
mod load;

pub use config::*;
pub use field::*;
pub use load::*;

/// Top-level error for the data layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Typed field access failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// A load from a data source failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Configuration could not be parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
