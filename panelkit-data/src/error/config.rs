//! Configuration error types

/// Errors raised while reading host-supplied configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration was not valid JSON for the target type.
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
