//! Load error types

/// Errors that can occur while fetching rows from a data source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// The server answered with `success: false`.
    #[error("Load rejected by source: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// Optional message from the response.
        message: Option<String>,
    },

    /// A `beforeLoad` listener cancelled the load.
    #[error("Load cancelled by listener")]
    Cancelled,
}

impl LoadError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
