use std::error::Error as StdError;

/// Crate-wide result type for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed transport errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No live connection to the server.
    #[error("transport not connected")]
    NotConnected,

    /// The server refused the request; repeating it will not help.
    #[error("rejected by server: {message}")]
    Rejected { message: String },

    /// The server did not answer in time.
    #[error("transport request timed out")]
    Timeout,

    /// Pairing could not be completed.
    #[error("pairing failed: {message}")]
    Pairing { message: String },

    /// Wrapped source error from an external dependency.
    #[error("transport operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn rejected(message: impl std::fmt::Display) -> Self {
        Self::Rejected {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn pairing(message: impl std::fmt::Display) -> Self {
        Self::Pairing {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether a caller may reasonably repeat the failed request.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Rejected { .. } | Self::Pairing { .. })
    }
}
