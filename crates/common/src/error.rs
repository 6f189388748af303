use tracing_subscriber::util::TryInitError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

pub type Result<T> = std::result::Result<T, Error>;
