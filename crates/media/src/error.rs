use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported media type: {mime}")]
    UnsupportedMediaType { mime: String },

    #[error("failed to decode {mime}: {message}")]
    DecodeFailure { mime: String, message: String },

    #[error("failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    #[error("frame extraction failed: {message}")]
    FrameExtraction { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("thumbnail worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl Error {
    #[must_use]
    pub fn unsupported(mime: impl Into<String>) -> Self {
        Self::UnsupportedMediaType { mime: mime.into() }
    }

    #[must_use]
    pub fn decode(mime: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::DecodeFailure {
            mime: mime.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn frame_extraction(message: impl Into<String>) -> Self {
        Self::FrameExtraction {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
