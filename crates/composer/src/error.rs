use std::{fmt, path::PathBuf, time::Duration};

/// Pipeline step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    Upload,
    Thumbnail,
    Send,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Upload => "upload",
            Self::Thumbnail => "thumbnail",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failures of a compose-and-send call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A chat, quote participant, mention or phone number did not parse.
    #[error(transparent)]
    InvalidAddress(#[from] courier_identity::Error),

    #[error("cannot read {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("media upload failed: {0}")]
    UploadFailure(#[source] courier_transport::Error),

    #[error("send failed: {0}")]
    SendFailure(#[source] courier_transport::Error),

    /// The edited message has no text-bearing slot.
    #[error("cannot edit a {slot} message")]
    UnsupportedEditTarget { slot: &'static str },

    #[error("{kind} requires a message to quote")]
    MissingQuoteContext { kind: &'static str },

    /// The send timeout elapsed; in-flight work was dropped.
    #[error("send cancelled during {stage} after {timeout:?}")]
    Cancelled { stage: Stage, timeout: Duration },
}

impl Error {
    #[must_use]
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidAddress(_)
            | Self::UnreadableFile { .. }
            | Self::UnsupportedEditTarget { .. }
            | Self::MissingQuoteContext { .. } => Stage::Validate,
            Self::UploadFailure(_) => Stage::Upload,
            Self::SendFailure(_) => Stage::Send,
            Self::Cancelled { stage, .. } => *stage,
        }
    }

    /// Whether repeating the same request could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UploadFailure(e) | Self::SendFailure(e) => e.is_transient(),
            Self::Cancelled { .. } => true,
            Self::InvalidAddress(_)
            | Self::UnreadableFile { .. }
            | Self::UnsupportedEditTarget { .. }
            | Self::MissingQuoteContext { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
