use {
    async_trait::async_trait,
    bytes::Bytes,
    chrono::{DateTime, Utc},
    courier_identity::Address,
    courier_protocol::Message,
    serde::{Deserialize, Serialize},
};

use crate::error::Result;

/// Upload class; selects the server-side media bucket and key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an encrypted blob stored by the media server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub direct_path: String,
    pub media_key: Vec<u8>,
    pub file_enc_sha256: Vec<u8>,
    pub file_sha256: Vec<u8>,
    pub file_length: u64,
}

/// Server acknowledgement of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Session layer that uploads media and delivers assembled messages.
///
/// Implementations own the connection, encryption and retries at the wire
/// level. A single handle is shared across concurrent sends.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Encrypt and upload `data`, returning the reference to embed.
    async fn upload_media(&self, data: Bytes, kind: MediaType) -> Result<UploadedMedia>;

    /// Deliver `message` to `chat`.
    async fn send_message(&self, chat: &Address, message: Message) -> Result<SendResponse>;

    /// Address of the logged-in device, if paired.
    fn own_address(&self) -> Option<Address>;
}
