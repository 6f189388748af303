//! Outbound message model handed to the transport.
//!
//! A [`Message`] holds exactly one content slot. Field names serialize in the
//! camelCase form used by the messaging network's JSON encoding, so a
//! serialized message can be diffed directly against captured traffic.

mod message;

pub use message::{
    AudioMessage, ContextInfo, DocumentMessage, ExtendedTextMessage, ImageMessage, MediaFields,
    Message, MessageInfo, MessageKey, PollCreationMessage, PollOption, ProtocolMessage,
    ProtocolMessageType, ReactionMessage, ReceivedMessage, StickerMessage, VideoMessage,
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const STICKER_MIMETYPE: &str = "image/webp";
pub const GIF_MIMETYPE: &str = "video/mp4";
pub const DEFAULT_IMAGE_MIMETYPE: &str = "image/jpeg";
