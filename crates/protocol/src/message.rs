use serde::{Deserialize, Serialize};

// ── Keys and context ─────────────────────────────────────────────────────────

/// Identifies a previously sent message (reactions, edits, revokes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    #[serde(rename = "remoteJID", skip_serializing_if = "Option::is_none")]
    pub remote_jid: Option<String>,
    pub from_me: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
}

/// Reply and mention metadata attached to a content slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    #[serde(rename = "stanzaID", skip_serializing_if = "Option::is_none")]
    pub stanza_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_message: Option<Box<Message>>,
    #[serde(rename = "mentionedJID", default, skip_serializing_if = "Vec::is_empty")]
    pub mentioned_jid: Vec<String>,
}

// ── Content slots ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTextMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

/// Upload reference shared by every media slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFields {
    #[serde(rename = "URL")]
    pub url: String,
    pub direct_path: String,
    pub media_key: Vec<u8>,
    #[serde(rename = "fileEncSHA256")]
    pub file_enc_sha256: Vec<u8>,
    #[serde(rename = "fileSHA256")]
    pub file_sha256: Vec<u8>,
    pub file_length: u64,
    pub mimetype: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMessage {
    #[serde(flatten)]
    pub media: MediaFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(rename = "JPEGThumbnail", skip_serializing_if = "Option::is_none")]
    pub jpeg_thumbnail: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMessage {
    #[serde(flatten)]
    pub media: MediaFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Render as a looping, muted clip.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub gif_playback: bool,
    #[serde(rename = "JPEGThumbnail", skip_serializing_if = "Option::is_none")]
    pub jpeg_thumbnail: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMessage {
    #[serde(flatten)]
    pub media: MediaFields,
    /// Push-to-talk: render as a voice note.
    #[serde(rename = "PTT")]
    pub ptt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMessage {
    #[serde(flatten)]
    pub media: MediaFields,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerMessage {
    #[serde(flatten)]
    pub media: MediaFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionMessage {
    pub key: MessageKey,
    pub text: String,
    #[serde(rename = "senderTimestampMS")]
    pub sender_timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolMessageType {
    Revoke,
    MessageEdit,
}

/// Control envelope for edits and revokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMessage {
    pub key: MessageKey,
    #[serde(rename = "type")]
    pub kind: ProtocolMessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_expiration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_setting_timestamp: Option<i64>,
    #[serde(rename = "timestampMS", skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub option_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCreationMessage {
    pub name: String,
    pub options: Vec<PollOption>,
    /// Maximum number of options a voter may pick; 0 means unlimited.
    pub selectable_options_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_info: Option<ContextInfo>,
}

// ── Message ──────────────────────────────────────────────────────────────────

/// A complete message. Each variant is one content slot, so two slots can
/// never be populated at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Message {
    Conversation(String),
    ExtendedTextMessage(ExtendedTextMessage),
    ImageMessage(ImageMessage),
    VideoMessage(VideoMessage),
    AudioMessage(AudioMessage),
    DocumentMessage(DocumentMessage),
    StickerMessage(StickerMessage),
    ReactionMessage(ReactionMessage),
    ProtocolMessage(ProtocolMessage),
    PollCreationMessage(PollCreationMessage),
}

impl Message {
    /// Short slot name for logs and metrics labels.
    pub fn slot_name(&self) -> &'static str {
        match self {
            Self::Conversation(_) => "conversation",
            Self::ExtendedTextMessage(_) => "extended_text",
            Self::ImageMessage(_) => "image",
            Self::VideoMessage(_) => "video",
            Self::AudioMessage(_) => "audio",
            Self::DocumentMessage(_) => "document",
            Self::StickerMessage(_) => "sticker",
            Self::ReactionMessage(_) => "reaction",
            Self::ProtocolMessage(_) => "protocol",
            Self::PollCreationMessage(_) => "poll",
        }
    }

    /// Context info of slots that can carry one.
    pub fn context_info(&self) -> Option<&ContextInfo> {
        match self {
            Self::ExtendedTextMessage(m) => m.context_info.as_ref(),
            Self::ImageMessage(m) => m.context_info.as_ref(),
            Self::VideoMessage(m) => m.context_info.as_ref(),
            Self::AudioMessage(m) => m.context_info.as_ref(),
            Self::DocumentMessage(m) => m.context_info.as_ref(),
            Self::StickerMessage(m) => m.context_info.as_ref(),
            Self::PollCreationMessage(m) => m.context_info.as_ref(),
            Self::Conversation(_) | Self::ReactionMessage(_) | Self::ProtocolMessage(_) => None,
        }
    }

    /// Mutable handle on the context info, creating an empty one if needed.
    ///
    /// A plain conversation is promoted to an extended text message first,
    /// since only the latter can carry context. Returns `None` for reactions
    /// and protocol envelopes.
    pub fn context_info_mut(&mut self) -> Option<&mut ContextInfo> {
        if let Self::Conversation(text) = self {
            *self = Self::ExtendedTextMessage(ExtendedTextMessage {
                text: Some(std::mem::take(text)),
                context_info: None,
            });
        }
        let slot = match self {
            Self::ExtendedTextMessage(m) => &mut m.context_info,
            Self::ImageMessage(m) => &mut m.context_info,
            Self::VideoMessage(m) => &mut m.context_info,
            Self::AudioMessage(m) => &mut m.context_info,
            Self::DocumentMessage(m) => &mut m.context_info,
            Self::StickerMessage(m) => &mut m.context_info,
            Self::PollCreationMessage(m) => &mut m.context_info,
            Self::Conversation(_) | Self::ReactionMessage(_) | Self::ProtocolMessage(_) => {
                return None;
            },
        };
        Some(slot.get_or_insert_with(ContextInfo::default))
    }

    /// Attach a JPEG preview to slots that display one.
    pub fn set_thumbnail(&mut self, jpeg: Vec<u8>) -> bool {
        match self {
            Self::ImageMessage(m) => m.jpeg_thumbnail = Some(jpeg),
            Self::VideoMessage(m) => m.jpeg_thumbnail = Some(jpeg),
            _ => return false,
        }
        true
    }
}

// ── Received messages ────────────────────────────────────────────────────────

/// Routing metadata of a message received from the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub id: String,
    /// Conversation the message belongs to.
    pub chat: String,
    /// Individual author, possibly carrying a device suffix.
    pub sender: String,
    pub from_me: bool,
}

/// A received message together with its routing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub info: MessageInfo,
    pub message: Message,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_serializes_as_bare_string() {
        let json = serde_json::to_value(Message::Conversation("hello".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "conversation": "hello" }));
    }

    #[test]
    fn media_fields_flatten_into_slot() {
        let msg = Message::ImageMessage(ImageMessage {
            media: MediaFields {
                url: "https://mmg.example/x".into(),
                mimetype: "image/png".into(),
                file_length: 42,
                ..Default::default()
            },
            caption: Some("hi".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&msg).unwrap();
        let image = &json["imageMessage"];
        assert_eq!(image["URL"], "https://mmg.example/x");
        assert_eq!(image["mimetype"], "image/png");
        assert_eq!(image["fileLength"], 42);
        assert_eq!(image["caption"], "hi");
        assert!(image.get("JPEGThumbnail").is_none());
        assert!(image.get("contextInfo").is_none());
    }

    #[test]
    fn context_info_mut_promotes_conversation() {
        let mut msg = Message::Conversation("quoted reply".into());
        msg.context_info_mut().unwrap().stanza_id = Some("ABC".into());
        let Message::ExtendedTextMessage(ext) = &msg else {
            panic!("expected extended text, got {}", msg.slot_name());
        };
        assert_eq!(ext.text.as_deref(), Some("quoted reply"));
        assert_eq!(msg.context_info().unwrap().stanza_id.as_deref(), Some("ABC"));
    }

    #[test]
    fn reactions_carry_no_context() {
        let mut msg = Message::ReactionMessage(ReactionMessage {
            key: MessageKey::default(),
            text: "👍".into(),
            sender_timestamp_ms: 1,
        });
        assert!(msg.context_info_mut().is_none());
        assert!(!msg.set_thumbnail(vec![1, 2, 3]));
    }

    #[test]
    fn protocol_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ProtocolMessageType::MessageEdit).unwrap(),
            "MESSAGE_EDIT"
        );
        assert_eq!(
            serde_json::to_value(ProtocolMessageType::Revoke).unwrap(),
            "REVOKE"
        );
    }

    #[test]
    fn unset_remote_jid_is_omitted() {
        let key = MessageKey {
            remote_jid: None,
            from_me: true,
            id: "X".into(),
            participant: None,
        };
        let json = serde_json::to_value(&key).unwrap();
        assert!(json.get("remoteJID").is_none());
        assert_eq!(json["fromMe"], true);
    }

    #[test]
    fn received_message_roundtrip() {
        let received = ReceivedMessage {
            info: MessageInfo {
                id: "ABC123".into(),
                chat: "123@g.us".into(),
                sender: "555:2@s.whatsapp.net".into(),
                from_me: false,
            },
            message: Message::Conversation("ping".into()),
        };
        let json = serde_json::to_string(&received).unwrap();
        let back: ReceivedMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, received);
    }
}
