//! Pure message assembly: everything between a validated request and the
//! transport call that does not touch the network or the filesystem.

use {
    courier_identity::Address,
    courier_protocol::{
        AudioMessage, ContextInfo, DocumentMessage, ExtendedTextMessage, GIF_MIMETYPE,
        ImageMessage, MediaFields, Message, MessageKey, PollCreationMessage, PollOption,
        ProtocolMessage, ProtocolMessageType, ReactionMessage, ReceivedMessage, STICKER_MIMETYPE,
        StickerMessage, VideoMessage,
    },
    courier_transport::UploadedMedia,
};

use crate::{
    error::{Error, Result},
    request::{MediaKind, PlainContent},
};

/// Reply metadata embedded in the outbound message's context info.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuoteContext {
    pub stanza_id: String,
    /// Author of the quoted message, without device index.
    pub participant: Address,
    pub message: Message,
}

impl QuoteContext {
    pub(crate) fn resolve(original: ReceivedMessage) -> Result<Self> {
        let participant = courier_identity::resolve(&original.info.sender)?;
        Ok(Self {
            stanza_id: original.info.id,
            participant,
            message: original.message,
        })
    }
}

/// Copy quote fields into the message's context info.
///
/// Returns false for slots that cannot carry context (reactions and protocol
/// envelopes), leaving the message untouched.
pub(crate) fn thread_quote(message: &mut Message, quote: QuoteContext) -> bool {
    let Some(context) = message.context_info_mut() else {
        return false;
    };
    context.stanza_id = Some(quote.stanza_id);
    context.participant = Some(quote.participant.to_string());
    context.quoted_message = Some(Box::new(quote.message));
    true
}

fn extended_text(text: String, context_info: Option<ContextInfo>) -> Message {
    Message::ExtendedTextMessage(ExtendedTextMessage {
        text: Some(text),
        context_info,
    })
}

/// Build the message for a non-media content kind.
///
/// `chat` is the delivery chat, `own` the sending device (edits only).
/// `now_ms` stamps reactions.
pub(crate) fn build(
    content: PlainContent,
    chat: &Address,
    own: Option<&Address>,
    now_ms: i64,
) -> Result<Message> {
    let message = match content {
        PlainContent::Text(body) => Message::Conversation(body),
        PlainContent::Reply(body) => extended_text(body, None),
        PlainContent::Reaction { target, emoji } => Message::ReactionMessage(ReactionMessage {
            key: MessageKey {
                remote_jid: Some(target.chat),
                from_me: target.from_me,
                id: target.id,
                participant: None,
            },
            text: emoji,
            sender_timestamp_ms: now_ms,
        }),
        PlainContent::Edit {
            message_id,
            original,
            text,
        } => build_edit(message_id, &original, text, chat, own)?,
        PlainContent::Revoke {
            message_id,
            from_me,
        } => Message::ProtocolMessage(ProtocolMessage {
            key: MessageKey {
                remote_jid: Some(chat.to_string()),
                from_me,
                id: message_id,
                participant: None,
            },
            kind: ProtocolMessageType::Revoke,
            edited_message: None,
            ephemeral_expiration: None,
            ephemeral_setting_timestamp: None,
            timestamp_ms: None,
        }),
        PlainContent::Mention { text, mentions } => {
            let mentioned_jid = mentions
                .iter()
                .map(|raw| courier_identity::resolve(raw).map(|a| a.to_string()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            extended_text(
                text,
                Some(ContextInfo {
                    mentioned_jid,
                    ..Default::default()
                }),
            )
        },
        PlainContent::PhoneReference { phone, text } => {
            let number = courier_identity::from_phone_number(&phone)?;
            extended_text(
                text,
                Some(ContextInfo {
                    participant: Some(number.to_string()),
                    ..Default::default()
                }),
            )
        },
        PlainContent::Poll {
            question,
            options,
            single_answer,
        } => Message::PollCreationMessage(PollCreationMessage {
            name: question,
            options: options
                .into_iter()
                .map(|option_name| PollOption { option_name })
                .collect(),
            selectable_options_count: u32::from(single_answer),
            context_info: None,
        }),
    };
    Ok(message)
}

fn build_edit(
    message_id: String,
    original: &Message,
    text: String,
    chat: &Address,
    own: Option<&Address>,
) -> Result<Message> {
    let edited = match original {
        Message::Conversation(_) => Message::Conversation(text),
        Message::ExtendedTextMessage(m) if m.text.is_some() => extended_text(text, None),
        Message::ImageMessage(m) if m.caption.is_some() => Message::ImageMessage(ImageMessage {
            caption: Some(text),
            ..Default::default()
        }),
        Message::VideoMessage(m) if m.caption.is_some() => Message::VideoMessage(VideoMessage {
            caption: Some(text),
            ..Default::default()
        }),
        other => {
            return Err(Error::UnsupportedEditTarget {
                slot: other.slot_name(),
            });
        },
    };

    Ok(Message::ProtocolMessage(ProtocolMessage {
        key: MessageKey {
            remote_jid: Some(chat.to_non_device().to_string()),
            from_me: true,
            id: message_id,
            participant: own.map(|a| a.to_non_device().to_string()),
        },
        kind: ProtocolMessageType::MessageEdit,
        edited_message: Some(Box::new(edited)),
        ephemeral_expiration: Some(0),
        ephemeral_setting_timestamp: Some(0),
        timestamp_ms: Some(0),
    }))
}

/// Build the slot for an uploaded media file.
///
/// `mime` is the sniffed type; stickers and gifs override it.
pub(crate) fn media_message(
    kind: MediaKind,
    uploaded: UploadedMedia,
    mime: &str,
    caption: String,
) -> Message {
    let mimetype = match kind {
        MediaKind::Sticker => STICKER_MIMETYPE,
        MediaKind::Gif => GIF_MIMETYPE,
        _ => mime,
    };
    let media = MediaFields {
        url: uploaded.url,
        direct_path: uploaded.direct_path,
        media_key: uploaded.media_key,
        file_enc_sha256: uploaded.file_enc_sha256,
        file_sha256: uploaded.file_sha256,
        file_length: uploaded.file_length,
        mimetype: mimetype.to_string(),
    };
    let caption = (!caption.is_empty()).then_some(caption);

    match kind {
        MediaKind::Image => Message::ImageMessage(ImageMessage {
            media,
            caption,
            ..Default::default()
        }),
        MediaKind::Video | MediaKind::Gif => Message::VideoMessage(VideoMessage {
            media,
            caption,
            gif_playback: kind == MediaKind::Gif,
            ..Default::default()
        }),
        MediaKind::Audio { ptt } => Message::AudioMessage(AudioMessage {
            media,
            ptt,
            context_info: None,
        }),
        MediaKind::Document { file_name } => Message::DocumentMessage(DocumentMessage {
            media,
            file_name,
            caption,
            context_info: None,
        }),
        MediaKind::Sticker => Message::StickerMessage(StickerMessage {
            media,
            context_info: None,
        }),
    }
}
