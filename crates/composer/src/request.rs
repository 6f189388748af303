//! Send intents accepted by the [`Composer`](crate::Composer).

use std::path::PathBuf;

use courier_protocol::{Message, MessageInfo, ReceivedMessage};

/// What to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    /// Text quoting the request's quote source; fails without one.
    Reply(String),
    Reaction {
        target: MessageInfo,
        emoji: String,
    },
    /// Replace the text of a message this account sent earlier.
    Edit {
        message_id: String,
        /// The message as originally sent; selects the slot to rewrite.
        original: Message,
        text: String,
    },
    Revoke {
        message_id: String,
        from_me: bool,
    },
    Image {
        path: PathBuf,
        caption: String,
    },
    Video {
        path: PathBuf,
        caption: String,
    },
    Audio {
        path: PathBuf,
        /// Render as a voice note.
        ptt: bool,
    },
    Document {
        path: PathBuf,
        file_name: String,
        caption: String,
    },
    Sticker {
        path: PathBuf,
    },
    /// Short looping clip, uploaded as video.
    Gif {
        path: PathBuf,
        caption: String,
    },
    Mention {
        text: String,
        mentions: Vec<String>,
    },
    /// Text whose context points at a phone number.
    PhoneReference {
        phone: String,
        text: String,
    },
    Poll {
        question: String,
        options: Vec<String>,
        single_answer: bool,
    },
}

impl Content {
    /// Label used in logs, errors and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Reply(_) => "reply",
            Self::Reaction { .. } => "reaction",
            Self::Edit { .. } => "edit",
            Self::Revoke { .. } => "revoke",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Audio { .. } => "audio",
            Self::Document { .. } => "document",
            Self::Sticker { .. } => "sticker",
            Self::Gif { .. } => "gif",
            Self::Mention { .. } => "mention",
            Self::PhoneReference { .. } => "phone_reference",
            Self::Poll { .. } => "poll",
        }
    }

    /// Split into the media kinds, which go through upload, and everything
    /// assembled directly.
    pub(crate) fn split(self) -> Result<MediaFile, PlainContent> {
        let (path, kind, caption) = match self {
            Self::Image { path, caption } => (path, MediaKind::Image, caption),
            Self::Video { path, caption } => (path, MediaKind::Video, caption),
            Self::Gif { path, caption } => (path, MediaKind::Gif, caption),
            Self::Audio { path, ptt } => (path, MediaKind::Audio { ptt }, String::new()),
            Self::Document {
                path,
                file_name,
                caption,
            } => (path, MediaKind::Document { file_name }, caption),
            Self::Sticker { path } => (path, MediaKind::Sticker, String::new()),
            Self::Text(body) => return Err(PlainContent::Text(body)),
            Self::Reply(body) => return Err(PlainContent::Reply(body)),
            Self::Reaction { target, emoji } => {
                return Err(PlainContent::Reaction { target, emoji });
            },
            Self::Edit {
                message_id,
                original,
                text,
            } => {
                return Err(PlainContent::Edit {
                    message_id,
                    original,
                    text,
                });
            },
            Self::Revoke {
                message_id,
                from_me,
            } => {
                return Err(PlainContent::Revoke {
                    message_id,
                    from_me,
                });
            },
            Self::Mention { text, mentions } => {
                return Err(PlainContent::Mention { text, mentions });
            },
            Self::PhoneReference { phone, text } => {
                return Err(PlainContent::PhoneReference { phone, text });
            },
            Self::Poll {
                question,
                options,
                single_answer,
            } => {
                return Err(PlainContent::Poll {
                    question,
                    options,
                    single_answer,
                });
            },
        };
        Ok(MediaFile {
            path,
            kind,
            caption,
        })
    }
}

/// Content kinds assembled without an upload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlainContent {
    Text(String),
    Reply(String),
    Reaction {
        target: MessageInfo,
        emoji: String,
    },
    Edit {
        message_id: String,
        original: Message,
        text: String,
    },
    Revoke {
        message_id: String,
        from_me: bool,
    },
    Mention {
        text: String,
        mentions: Vec<String>,
    },
    PhoneReference {
        phone: String,
        text: String,
    },
    Poll {
        question: String,
        options: Vec<String>,
        single_answer: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MediaKind {
    Image,
    Video,
    Gif,
    Audio { ptt: bool },
    Document { file_name: String },
    Sticker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub caption: String,
}

/// A single send: destination, optional message to quote, and content.
///
/// When a quote source is attached the message is delivered to the quoted
/// message's chat, whatever `chat` says.
#[derive(Debug, Clone, PartialEq)]
pub struct SendRequest {
    pub chat: String,
    pub quote: Option<ReceivedMessage>,
    pub content: Content,
}

impl SendRequest {
    pub fn new(chat: impl Into<String>, content: Content) -> Self {
        Self {
            chat: chat.into(),
            quote: None,
            content,
        }
    }

    /// Thread this send under `original`.
    #[must_use]
    pub fn quoting(mut self, original: ReceivedMessage) -> Self {
        self.chat.clone_from(&original.info.chat);
        self.quote = Some(original);
        self
    }

    pub fn text(chat: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(chat, Content::Text(body.into()))
    }

    pub fn reply(original: ReceivedMessage, body: impl Into<String>) -> Self {
        Self::new(String::new(), Content::Reply(body.into())).quoting(original)
    }

    pub fn reaction(target: MessageInfo, emoji: impl Into<String>) -> Self {
        Self::new(target.chat.clone(), Content::Reaction {
            target,
            emoji: emoji.into(),
        })
    }

    pub fn edit(
        chat: impl Into<String>,
        message_id: impl Into<String>,
        original: Message,
        text: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::Edit {
            message_id: message_id.into(),
            original,
            text: text.into(),
        })
    }

    pub fn revoke(chat: impl Into<String>, message_id: impl Into<String>, from_me: bool) -> Self {
        Self::new(chat, Content::Revoke {
            message_id: message_id.into(),
            from_me,
        })
    }

    pub fn image(
        chat: impl Into<String>,
        path: impl Into<PathBuf>,
        caption: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::Image {
            path: path.into(),
            caption: caption.into(),
        })
    }

    pub fn video(
        chat: impl Into<String>,
        path: impl Into<PathBuf>,
        caption: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::Video {
            path: path.into(),
            caption: caption.into(),
        })
    }

    pub fn audio(chat: impl Into<String>, path: impl Into<PathBuf>, ptt: bool) -> Self {
        Self::new(chat, Content::Audio {
            path: path.into(),
            ptt,
        })
    }

    pub fn document(
        chat: impl Into<String>,
        path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::Document {
            path: path.into(),
            file_name: file_name.into(),
            caption: caption.into(),
        })
    }

    pub fn sticker(chat: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(chat, Content::Sticker { path: path.into() })
    }

    pub fn gif(
        chat: impl Into<String>,
        path: impl Into<PathBuf>,
        caption: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::Gif {
            path: path.into(),
            caption: caption.into(),
        })
    }

    pub fn mention<I, S>(chat: impl Into<String>, text: impl Into<String>, mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(chat, Content::Mention {
            text: text.into(),
            mentions: mentions.into_iter().map(Into::into).collect(),
        })
    }

    pub fn phone_reference(
        chat: impl Into<String>,
        phone: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(chat, Content::PhoneReference {
            phone: phone.into(),
            text: text.into(),
        })
    }

    pub fn poll<I, S>(
        chat: impl Into<String>,
        question: impl Into<String>,
        options: I,
        single_answer: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(chat, Content::Poll {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            single_answer,
        })
    }

    /// Chat the message is delivered to.
    pub fn delivery_chat(&self) -> &str {
        self.quote
            .as_ref()
            .map_or(self.chat.as_str(), |q| q.info.chat.as_str())
    }
}
