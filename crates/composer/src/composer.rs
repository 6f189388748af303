//! The compose-and-send pipeline.
//!
//! `Validate → [quote] → [upload → thumbnail] → assemble → send`. Each call
//! is independent; the composer itself holds no mutable state and can be
//! shared across tasks.

use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

#[cfg(feature = "metrics")]
use metrics::{counter, histogram};
use {
    bytes::Bytes,
    courier_config::CourierConfig,
    courier_media::{ThumbnailGenerator, mime},
    courier_protocol::{DEFAULT_IMAGE_MIMETYPE, Message},
    courier_transport::{Error as TransportError, MediaType, SendResponse, Transport},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use crate::definitions::{self, labels};
use crate::{
    assemble::{self, QuoteContext},
    error::{Error, Result, Stage},
    request::{Content, MediaFile, MediaKind, PlainContent, SendRequest},
};

/// Last stage entered, so a timeout can report where it hit.
#[derive(Default)]
struct Progress(AtomicU8);

impl Progress {
    fn enter(&self, stage: Stage) {
        let raw = match stage {
            Stage::Validate => 0,
            Stage::Upload => 1,
            Stage::Thumbnail => 2,
            Stage::Send => 3,
        };
        self.0.store(raw, Ordering::Relaxed);
    }

    fn current(&self) -> Stage {
        match self.0.load(Ordering::Relaxed) {
            1 => Stage::Upload,
            2 => Stage::Thumbnail,
            3 => Stage::Send,
            _ => Stage::Validate,
        }
    }
}

impl MediaKind {
    fn media_type(&self) -> MediaType {
        match self {
            Self::Image | Self::Sticker => MediaType::Image,
            Self::Video | Self::Gif => MediaType::Video,
            Self::Audio { .. } => MediaType::Audio,
            Self::Document { .. } => MediaType::Document,
        }
    }

    fn wants_thumbnail(&self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Gif)
    }
}

/// Turns [`SendRequest`]s into protocol messages and hands them to a
/// [`Transport`].
#[derive(Clone)]
pub struct Composer {
    transport: Arc<dyn Transport>,
    thumbnails: ThumbnailGenerator,
    send_timeout: Option<Duration>,
}

impl Composer {
    pub fn new(transport: Arc<dyn Transport>, thumbnails: ThumbnailGenerator) -> Self {
        Self {
            transport,
            thumbnails,
            send_timeout: None,
        }
    }

    /// Composer with an ffmpeg-backed thumbnailer and the configured timeout.
    pub fn from_config(transport: Arc<dyn Transport>, config: &CourierConfig) -> Self {
        let thumbnails = ThumbnailGenerator::with_ffmpeg(config.thumbnail.clone(), &config.ffmpeg);
        Self::new(transport, thumbnails)
            .with_send_timeout(config.send.timeout_secs.map(Duration::from_secs))
    }

    /// Bound every call; an elapsed timeout yields [`Error::Cancelled`].
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Validate, assemble and deliver one request.
    ///
    /// Exactly one `send_message` call is made on success and at most one
    /// upload for media kinds. Nothing is retried.
    pub async fn compose_and_send(&self, request: SendRequest) -> Result<SendResponse> {
        let kind = request.content.kind();
        let progress = Progress::default();
        #[cfg(feature = "metrics")]
        let start = std::time::Instant::now();

        let result = match self.send_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.run(request, &progress))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Cancelled {
                        stage: progress.current(),
                        timeout,
                    })
                }),
            None => self.run(request, &progress).await,
        };

        #[cfg(feature = "metrics")]
        histogram!(definitions::SEND_DURATION_SECONDS, labels::KIND => kind)
            .record(start.elapsed().as_secs_f64());

        match &result {
            Ok(response) => {
                info!(kind, id = %response.id, "message delivered");
                #[cfg(feature = "metrics")]
                counter!(definitions::MESSAGES_SENT_TOTAL, labels::KIND => kind).increment(1);
            },
            Err(e) => {
                warn!(
                    kind,
                    stage = %e.stage(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "send failed"
                );
                #[cfg(feature = "metrics")]
                counter!(
                    definitions::SEND_FAILURES_TOTAL,
                    labels::KIND => kind,
                    labels::STAGE => e.stage().as_str()
                )
                .increment(1);
            },
        }
        result
    }

    async fn run(&self, request: SendRequest, progress: &Progress) -> Result<SendResponse> {
        progress.enter(Stage::Validate);
        let kind = request.content.kind();
        let chat = courier_identity::parse(request.delivery_chat())?;
        let SendRequest { quote, content, .. } = request;

        let quote = quote.map(QuoteContext::resolve).transpose()?;
        if matches!(content, Content::Reply(_)) && quote.is_none() {
            return Err(Error::MissingQuoteContext { kind });
        }
        debug!(kind, %chat, quoted = quote.is_some(), "validated request");

        let mut message = match content.split() {
            Ok(media) => self.media_message(media, progress).await?,
            Err(content) => {
                let own = match &content {
                    PlainContent::Edit { .. } => Some(
                        self.transport
                            .own_address()
                            .ok_or(Error::SendFailure(TransportError::NotConnected))?,
                    ),
                    _ => None,
                };
                let now_ms = chrono::Utc::now().timestamp_millis();
                assemble::build(content, &chat, own.as_ref(), now_ms)?
            },
        };

        if let Some(quote) = quote
            && !assemble::thread_quote(&mut message, quote)
        {
            debug!(kind, slot = message.slot_name(), "slot cannot carry a quote, ignoring it");
        }

        progress.enter(Stage::Send);
        debug!(kind, %chat, slot = message.slot_name(), "sending message");
        self.transport
            .send_message(&chat, message)
            .await
            .map_err(Error::SendFailure)
    }

    async fn media_message(&self, media: MediaFile, progress: &Progress) -> Result<Message> {
        let MediaFile {
            path,
            kind,
            caption,
        } = media;

        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::unreadable(&path, e))?;
        let mime = sniff_for(&kind, &data);

        progress.enter(Stage::Upload);
        let media_type = kind.media_type();
        debug!(
            path = %path.display(),
            mime,
            %media_type,
            bytes = data.len(),
            "uploading media"
        );
        #[cfg(feature = "metrics")]
        counter!(definitions::UPLOAD_BYTES_TOTAL, labels::KIND => media_type.as_str())
            .increment(data.len() as u64);
        let uploaded = self
            .transport
            .upload_media(Bytes::from(data), media_type)
            .await
            .map_err(Error::UploadFailure)?;

        let thumbnail = if kind.wants_thumbnail() {
            progress.enter(Stage::Thumbnail);
            self.thumbnail(&path).await
        } else {
            None
        };

        let mut message = assemble::media_message(kind, uploaded, mime, caption);
        if let Some(jpeg) = thumbnail {
            message.set_thumbnail(jpeg);
        }
        Ok(message)
    }

    /// Best effort: any failure is logged and the message goes out without a
    /// preview.
    async fn thumbnail(&self, path: &Path) -> Option<Vec<u8>> {
        if !self.thumbnails.config().enabled {
            return None;
        }
        match self.thumbnails.generate(path).await {
            Ok(jpeg) => Some(jpeg),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "thumbnail failed, sending without");
                #[cfg(feature = "metrics")]
                counter!(definitions::THUMBNAIL_FAILURES_TOTAL).increment(1);
                None
            },
        }
    }
}

/// Content type from magic bytes. Image sends fall back to JPEG when the
/// bytes are not a recognised image.
fn sniff_for(kind: &MediaKind, data: &[u8]) -> &'static str {
    let sniffed = mime::sniff(data);
    match kind {
        MediaKind::Image if !sniffed.starts_with("image/") => DEFAULT_IMAGE_MIMETYPE,
        _ => sniffed,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(Stage::Validate)]
    #[case(Stage::Upload)]
    #[case(Stage::Thumbnail)]
    #[case(Stage::Send)]
    fn progress_tracks_stage(#[case] stage: Stage) {
        let progress = Progress::default();
        assert_eq!(progress.current(), Stage::Validate);
        progress.enter(stage);
        assert_eq!(progress.current(), stage);
    }

    #[rstest]
    #[case(MediaKind::Image, b"not an image at all".as_slice(), "image/jpeg")]
    #[case(MediaKind::Image, b"\x89PNG\r\n\x1a\n\x00\x00".as_slice(), "image/png")]
    #[case(MediaKind::Document { file_name: "a.txt".into() }, b"plain".as_slice(), "text/plain; charset=utf-8")]
    #[case(MediaKind::Audio { ptt: false }, b"OggS\x00\x02".as_slice(), "application/ogg")]
    fn sniffing(#[case] kind: MediaKind, #[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(sniff_for(&kind, data), expected);
    }

    #[test]
    fn upload_classes() {
        assert_eq!(MediaKind::Sticker.media_type(), MediaType::Image);
        assert_eq!(MediaKind::Gif.media_type(), MediaType::Video);
        assert!(MediaKind::Gif.wants_thumbnail());
        assert!(!MediaKind::Sticker.wants_thumbnail());
        assert!(!MediaKind::Audio { ptt: true }.wants_thumbnail());
    }
}
