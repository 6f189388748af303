//! JPEG preview generation for image, gif and video sends.

use std::{path::Path, sync::Arc};

use {
    courier_config::ThumbnailConfig,
    image::DynamicImage,
    tokio::{fs::File, io::AsyncReadExt},
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    frame::{FfmpegFrameExtractor, FrameExtractor},
    image_ops,
    mime::{self, SNIFF_LEN},
};

/// Produces bounded JPEG thumbnails from local media files.
#[derive(Clone)]
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
    extractor: Arc<dyn FrameExtractor>,
}

impl ThumbnailGenerator {
    pub fn new(config: ThumbnailConfig, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self { config, extractor }
    }

    /// Generator backed by ffmpeg for video frames.
    pub fn with_ffmpeg(config: ThumbnailConfig, ffmpeg: &courier_config::FfmpegConfig) -> Self {
        Self::new(config, Arc::new(FfmpegFrameExtractor::from_config(ffmpeg)))
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Generate a JPEG thumbnail for the file at `path`.
    ///
    /// Still images are decoded directly; videos go through the frame
    /// extractor with a scratch directory that is removed on every exit path.
    pub async fn generate(&self, path: &Path) -> Result<Vec<u8>> {
        let header = read_header(path).await?;
        let mime = mime::sniff(&header);

        let image = if mime::is_still_image(mime) {
            let data = tokio::fs::read(path).await?;
            tokio::task::spawn_blocking(move || image_ops::decode_still(&data, mime)).await??
        } else if mime::is_video(mime) {
            self.video_frame(path).await?
        } else {
            return Err(Error::unsupported(mime));
        };

        let max_dimension = self.config.max_dimension;
        let quality = self.config.jpeg_quality;
        let thumbnail = tokio::task::spawn_blocking(move || {
            image_ops::render_thumbnail(&image, max_dimension, quality)
        })
        .await??;

        debug!(
            path = %path.display(),
            mime,
            bytes = thumbnail.len(),
            "generated thumbnail"
        );
        Ok(thumbnail)
    }

    async fn video_frame(&self, path: &Path) -> Result<DynamicImage> {
        let scratch = tempfile::Builder::new()
            .prefix("courier-thumbnail")
            .tempdir()?;
        let frame_path = self
            .extractor
            .extract_frame(path, self.config.video_frame_index, scratch.path())
            .await?;
        let data = tokio::fs::read(&frame_path).await?;
        let image = tokio::task::spawn_blocking(move || image_ops::decode_guessed(&data)).await??;
        drop(scratch);
        Ok(image)
    }
}

/// Read at most [`SNIFF_LEN`] bytes from the start of the file.
async fn read_header(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header).await?;
    Ok(header)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use {
        super::*,
        async_trait::async_trait,
        image::{GenericImageView, ImageFormat, RgbImage},
    };

    /// Writes a fixed PNG as the "extracted" frame and records its inputs.
    #[derive(Default)]
    struct FakeExtractor {
        calls: AtomicUsize,
        last_dir: Mutex<Option<PathBuf>>,
        last_index: Mutex<Option<u32>>,
        fail: bool,
    }

    #[async_trait]
    impl FrameExtractor for FakeExtractor {
        async fn extract_frame(
            &self,
            _video: &Path,
            frame_index: u32,
            out_dir: &Path,
        ) -> Result<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_dir.lock().unwrap() = Some(out_dir.to_path_buf());
            *self.last_index.lock().unwrap() = Some(frame_index);
            let frame = out_dir.join("frame.png");
            std::fs::write(&frame, b"scratch").unwrap();
            if self.fail {
                return Err(Error::frame_extraction("decoder crashed"));
            }
            DynamicImage::ImageRgb8(RgbImage::new(640, 360))
                .save_with_format(&frame, ImageFormat::Png)
                .unwrap();
            Ok(frame)
        }
    }

    fn mp4_header() -> Vec<u8> {
        let mut data = vec![0, 0, 0, 0x18];
        data.extend_from_slice(b"ftypisom\x00\x00\x02\x00isommp41");
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    fn generator(extractor: Arc<FakeExtractor>) -> ThumbnailGenerator {
        ThumbnailGenerator::new(ThumbnailConfig::default(), extractor)
    }

    #[tokio::test]
    async fn still_image_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        DynamicImage::ImageRgb8(RgbImage::new(300, 900))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let extractor = Arc::new(FakeExtractor::default());
        let thumb = generator(extractor.clone()).generate(&path).await.unwrap();
        let out = image::load_from_memory_with_format(&thumb, ImageFormat::Jpeg).unwrap();
        assert_eq!(out.dimensions(), (66, 200));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn video_uses_second_frame_and_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, mp4_header()).unwrap();

        let extractor = Arc::new(FakeExtractor::default());
        let thumb = generator(extractor.clone()).generate(&path).await.unwrap();
        let out = image::load_from_memory(&thumb).unwrap();
        assert_eq!(out.dimensions(), (200, 112));

        assert_eq!(*extractor.last_index.lock().unwrap(), Some(1));
        let scratch = extractor.last_dir.lock().unwrap().clone().unwrap();
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn failed_extraction_still_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        std::fs::write(&path, mp4_header()).unwrap();

        let extractor = Arc::new(FakeExtractor {
            fail: true,
            ..Default::default()
        });
        let err = generator(extractor.clone()).generate(&path).await.unwrap_err();
        assert!(matches!(err, Error::FrameExtraction { .. }));
        let scratch = extractor.last_dir.lock().unwrap().clone().unwrap();
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4\n...").unwrap();

        let err = generator(Arc::new(FakeExtractor::default()))
            .generate(&path)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaType { ref mime } if mime == "application/pdf"));
    }

    #[tokio::test]
    async fn sniffing_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("looks-like.mp4");
        DynamicImage::ImageRgb8(RgbImage::new(20, 10))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();

        let extractor = Arc::new(FakeExtractor::default());
        let thumb = generator(extractor.clone()).generate(&path).await.unwrap();
        assert!(!thumb.is_empty());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = generator(Arc::new(FakeExtractor::default()))
            .generate(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
