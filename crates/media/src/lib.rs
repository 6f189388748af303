//! Media pipeline: content sniffing, image decoding and bounded JPEG
//! thumbnails, with video frames pulled through an external decoder.

pub mod error;
pub mod frame;
pub mod image_ops;
pub mod mime;
pub mod thumbnail;

pub use {
    error::{Error, Result},
    frame::{FfmpegFrameExtractor, FrameExtractor},
    thumbnail::ThumbnailGenerator,
};
