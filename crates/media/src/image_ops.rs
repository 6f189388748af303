//! Image decoding, bounding and JPEG encoding for thumbnails.

use std::io::Cursor;

use image::{
    AnimationDecoder, DynamicImage, GenericImageView, ImageFormat, ImageReader,
    codecs::{gif::GifDecoder, jpeg::JpegEncoder},
    imageops::FilterType,
};

use crate::{
    error::{Error, Result},
    mime::{IMAGE_GIF, IMAGE_JPEG, IMAGE_PNG},
};

/// Bounds with the longer side pinned to `max_dimension`.
///
/// If `width >= height` the width becomes `max_dimension` and the height is
/// scaled by the same factor (and symmetrically otherwise). The scaled side is
/// truncated, never below 1.
pub fn thumbnail_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let scale = |side: u32, longest: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max_dimension)) / u64::from(longest.max(1));
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}

/// Decode a still image whose type was sniffed as `mime`.
///
/// Animated GIFs yield their first frame.
pub fn decode_still(data: &[u8], mime: &str) -> Result<DynamicImage> {
    let format = match mime {
        IMAGE_JPEG => ImageFormat::Jpeg,
        IMAGE_PNG => ImageFormat::Png,
        IMAGE_GIF => return decode_first_gif_frame(data),
        other => return Err(Error::unsupported(other)),
    };
    image::load_from_memory_with_format(data, format).map_err(|e| Error::decode(mime, e))
}

fn decode_first_gif_frame(data: &[u8]) -> Result<DynamicImage> {
    let decoder = GifDecoder::new(Cursor::new(data)).map_err(|e| Error::decode(IMAGE_GIF, e))?;
    let frame = decoder
        .into_frames()
        .next()
        .ok_or_else(|| Error::decode(IMAGE_GIF, "no frames"))?
        .map_err(|e| Error::decode(IMAGE_GIF, e))?;
    Ok(DynamicImage::ImageRgba8(frame.into_buffer()))
}

/// Decode an image of unknown format (extracted video frames).
pub fn decode_guessed(data: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::decode("extracted frame", e))?
        .decode()
        .map_err(|e| Error::decode("extracted frame", e))
}

/// Resize to thumbnail bounds with Lanczos3 and encode as JPEG.
pub fn render_thumbnail(img: &DynamicImage, max_dimension: u32, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::decode("image", "zero-sized image"));
    }
    let (target_width, target_height) = thumbnail_dimensions(width, height, max_dimension);
    let resized = img.resize_exact(target_width, target_height, FilterType::Lanczos3);
    encode_jpeg_with_quality(&resized, quality)
}

/// Encode image as JPEG with specified quality.
fn encode_jpeg_with_quality(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut output = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    rgb.write_with_encoder(encoder).map_err(Error::Encode)?;
    Ok(output.into_inner())
}
