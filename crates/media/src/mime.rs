//! Content sniffing by magic bytes.
//!
//! Only the leading [`SNIFF_LEN`] bytes are inspected, so callers classifying
//! a file never need to load it whole. Extensions are ignored.

pub const SNIFF_LEN: usize = 512;

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_WEBP: &str = "image/webp";
pub const VIDEO_MP4: &str = "video/mp4";
pub const VIDEO_MPEG: &str = "video/mpeg";
pub const VIDEO_QUICKTIME: &str = "video/quicktime";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Signatures that match a fixed prefix.
const PREFIX_SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"GIF87a", IMAGE_GIF),
    (b"GIF89a", IMAGE_GIF),
    (b"\x89PNG\r\n\x1a\n", IMAGE_PNG),
    (b"\xFF\xD8\xFF", IMAGE_JPEG),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"ID3", "audio/mpeg"),
    (b"OggS\x00", "application/ogg"),
    (b"MThd\x00\x00\x00\x06", "audio/midi"),
    (b"fLaC", "audio/flac"),
    (b"\x1A\x45\xDF\xA3", "video/webm"),
    (b"\x00\x00\x01\xBA", VIDEO_MPEG),
    (b"\x00\x00\x01\xB3", VIDEO_MPEG),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"Rar!\x1A\x07", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
];

/// RIFF containers: `RIFF<size><fourcc>`.
const RIFF_SIGNATURES: &[(&[u8; 4], &str)] = &[
    (b"WEBP", IMAGE_WEBP),
    (b"WAVE", "audio/wave"),
    (b"AVI ", "video/avi"),
];

/// Classify content from its leading bytes.
pub fn sniff(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if let Some(&(_, mime)) = PREFIX_SIGNATURES
        .iter()
        .find(|(signature, _)| data.starts_with(signature))
    {
        return mime;
    }

    if data.len() >= 12
        && data.starts_with(b"RIFF")
        && let Some(&(_, mime)) = RIFF_SIGNATURES
            .iter()
            .find(|(fourcc, _)| &data[8..12] == fourcc.as_slice())
    {
        return mime;
    }

    if let Some(mime) = sniff_iso_media(data) {
        return mime;
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

/// ISO base media (`ftyp` box): MP4 or QuickTime depending on brands.
fn sniff_iso_media(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return None;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size % 4 != 0 || box_size < 12 || data.len() < box_size {
        return None;
    }

    if &data[8..12] == b"qt  " {
        return Some(VIDEO_QUICKTIME);
    }

    // Major brand at 8, minor version at 12, compatible brands after.
    (8..box_size)
        .step_by(4)
        .filter(|offset| *offset != 12)
        .any(|offset| data[offset..offset + 3] == *b"mp4")
        .then_some(VIDEO_MP4)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// JPEG, PNG or GIF: formats the thumbnailer decodes directly.
pub fn is_still_image(mime: &str) -> bool {
    matches!(mime, IMAGE_JPEG | IMAGE_PNG | IMAGE_GIF)
}

/// Containers the thumbnailer hands to the frame extractor.
pub fn is_video(mime: &str) -> bool {
    matches!(mime, VIDEO_MP4 | VIDEO_MPEG | VIDEO_QUICKTIME)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn ftyp(brands: &[&[u8; 4]]) -> Vec<u8> {
        let size = 8 + 4 * brands.len() as u32 + 4;
        let mut out = size.to_be_bytes().to_vec();
        out.extend_from_slice(b"ftyp");
        out.extend_from_slice(brands[0]);
        out.extend_from_slice(&[0, 0, 2, 0]);
        for brand in &brands[1..] {
            out.extend_from_slice(*brand);
        }
        out
    }

    #[rstest]
    #[case(b"\xFF\xD8\xFF\xE0\x00\x10JFIF".as_slice(), IMAGE_JPEG)]
    #[case(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".as_slice(), IMAGE_PNG)]
    #[case(b"GIF89a\x01\x00\x01\x00".as_slice(), IMAGE_GIF)]
    #[case(b"RIFF\x24\x00\x00\x00WEBPVP8 ".as_slice(), IMAGE_WEBP)]
    #[case(b"RIFF\x24\x00\x00\x00WAVEfmt ".as_slice(), "audio/wave")]
    #[case(b"OggS\x00\x02\x00\x00".as_slice(), "application/ogg")]
    #[case(b"%PDF-1.7\n".as_slice(), "application/pdf")]
    #[case(b"\x00\x00\x01\xBA\x44\x00".as_slice(), VIDEO_MPEG)]
    #[case(b"hello world".as_slice(), TEXT_PLAIN)]
    #[case(b"\x00\x01\x02\x03garbage".as_slice(), OCTET_STREAM)]
    fn sniff_signatures(#[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(sniff(data), expected);
    }

    #[test]
    fn sniff_mp4_by_compatible_brand() {
        assert_eq!(sniff(&ftyp(&[b"isom", b"isom", b"mp41"])), VIDEO_MP4);
        assert_eq!(sniff(&ftyp(&[b"mp42", b"isom"])), VIDEO_MP4);
    }

    #[test]
    fn sniff_quicktime_brand() {
        assert_eq!(sniff(&ftyp(&[b"qt  ", b"qt  "])), VIDEO_QUICKTIME);
    }

    #[test]
    fn sniff_ftyp_without_mp4_brand_is_binary() {
        assert_eq!(sniff(&ftyp(&[b"heic", b"mif1"])), OCTET_STREAM);
    }

    #[test]
    fn only_leading_bytes_are_considered() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(sniff(&data), TEXT_PLAIN);
    }

    #[test]
    fn classification_helpers() {
        assert!(is_still_image(IMAGE_GIF));
        assert!(!is_still_image(IMAGE_WEBP));
        assert!(is_video(VIDEO_QUICKTIME));
        assert!(!is_video("video/webm"));
    }
}
