//! # Image Sniffing
//!
//! Reads the pixel dimensions of an uploaded image straight from its header
//! bytes, without decoding any pixel data.
//!
//! ## Supported Formats
//!
//! | Format | Signature | Dimensions |
//! |--------|-----------|------------|
//! | PNG | `89 50 4E 47` | IHDR: width u32 BE @16, height u32 BE @20 |
//! | JPEG | `FF D8` | first SOFn segment: height u16 BE @+5, width u16 BE @+7 |
//!
//! Anything else, or a header that is truncated or malformed, yields
//! [`FALLBACK_WIDTH`] x [`FALLBACK_HEIGHT`]. Sniffing never fails.

use tracing::debug;

/// Width used when the upload cannot be sniffed (and when there is no upload).
pub const FALLBACK_WIDTH: u32 = 1438;

/// Height used when the upload cannot be sniffed (and when there is no upload).
pub const FALLBACK_HEIGHT: u32 = 2592;

/// Encoded image formats accepted as wallpaper backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    /// MIME type used for data URIs and responses.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Read `(width, height)` from the header. `None` means the header is
    /// truncated or malformed.
    fn dimensions(self, data: &[u8]) -> Option<(u32, u32)> {
        match self {
            ImageFormat::Png => png_dimensions(data),
            ImageFormat::Jpeg => jpeg_dimensions(data),
        }
    }
}

/// Result of sniffing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Detected format, `None` for unrecognized data
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    fn fallback(format: Option<ImageFormat>) -> Self {
        Self {
            format,
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
        }
    }
}

/// Sniff the format and pixel dimensions of an encoded image.
pub fn sniff(data: &[u8]) -> ImageInfo {
    let format = ImageFormat::detect(data);

    match format.and_then(|f| f.dimensions(data)) {
        Some((width, height)) => {
            debug!(?format, width, height, "sniffed image dimensions");
            ImageInfo {
                format,
                width,
                height,
            }
        }
        None => {
            debug!(
                ?format,
                len = data.len(),
                "could not sniff dimensions, using {}x{}",
                FALLBACK_WIDTH,
                FALLBACK_HEIGHT
            );
            ImageInfo::fallback(format)
        }
    }
}

fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32_be(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// IHDR is always the first chunk, so its fields sit at fixed offsets.
fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    Some((read_u32_be(data, 16)?, read_u32_be(data, 20)?))
}

/// Start-Of-Frame markers. C4 (DHT), C8 (JPG) and CC (DAC) are excluded.
fn is_sof_marker(marker: u16) -> bool {
    matches!(
        marker,
        0xFFC0..=0xFFC3 | 0xFFC5..=0xFFC7 | 0xFFC9..=0xFFCB | 0xFFCD..=0xFFCF
    )
}

/// Walk the segment list until the first SOFn segment.
///
/// ```text
/// offset: FF Cn | len_hi len_lo | precision | h_hi h_lo | w_hi w_lo
///         +0      +2              +4          +5          +7
/// ```
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut offset = 2usize;

    while offset < data.len() {
        let marker = read_u16_be(data, offset)?;
        let length = read_u16_be(data, offset + 2)?;

        if is_sof_marker(marker) {
            let height = read_u16_be(data, offset + 5)?;
            let width = read_u16_be(data, offset + 7)?;
            return Some((width as u32, height as u32));
        }

        // A segment length counts its own two bytes, so anything below that is corrupt.
        if length < 2 {
            return None;
        }
        offset = offset.checked_add(2 + length as usize)?;
    }

    None
}
