/// Raster formats a tile body is accepted as.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Identifies the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        if bytes.starts_with(PNG) {
            return Some(ImageFormat::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLoadFailure {
    /// The image request failed (transport error or non-2xx status).
    Fetch(String),
    /// A body arrived but is not a recognisable image.
    Undecodable,
}

impl std::fmt::Display for ImageLoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageLoadFailure::Fetch(msg) => write!(f, "image fetch failed: {msg}"),
            ImageLoadFailure::Undecodable => write!(f, "image could not be decoded"),
        }
    }
}

impl std::error::Error for ImageLoadFailure {}

/// Validates a fetched body the way an image element would before drawing.
pub fn check_image(bytes: &[u8]) -> Result<ImageFormat, ImageLoadFailure> {
    ImageFormat::sniff(bytes).ok_or(ImageLoadFailure::Undecodable)
}
