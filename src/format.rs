use image::ImageFormat;

/// Output formats accepted by the converter. `Jpg` and `Jpeg` are kept as
/// distinct tokens because the response echoes the caller's spelling, but
/// both map to the same encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Png,
    Jpg,
    Jpeg,
    Webp,
    Gif,
    Bmp,
}

impl TargetFormat {
    /// Parses an already-uppercased format token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PNG" => Some(TargetFormat::Png),
            "JPG" => Some(TargetFormat::Jpg),
            "JPEG" => Some(TargetFormat::Jpeg),
            "WEBP" => Some(TargetFormat::Webp),
            "GIF" => Some(TargetFormat::Gif),
            "BMP" => Some(TargetFormat::Bmp),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpg => "JPG",
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Webp => "WEBP",
            TargetFormat::Gif => "GIF",
            TargetFormat::Bmp => "BMP",
        }
    }

    /// File extension for derived filenames, always lowercase.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpg => "jpg",
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Webp => "webp",
            TargetFormat::Gif => "gif",
            TargetFormat::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TargetFormat::Png => "image/png",
            TargetFormat::Jpg | TargetFormat::Jpeg => "image/jpeg",
            TargetFormat::Webp => "image/webp",
            TargetFormat::Gif => "image/gif",
            TargetFormat::Bmp => "image/bmp",
        }
    }

    /// The codec used to encode this format; the JPG alias collapses here.
    pub fn codec(&self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpg | TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Webp => ImageFormat::WebP,
            TargetFormat::Gif => ImageFormat::Gif,
            TargetFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// JPEG cannot carry an alpha channel, so transparent sources must be
    /// flattened before encoding.
    pub fn requires_opaque(&self) -> bool {
        matches!(self, TargetFormat::Jpg | TargetFormat::Jpeg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_supported_tokens() {
        for token in ["PNG", "JPG", "JPEG", "WEBP", "GIF", "BMP"] {
            let format = TargetFormat::from_token(token).expect("token parses");
            assert_eq!(format.token(), token);
        }
    }

    #[test]
    fn rejects_unknown_and_lowercase_tokens() {
        assert!(TargetFormat::from_token("TIFF").is_none());
        assert!(TargetFormat::from_token("png").is_none());
        assert!(TargetFormat::from_token("").is_none());
    }

    #[test]
    fn jpg_aliases_jpeg_encoder_but_keeps_its_token() {
        let jpg = TargetFormat::from_token("JPG").unwrap();
        let jpeg = TargetFormat::from_token("JPEG").unwrap();
        assert_eq!(jpg.codec(), jpeg.codec());
        assert_eq!(jpg.content_type(), "image/jpeg");
        assert_eq!(jpg.extension(), "jpg");
        assert_eq!(jpeg.extension(), "jpeg");
    }

    #[test]
    fn content_types_match_lookup_table() {
        assert_eq!(TargetFormat::Png.content_type(), "image/png");
        assert_eq!(TargetFormat::Webp.content_type(), "image/webp");
        assert_eq!(TargetFormat::Gif.content_type(), "image/gif");
        assert_eq!(TargetFormat::Bmp.content_type(), "image/bmp");
    }

    #[test]
    fn only_jpeg_targets_require_flattening() {
        assert!(TargetFormat::Jpg.requires_opaque());
        assert!(TargetFormat::Jpeg.requires_opaque());
        assert!(!TargetFormat::Png.requires_opaque());
        assert!(!TargetFormat::Webp.requires_opaque());
    }
}
