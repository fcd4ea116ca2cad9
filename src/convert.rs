use crate::format::TargetFormat;
use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Error decoding image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Error encoding {format}: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },
}

/// Strips an optional data-URI prefix (`data:<mime>;base64,`) and decodes
/// the remaining base64 payload into raw image bytes.
pub fn decode_payload(file: &str) -> Result<Vec<u8>, ConvertError> {
    let encoded = match file.split_once(',') {
        Some((_, payload)) => payload,
        None => file,
    };
    Ok(general_purpose::STANDARD.decode(encoded)?)
}

/// Decodes image bytes and re-encodes them in the target format.
///
/// The source format is sniffed from the byte signature, never from the
/// target token. Transparent or alpha-carrying sources headed for JPEG are
/// flattened onto an opaque white background first.
pub fn convert_image(payload: &[u8], format: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let img = image::load_from_memory(payload).map_err(ConvertError::Decode)?;
    debug!(
        "Decoded image: {}x{} color={:?}",
        img.width(),
        img.height(),
        img.color()
    );

    let img = if format.requires_opaque() && img.color().has_alpha() {
        debug!("Flattening alpha channel for {} target", format.token());
        flatten_onto_white(img)
    } else {
        img
    };

    encode_image(&img, format)
}

/// Composites the image over an opaque white background, using its alpha
/// channel as the mask. The result carries no alpha channel.
fn flatten_onto_white(img: DynamicImage) -> DynamicImage {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    let mut background = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let out = background.get_pixel_mut(x, y);
        for channel in 0..3 {
            let blended = pixel[channel] as u32 * alpha + 255 * (255 - alpha);
            out[channel] = ((blended + 127) / 255) as u8;
        }
    }

    DynamicImage::ImageRgb8(background)
}

/// Encodes an image to bytes in the given target format.
pub fn encode_image(img: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>, ConvertError> {
    let mut buffer = Cursor::new(Vec::new());

    let result = match format.codec() {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
            img.write_with_encoder(encoder)
        }
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
            img.write_with_encoder(encoder)
        }
        codec => img.write_to(&mut buffer, codec),
    };

    result.map_err(|e| ConvertError::Encode {
        format: format.token(),
        source: e,
    })?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn test_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_payload_accepts_bare_base64() {
        let bytes = test_png(2, 2, [255, 0, 0, 255]);
        let encoded = general_purpose::STANDARD.encode(&bytes);
        assert_eq!(decode_payload(&encoded).unwrap(), bytes);
    }

    #[test]
    fn decode_payload_strips_data_uri_prefix() {
        let bytes = test_png(2, 2, [255, 0, 0, 255]);
        let encoded = general_purpose::STANDARD.encode(&bytes);
        let with_prefix = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_payload(&with_prefix).unwrap(), bytes);
    }

    #[test]
    fn decode_payload_rejects_garbage() {
        assert!(matches!(
            decode_payload("!!!not-base64!!!"),
            Err(ConvertError::Base64(_))
        ));
    }

    #[test]
    fn convert_rejects_undecodable_bytes() {
        assert!(matches!(
            convert_image(b"definitely not an image", TargetFormat::Png),
            Err(ConvertError::Decode(_))
        ));
    }

    #[test]
    fn converted_output_is_decodable_in_every_format() {
        let png = test_png(4, 4, [0, 128, 255, 255]);
        for format in [
            TargetFormat::Png,
            TargetFormat::Jpg,
            TargetFormat::Jpeg,
            TargetFormat::Webp,
            TargetFormat::Gif,
            TargetFormat::Bmp,
        ] {
            let out = convert_image(&png, format).expect("conversion succeeds");
            let guessed = image::guess_format(&out).expect("output has a signature");
            assert_eq!(guessed, format.codec());
            image::load_from_memory(&out).expect("output decodes");
        }
    }

    #[test]
    fn transparent_source_flattens_to_white_for_jpeg() {
        let png = test_png(4, 4, [0, 0, 0, 0]);
        let out = convert_image(&png, TargetFormat::Jpg).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert!(!decoded.color().has_alpha());
        let rgb = decoded.into_rgb8();
        for pixel in rgb.pixels() {
            for channel in 0..3 {
                assert!(pixel[channel] >= 250, "expected near-white, got {:?}", pixel);
            }
        }
    }

    #[test]
    fn semi_transparent_pixels_blend_with_white() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(1, 1, Rgba([255, 0, 0, 128])));
        let flat = flatten_onto_white(img).into_rgb8();
        let pixel = flat.get_pixel(0, 0);
        assert_eq!(pixel[0], 255);
        // 0 * 128/255 + 255 * 127/255, rounded
        assert!((126..=129).contains(&pixel[1]));
        assert!((126..=129).contains(&pixel[2]));
    }

    #[test]
    fn opaque_source_skips_flattening_for_jpeg() {
        let img: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let out = convert_image(&bytes, TargetFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }
}
