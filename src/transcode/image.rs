//! `image` crate backed transcoder
//!
//! Decodes anything the `image` crate can read and re-encodes it in the
//! requested format. JPEG output uses an explicit quality setting.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};

use super::{TranscodeError, Transcoder};

/// JPEG quality used when none is configured
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Transcoder built on the `image` crate
#[derive(Debug, Clone)]
pub struct ImageTranscoder {
    jpeg_quality: u8,
}

impl ImageTranscoder {
    /// Create a transcoder with the given JPEG quality (clamped to 1..=100)
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Decode canonical bytes into an image
    pub fn decode(&self, source: &[u8]) -> Result<DynamicImage, TranscodeError> {
        image::load_from_memory(source).map_err(|e| TranscodeError::Decode {
            reason: e.to_string(),
        })
    }

    /// Resolve a format name (`png`, `jpg`, ...) to an encoder
    pub fn target_format(format: &str) -> Option<ImageFormat> {
        match format.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpeg" | "jpg" | "pjpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "bmp" | "x-bmp" => Some(ImageFormat::Bmp),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "tga" | "x-tga" => Some(ImageFormat::Tga),
            "ico" | "x-icon" => Some(ImageFormat::Ico),
            _ => None,
        }
    }

    fn encode(
        &self,
        image: &DynamicImage,
        target: ImageFormat,
        format: &str,
    ) -> Result<Vec<u8>, TranscodeError> {
        let encode_error = |e: image::ImageError| TranscodeError::Encode {
            format: format.to_string(),
            reason: e.to_string(),
        };

        let mut buffer = Vec::new();
        if target == ImageFormat::Jpeg {
            let rgb = image.to_rgb8();
            let (width, height) = image.dimensions();
            JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality)
                .encode(rgb.as_raw(), width, height, ColorType::Rgb8)
                .map_err(encode_error)?;
        } else {
            let mut cursor = Cursor::new(&mut buffer);
            image.write_to(&mut cursor, target).map_err(encode_error)?;
        }
        Ok(buffer)
    }
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl Transcoder for ImageTranscoder {
    fn transcode(&self, source: &[u8], format: &str) -> Result<Vec<u8>, TranscodeError> {
        let target = Self::target_format(format).ok_or_else(|| TranscodeError::UnsupportedFormat {
            format: format.to_string(),
        })?;

        let image = self.decode(source)?;
        self.encode(&image, target, format)
    }
}
