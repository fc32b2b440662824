//! Image format transcoding
//!
//! The texture capability treats the transcoder as a black box: canonical
//! bytes in, bytes in the requested wire format out. Empty output means the
//! format could not be produced and the next preferred format should be tried.

mod image;

pub use self::image::{ImageTranscoder, DEFAULT_JPEG_QUALITY};

use thiserror::Error;

/// Transcoding error type
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Failed to decode source image: {reason}")]
    Decode { reason: String },

    #[error("No such codec: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to encode {format}: {reason}")]
    Encode { format: String, reason: String },
}

/// Converts an encoded image into another wire format
pub trait Transcoder: Send + Sync {
    /// Re-encode `source` as `format` (e.g. `png`, `jpeg`)
    fn transcode(&self, source: &[u8], format: &str) -> Result<Vec<u8>, TranscodeError>;
}
