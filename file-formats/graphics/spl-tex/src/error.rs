//! Errors raised while interpreting or decoding DS textures.

use thiserror::Error;

use crate::format::TextureFormat;

/// Errors that can occur while interpreting or decoding a DS texture
#[derive(Debug, Error)]
pub enum TextureError {
    /// Format id outside of the 3-bit hardware range
    #[error("Unknown texture format id {0}")]
    UnknownFormat(u8),
    /// Known format that this library does not decode
    #[error("Texture format {0} is not supported for decoding")]
    Unsupported(TextureFormat),
    /// Size exponent that would produce a texture larger than 1024 texels
    #[error("Invalid size exponent {0}, expected 0..=7")]
    InvalidSizeExponent(u8),
    /// Fewer texel bytes than the format and dimensions require
    #[error("Texel data too short: expected {expected} bytes, got {actual}")]
    TruncatedTexels {
        /// Number of bytes the texture needs
        expected: usize,
        /// Number of bytes actually present
        actual: usize,
    },
    /// A texel refers to a palette entry that does not exist
    #[error("Palette index {index} out of range, palette has {entries} entries")]
    PaletteIndexOutOfRange {
        /// Index stored in the texel
        index: usize,
        /// Number of colors in the palette
        entries: usize,
    },
    /// Decoded buffer does not match the declared dimensions
    #[error("Pixel buffer of {len} bytes does not match a {width}x{height} RGBA image")]
    BufferSizeMismatch {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
        /// Buffer length in bytes
        len: usize,
    },
}

/// Result type using [`TextureError`]
pub type Result<T> = std::result::Result<T, TextureError>;
