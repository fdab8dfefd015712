//! Decoders for Nintendo DS texture formats.
//!
//! SPL particle archives embed their textures in the native formats of the
//! DS 3D engine: paletted formats with 2, 4 or 8 bits per texel, the two
//! translucent paletted formats (A3I5 and A5I3) and 16-bit direct color.
//! This crate turns those into plain RGBA8 buffers.
//!
//! # Examples
//!
//! ```
//! use spl_tex::{TextureFormat, decode};
//!
//! // Two texels of a 4-color palette, palette entry 0 is transparent
//! let palette = [0x00, 0x00, 0x1F, 0x00];
//! let pixels = decode(TextureFormat::Palette4, 2, 1, &[0b0100], &palette, true)?;
//! assert_eq!(pixels, [0, 0, 0, 0, 255, 0, 0, 255]);
//! # Ok::<(), spl_tex::TextureError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod color;
pub mod decode;
pub mod error;
pub mod format;

pub use color::Rgb555;
pub use decode::{decode, decode_with_param, to_rgba_image};
pub use error::{Result, TextureError};
pub use format::{TextureFlip, TextureFormat, TextureParam, TextureRepeat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
