//! Texture table decoding.

use log::{debug, warn};

use crate::error::{Result, SplError};
use crate::header::SplHeader;
use crate::reader::{ByteReader, Cursor};
use spl_tex::{TextureError, TextureFormat, TextureParam, decode_with_param};

/// Texture record magic, stored as the bytes `" TPS"`
pub const TEXTURE_MAGIC: [u8; 4] = *b" TPS";

/// Size of a texture record descriptor
pub const TEXTURE_HEADER_SIZE: usize = 32;

/// A decoded texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub param: TextureParam,
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, `width * height * 4` bytes, empty if the format is not decodable
    pixels: Vec<u8>,
    /// Raw texel bytes as stored in the archive
    pub texture_size: usize,
    /// Raw palette bytes as stored in the archive
    pub palette_size: usize,
}

impl TextureRecord {
    /// Build a record from already decoded RGBA8 pixels
    pub fn from_rgba(param: TextureParam, pixels: Vec<u8>) -> Result<Self> {
        let (width, height) = (param.width(), param.height());
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(SplError::Texture {
                index: 0,
                source: TextureError::BufferSizeMismatch {
                    width,
                    height,
                    len: pixels.len(),
                },
            });
        }
        Ok(Self {
            param,
            width,
            height,
            texture_size: param.format.texel_bytes(width, height),
            palette_size: 0,
            pixels,
        })
    }

    pub fn format(&self) -> TextureFormat {
        self.param.format
    }

    /// Decoded RGBA8 pixels
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether pixel data is available
    pub fn is_decoded(&self) -> bool {
        !self.pixels.is_empty()
    }

    /// Convert into an image buffer, `None` when the texture was not decodable
    pub fn to_image(&self) -> Option<image::RgbaImage> {
        if !self.is_decoded() {
            return None;
        }
        spl_tex::to_rgba_image(self.width, self.height, self.pixels.clone()).ok()
    }
}

fn sub_slice<'a>(
    block: &'a [u8],
    start: usize,
    len: usize,
    what: &'static str,
    base: usize,
) -> Result<&'a [u8]> {
    start
        .checked_add(len)
        .and_then(|end| block.get(start..end))
        .ok_or(SplError::OutOfBounds {
            what,
            offset: base + start,
            size: len,
            file_size: base + block.len(),
        })
}

/// Decode every texture record described by `header`
pub(crate) fn parse_textures(data: &[u8], header: &SplHeader) -> Result<Vec<TextureRecord>> {
    let range = header.texture_range();
    let base = range.start;
    let block = &data[range];
    let mut textures = Vec::with_capacity(usize::from(header.texture_count));
    let mut offset = 0usize;

    for index in 0..usize::from(header.texture_count) {
        let record = sub_slice(block, offset, TEXTURE_HEADER_SIZE, "texture header", base)?;
        let mut cursor = Cursor::with_base(record, base + offset);
        let context = |e: SplError| e.with_context(format!("texture {index}"));

        let magic: [u8; 4] = cursor.read_array().map_err(context)?;
        if magic != TEXTURE_MAGIC {
            return Err(context(SplError::InvalidMagic {
                expected: String::from_utf8_lossy(&TEXTURE_MAGIC).into_owned(),
                actual: String::from_utf8_lossy(&magic).into_owned(),
            }));
        }
        let param = TextureParam::from_bits(cursor.read_u32_le().map_err(context)?)
            .map_err(|source| SplError::Texture { index, source })?;
        let texture_size = cursor.read_u32_le().map_err(context)? as usize;
        let palette_offset = cursor.read_u32_le().map_err(context)? as usize;
        let palette_size = cursor.read_u32_le().map_err(context)? as usize;
        cursor.skip(8).map_err(context)?;
        let resource_size = cursor.read_u32_le().map_err(context)? as usize;

        if resource_size < TEXTURE_HEADER_SIZE {
            return Err(context(SplError::OutOfBounds {
                what: "texture record",
                offset: base + offset,
                size: resource_size,
                file_size: data.len(),
            }));
        }

        let texels = sub_slice(
            block,
            offset + TEXTURE_HEADER_SIZE,
            texture_size,
            "texture data",
            base,
        )?;
        let palette = sub_slice(block, offset + palette_offset, palette_size, "palette", base)?;

        let pixels = match decode_with_param(&param, texels, palette) {
            Ok(pixels) => pixels,
            Err(TextureError::Unsupported(TextureFormat::Comp4x4)) => {
                warn!("Texture {index}: Comp4x4 textures are not decoded");
                Vec::new()
            }
            Err(source) => return Err(SplError::Texture { index, source }),
        };

        debug!(
            "Texture {}: {} {}x{}, {} texel bytes, {} palette bytes",
            index,
            param.format,
            param.width(),
            param.height(),
            texture_size,
            palette_size
        );

        textures.push(TextureRecord {
            param,
            width: param.width(),
            height: param.height(),
            pixels,
            texture_size,
            palette_size,
        });
        offset += resource_size;
    }

    Ok(textures)
}
