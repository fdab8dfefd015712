//! Conversion of native texel data into RGBA8.
//!
//! Every decoder produces exactly `width * height * 4` bytes, row-major with
//! the first texel at the top-left. Sub-byte formats store the leftmost texel
//! in the least significant bits of each byte.

use ::image::RgbaImage;
use log::trace;

use crate::color::{Rgb555, expand3, expand5};
use crate::error::{Result, TextureError};
use crate::format::{TextureFormat, TextureParam};

/// Decode `texels` of the given `format` into RGBA8 pixels
///
/// `palette` holds little-endian RGB555 entries and is ignored by direct
/// color textures. `color0_transparent` only affects the plain palette formats.
pub fn decode(
    format: TextureFormat,
    width: u32,
    height: u32,
    texels: &[u8],
    palette: &[u8],
    color0_transparent: bool,
) -> Result<Vec<u8>> {
    let expected = format.texel_bytes(width, height);
    if texels.len() < expected {
        return Err(TextureError::TruncatedTexels {
            expected,
            actual: texels.len(),
        });
    }

    trace!("Decoding {width}x{height} {format} texture");
    let count = width as usize * height as usize;
    let palette = Palette::new(palette);
    let mut out = Vec::with_capacity(count * 4);

    match format {
        TextureFormat::None | TextureFormat::Comp4x4 => {
            return Err(TextureError::Unsupported(format));
        }
        TextureFormat::A3I5 => {
            for &texel in &texels[..count] {
                let color = palette.get(usize::from(texel & 0x1F))?;
                push(&mut out, color, expand3(texel >> 5));
            }
        }
        TextureFormat::A5I3 => {
            for &texel in &texels[..count] {
                let color = palette.get(usize::from(texel & 0x07))?;
                push(&mut out, color, expand5(texel >> 3));
            }
        }
        TextureFormat::Palette4 | TextureFormat::Palette16 | TextureFormat::Palette256 => {
            let bits = format.bits_per_texel();
            let mask = (1u16 << bits) - 1;
            let per_byte = 8 / bits;
            for i in 0..count {
                let byte = texels[i / per_byte];
                let shift = (i % per_byte) * bits;
                let index = usize::from((u16::from(byte) >> shift) & mask);
                let alpha = if color0_transparent && index == 0 { 0 } else { 0xFF };
                push(&mut out, palette.get(index)?, alpha);
            }
        }
        TextureFormat::Direct => {
            for pair in texels[..count * 2].chunks_exact(2) {
                let color = Rgb555(u16::from_le_bytes([pair[0], pair[1]]));
                let alpha = if color.alpha_bit() { 0xFF } else { 0 };
                push(&mut out, color, alpha);
            }
        }
    }

    Ok(out)
}

/// Decode a texture described by a parameter word
pub fn decode_with_param(param: &TextureParam, texels: &[u8], palette: &[u8]) -> Result<Vec<u8>> {
    decode(
        param.format,
        param.width(),
        param.height(),
        texels,
        palette,
        param.pal_color0_transparent,
    )
}

/// Wrap decoded pixels in an [`RgbaImage`]
pub fn to_rgba_image(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage> {
    let len = pixels.len();
    RgbaImage::from_raw(width, height, pixels).ok_or(TextureError::BufferSizeMismatch {
        width,
        height,
        len,
    })
}

fn push(out: &mut Vec<u8>, color: Rgb555, alpha: u8) {
    let [r, g, b] = color.to_rgb8();
    out.extend_from_slice(&[r, g, b, alpha]);
}

struct Palette<'a> {
    data: &'a [u8],
}

impl<'a> Palette<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn entries(&self) -> usize {
        self.data.len() / 2
    }

    fn get(&self, index: usize) -> Result<Rgb555> {
        match self.data.get(index * 2..index * 2 + 2) {
            Some(bytes) => Ok(Rgb555(u16::from_le_bytes([bytes[0], bytes[1]]))),
            None => Err(TextureError::PaletteIndexOutOfRange {
                index,
                entries: self.entries(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn palette(colors: &[u16]) -> Vec<u8> {
        colors.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    #[test]
    fn test_a3i5_splits_alpha_and_index() {
        let pal = palette(&[0x0000, 0x001F]);
        // index 1, alpha 7 then index 0, alpha 0
        let texels = [0b1110_0001, 0b0000_0000];
        let pixels = decode(TextureFormat::A3I5, 2, 1, &texels, &pal, false).unwrap();
        assert_eq!(pixels, vec![255, 0, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_a5i3_splits_alpha_and_index() {
        let pal = palette(&[0x0000, 0x03E0]);
        let texels = [0b1111_1001, 0b1000_0000];
        let pixels = decode(TextureFormat::A5I3, 2, 1, &texels, &pal, false).unwrap();
        assert_eq!(pixels, vec![0, 255, 0, 255, 0, 0, 0, 132]);
    }

    #[test]
    fn test_palette4_low_bits_first() {
        let pal = palette(&[0x0000, 0x001F, 0x03E0, 0x7C00]);
        // texels 0, 1, 2, 3 packed from the low bits
        let texels = [0b11_10_01_00];
        let pixels = decode(TextureFormat::Palette4, 4, 1, &texels, &pal, true).unwrap();
        assert_eq!(
            pixels,
            vec![0, 0, 0, 0, 255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255]
        );
    }

    #[test]
    fn test_palette_color0_opaque_without_flag() {
        let pal = palette(&[0x7FFF]);
        let pixels = decode(TextureFormat::Palette256, 1, 1, &[0], &pal, false).unwrap();
        assert_eq!(pixels, vec![255, 255, 255, 255]);
    }

    #[test]
    fn test_direct_uses_top_bit_as_alpha() {
        let texels = [0x1F, 0x80, 0x1F, 0x00];
        let pixels = decode(TextureFormat::Direct, 2, 1, &texels, &[], false).unwrap();
        assert_eq!(pixels, vec![255, 0, 0, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn test_comp4x4_is_unsupported() {
        let result = decode(TextureFormat::Comp4x4, 8, 8, &[0; 64], &[0; 8], false);
        assert!(matches!(
            result,
            Err(TextureError::Unsupported(TextureFormat::Comp4x4))
        ));
    }

    #[test]
    fn test_truncated_texels() {
        let result = decode(TextureFormat::Palette256, 8, 8, &[0; 63], &[0; 2], false);
        assert!(matches!(
            result,
            Err(TextureError::TruncatedTexels {
                expected: 64,
                actual: 63
            })
        ));
    }

    #[test]
    fn test_missing_palette_entry() {
        let result = decode(TextureFormat::Palette16, 2, 1, &[0x50], &palette(&[0; 4]), false);
        assert!(matches!(
            result,
            Err(TextureError::PaletteIndexOutOfRange {
                index: 5,
                entries: 4
            })
        ));
    }

    #[test]
    fn test_rgba_image_wrapping() {
        let image = to_rgba_image(2, 1, vec![0; 8]).unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert!(to_rgba_image(2, 2, vec![0; 8]).is_err());
    }
}
