//! Texture formats and the packed texture parameter word.

use std::fmt;

use crate::error::{Result, TextureError};

/// Hardware texture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TextureFormat {
    /// No texture
    None = 0,
    /// 3-bit alpha, 5-bit palette index
    A3I5 = 1,
    /// 2-bit palette index
    Palette4 = 2,
    /// 4-bit palette index
    Palette16 = 3,
    /// 8-bit palette index
    Palette256 = 4,
    /// 4x4 texel block compression
    Comp4x4 = 5,
    /// 5-bit alpha, 3-bit palette index
    A5I3 = 6,
    /// 16-bit direct color
    Direct = 7,
}

impl TextureFormat {
    /// Bits stored per texel
    pub fn bits_per_texel(self) -> usize {
        match self {
            Self::None => 0,
            Self::Palette4 | Self::Comp4x4 => 2,
            Self::Palette16 => 4,
            Self::A3I5 | Self::Palette256 | Self::A5I3 => 8,
            Self::Direct => 16,
        }
    }

    /// Whether texels index into a palette
    pub fn is_paletted(self) -> bool {
        matches!(
            self,
            Self::A3I5 | Self::Palette4 | Self::Palette16 | Self::Palette256 | Self::A5I3
        )
    }

    /// Number of texel bytes a `width` x `height` texture occupies
    pub fn texel_bytes(self, width: u32, height: u32) -> usize {
        (width as usize * height as usize * self.bits_per_texel()).div_ceil(8)
    }
}

impl TryFrom<u8> for TextureFormat {
    type Error = TextureError;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Self::None,
            1 => Self::A3I5,
            2 => Self::Palette4,
            3 => Self::Palette16,
            4 => Self::Palette256,
            5 => Self::Comp4x4,
            6 => Self::A5I3,
            7 => Self::Direct,
            other => return Err(TextureError::UnknownFormat(other)),
        })
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::A3I5 => "A3I5",
            Self::Palette4 => "Palette4",
            Self::Palette16 => "Palette16",
            Self::Palette256 => "Palette256",
            Self::Comp4x4 => "Comp4x4",
            Self::A5I3 => "A5I3",
            Self::Direct => "Direct",
        };
        f.write_str(name)
    }
}

/// Axes on which a texture repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureRepeat {
    /// Clamp on both axes
    #[default]
    None,
    /// Repeat along S
    S,
    /// Repeat along T
    T,
    /// Repeat along both axes
    ST,
}

/// Axes on which a repeating texture is mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureFlip {
    /// No mirroring
    #[default]
    None,
    /// Mirror along S
    S,
    /// Mirror along T
    T,
    /// Mirror along both axes
    ST,
}

impl TextureRepeat {
    /// Decode from the low two bits of `value`
    pub fn from_bits(value: u32) -> Self {
        match value & 0b11 {
            0 => Self::None,
            1 => Self::S,
            2 => Self::T,
            _ => Self::ST,
        }
    }
}

impl TextureFlip {
    /// Decode from the low two bits of `value`
    pub fn from_bits(value: u32) -> Self {
        match value & 0b11 {
            0 => Self::None,
            1 => Self::S,
            2 => Self::T,
            _ => Self::ST,
        }
    }
}

impl fmt::Display for TextureRepeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::S => "S",
            Self::T => "T",
            Self::ST => "ST",
        })
    }
}

impl fmt::Display for TextureFlip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::S => "S",
            Self::T => "T",
            Self::ST => "ST",
        })
    }
}

/// Decoded texture parameter word
///
/// Layout, least significant bit first: format (4), size exponent S (4),
/// size exponent T (4), repeat (2), flip (2), palette color 0 transparent (1),
/// use shared texture (1), shared texture id (8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureParam {
    /// Texel format
    pub format: TextureFormat,
    /// Width exponent, width is `8 << s`
    pub s: u8,
    /// Height exponent, height is `8 << t`
    pub t: u8,
    /// Repeat mode
    pub repeat: TextureRepeat,
    /// Flip mode
    pub flip: TextureFlip,
    /// Palette entry 0 is rendered fully transparent
    pub pal_color0_transparent: bool,
    /// Texture data is shared with another record
    pub use_shared_texture: bool,
    /// Record id of the shared texture
    pub shared_texture_id: u8,
}

/// Largest accepted size exponent (1024 texels)
pub const MAX_SIZE_EXPONENT: u8 = 7;

impl TextureParam {
    /// Decode the packed parameter word
    pub fn from_bits(bits: u32) -> Result<Self> {
        let format = TextureFormat::try_from((bits & 0xF) as u8)?;
        let s = ((bits >> 4) & 0xF) as u8;
        let t = ((bits >> 8) & 0xF) as u8;
        for exponent in [s, t] {
            if exponent > MAX_SIZE_EXPONENT {
                return Err(TextureError::InvalidSizeExponent(exponent));
            }
        }

        Ok(Self {
            format,
            s,
            t,
            repeat: TextureRepeat::from_bits(bits >> 12),
            flip: TextureFlip::from_bits(bits >> 14),
            pal_color0_transparent: (bits >> 16) & 1 != 0,
            use_shared_texture: (bits >> 17) & 1 != 0,
            shared_texture_id: ((bits >> 18) & 0xFF) as u8,
        })
    }

    /// Encode back into the packed parameter word
    pub fn to_bits(&self) -> u32 {
        (self.format as u32)
            | (u32::from(self.s) << 4)
            | (u32::from(self.t) << 8)
            | ((self.repeat as u32) << 12)
            | ((self.flip as u32) << 14)
            | (u32::from(self.pal_color0_transparent) << 16)
            | (u32::from(self.use_shared_texture) << 17)
            | (u32::from(self.shared_texture_id) << 18)
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        8 << self.s
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        8 << self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_ids() {
        for id in 0..8u8 {
            let format = TextureFormat::try_from(id).unwrap();
            assert_eq!(format as u8, id);
        }
        assert!(matches!(
            TextureFormat::try_from(8),
            Err(TextureError::UnknownFormat(8))
        ));
    }

    #[test]
    fn test_texel_bytes() {
        assert_eq!(TextureFormat::Palette4.texel_bytes(8, 8), 16);
        assert_eq!(TextureFormat::Palette16.texel_bytes(8, 8), 32);
        assert_eq!(TextureFormat::A3I5.texel_bytes(16, 8), 128);
        assert_eq!(TextureFormat::Direct.texel_bytes(8, 8), 128);
    }

    #[test]
    fn test_param_fields() {
        let bits = 3 | (1 << 4) | (2 << 8) | (1 << 12) | (3 << 14) | (1 << 16) | (0x2A << 18);
        let param = TextureParam::from_bits(bits).unwrap();
        assert_eq!(param.format, TextureFormat::Palette16);
        assert_eq!(param.width(), 16);
        assert_eq!(param.height(), 32);
        assert_eq!(param.repeat, TextureRepeat::S);
        assert_eq!(param.flip, TextureFlip::ST);
        assert!(param.pal_color0_transparent);
        assert!(!param.use_shared_texture);
        assert_eq!(param.shared_texture_id, 0x2A);
        assert_eq!(param.to_bits(), bits);
    }

    #[test]
    fn test_param_rejects_oversized_exponent() {
        let bits = 7 | (8 << 4);
        assert!(matches!(
            TextureParam::from_bits(bits),
            Err(TextureError::InvalidSizeExponent(8))
        ));
    }
}
