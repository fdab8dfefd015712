//! 15-bit hardware colors.

/// A packed `xBBBBBGGGGGRRRRR` color as stored in palettes, direct
/// textures and particle resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb555(pub u16);

impl Rgb555 {
    /// White, the default particle color
    pub const WHITE: Self = Self(0x7FFF);

    /// Pack 5-bit channels, extra bits are discarded
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self(u16::from(r & 0x1F) | (u16::from(g & 0x1F) << 5) | (u16::from(b & 0x1F) << 10))
    }

    /// Red channel, 0..=31
    pub fn r5(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Green channel, 0..=31
    pub fn g5(self) -> u8 {
        ((self.0 >> 5) & 0x1F) as u8
    }

    /// Blue channel, 0..=31
    pub fn b5(self) -> u8 {
        ((self.0 >> 10) & 0x1F) as u8
    }

    /// Bit 15, used as the opacity bit by direct-color textures
    pub fn alpha_bit(self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// Channels expanded to 8 bits
    pub fn to_rgb8(self) -> [u8; 3] {
        [expand5(self.r5()), expand5(self.g5()), expand5(self.b5())]
    }

    /// Channels normalized to `0.0..=1.0`
    pub fn to_f32(self) -> [f32; 3] {
        [
            f32::from(self.r5()) / 31.0,
            f32::from(self.g5()) / 31.0,
            f32::from(self.b5()) / 31.0,
        ]
    }

    /// Nearest 15-bit color for normalized channels
    pub fn from_f32(rgb: [f32; 3]) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 31.0).round() as u8;
        Self::new(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }
}

impl From<u16> for Rgb555 {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

/// Expand a 5-bit channel to 8 bits, mapping 31 to 255
#[inline]
pub fn expand5(c: u8) -> u8 {
    (c << 3) | (c >> 2)
}

/// Expand a 3-bit alpha to 8 bits, mapping 7 to 255
#[inline]
pub fn expand3(a: u8) -> u8 {
    (a << 5) | (a << 2) | (a >> 1)
}
