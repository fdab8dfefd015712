//! Animation curves evaluated over a particle's life.
//!
//! Every curve is sampled with a normalized life fraction `t` in `[0, 1]`.
//! Breakpoints (`curve_in`, `peak`, `curve_out`) are fractions of the same range.

use glam::Vec3;

use crate::error::Result;
use crate::fx::ratio;
use crate::reader::{ByteReader, Cursor, bit, bits};
use spl_tex::Rgb555;

/// Number of texture slots in a texture animation
pub const TEX_ANIM_SLOTS: usize = 8;

/// Three-point scale curve: start → mid over `[0, in)`, mid until `out`, then mid → end
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleAnim {
    pub start: f32,
    pub mid: f32,
    pub end: f32,
    pub curve_in: f32,
    pub curve_out: f32,
    /// Repeat over the resource's loop time instead of the particle life
    pub looped: bool,
}

/// Color curve that blends through the resource's base color
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorAnim {
    pub start: Vec3,
    pub end: Vec3,
    pub curve_in: f32,
    pub peak: f32,
    pub curve_out: f32,
    /// Each particle starts from a random one of start, base and end colors
    pub random_start_color: bool,
    pub looped: bool,
    /// Blend between breakpoints instead of switching at them
    pub interpolate: bool,
}

/// Three-point alpha curve with optional per-frame flicker
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlphaAnim {
    pub start: f32,
    pub mid: f32,
    pub end: f32,
    /// Maximum fraction removed at random every frame
    pub random_range: f32,
    pub looped: bool,
    pub curve_in: f32,
    pub curve_out: f32,
}

/// Texture flipbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TexAnim {
    /// Texture indices, the first `frame_count` are used
    pub textures: [u8; TEX_ANIM_SLOTS],
    pub frame_count: u8,
    /// Life fraction per frame, as an 8-bit ratio
    pub step: u8,
    /// Start each particle on a random frame
    pub randomize_init: bool,
    pub looped: bool,
}

/// Sample a start/mid/end curve
fn three_point(start: f32, mid: f32, end: f32, curve_in: f32, curve_out: f32, t: f32) -> f32 {
    if t < curve_in {
        start + (mid - start) * (t / curve_in)
    } else if t < curve_out {
        mid
    } else if curve_out >= 1.0 {
        mid
    } else {
        mid + (end - mid) * ((t - curve_out) / (1.0 - curve_out)).min(1.0)
    }
}

impl ScaleAnim {
    pub const SIZE: usize = 12;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let start = cursor.read_fx16()?;
        let mid = cursor.read_fx16()?;
        let end = cursor.read_fx16()?;
        let curve_in = ratio(cursor.read_u8()?);
        let curve_out = ratio(cursor.read_u8()?);
        let flags = cursor.read_u16_le()?;
        cursor.skip(2)?;
        Ok(Self {
            start,
            mid,
            end,
            curve_in,
            curve_out,
            looped: bit(u32::from(flags), 0),
        })
    }

    /// Scale multiplier at life fraction `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        three_point(self.start, self.mid, self.end, self.curve_in, self.curve_out, t)
    }
}

impl Default for ScaleAnim {
    fn default() -> Self {
        Self {
            start: 1.0,
            mid: 1.0,
            end: 1.0,
            curve_in: 0.0,
            curve_out: 1.0,
            looped: false,
        }
    }
}

impl ColorAnim {
    pub const SIZE: usize = 12;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let start = Vec3::from(Rgb555(cursor.read_u16_le()?).to_f32());
        let end = Vec3::from(Rgb555(cursor.read_u16_le()?).to_f32());
        let curve_in = ratio(cursor.read_u8()?);
        let peak = ratio(cursor.read_u8()?);
        let curve_out = ratio(cursor.read_u8()?);
        cursor.skip(1)?;
        let flags = u32::from(cursor.read_u16_le()?);
        cursor.skip(2)?;
        Ok(Self {
            start,
            end,
            curve_in,
            peak,
            curve_out,
            random_start_color: bit(flags, 0),
            looped: bit(flags, 1),
            interpolate: bit(flags, 2),
        })
    }

    /// Color at life fraction `t`
    ///
    /// `base` is the resource color reached at the peak. `start` replaces the
    /// curve's own start color for particles that picked a random one.
    pub fn evaluate(&self, t: f32, base: Vec3, start: Option<Vec3>) -> Vec3 {
        let start = start.unwrap_or(self.start);
        if t < self.curve_in {
            return start;
        }
        if !self.interpolate {
            return if t < self.curve_out { base } else { self.end };
        }
        if t < self.peak {
            let span = self.peak - self.curve_in;
            start.lerp(base, if span > 0.0 { (t - self.curve_in) / span } else { 1.0 })
        } else if t < self.curve_out {
            let span = self.curve_out - self.peak;
            base.lerp(self.end, if span > 0.0 { (t - self.peak) / span } else { 1.0 })
        } else {
            self.end
        }
    }
}

impl Default for ColorAnim {
    fn default() -> Self {
        Self {
            start: Vec3::ONE,
            end: Vec3::ONE,
            curve_in: 0.0,
            peak: 0.5,
            curve_out: 1.0,
            random_start_color: false,
            looped: false,
            interpolate: true,
        }
    }
}

impl AlphaAnim {
    pub const SIZE: usize = 8;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let alpha = u32::from(cursor.read_u16_le()?);
        let flags = u32::from(cursor.read_u16_le()?);
        let curve_in = ratio(cursor.read_u8()?);
        let curve_out = ratio(cursor.read_u8()?);
        cursor.skip(2)?;
        let level = |shift| bits(alpha, shift, 5) as f32 / 31.0;
        Ok(Self {
            start: level(0),
            mid: level(5),
            end: level(10),
            random_range: ratio(bits(flags, 0, 8) as u8),
            looped: bit(flags, 8),
            curve_in,
            curve_out,
        })
    }

    /// Alpha multiplier at life fraction `t`, before flicker
    pub fn evaluate(&self, t: f32) -> f32 {
        three_point(self.start, self.mid, self.end, self.curve_in, self.curve_out, t)
    }

    /// Apply flicker for a uniform sample `r` in `[0, 1)`
    pub fn flicker(&self, alpha: f32, r: f32) -> f32 {
        alpha * (1.0 - self.random_range * r)
    }
}

impl Default for AlphaAnim {
    fn default() -> Self {
        Self {
            start: 1.0,
            mid: 1.0,
            end: 1.0,
            random_range: 0.0,
            looped: false,
            curve_in: 0.0,
            curve_out: 1.0,
        }
    }
}

impl TexAnim {
    pub const SIZE: usize = 12;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let textures = cursor.read_array()?;
        let param = cursor.read_u32_le()?;
        Ok(Self {
            textures,
            frame_count: bits(param, 0, 8) as u8,
            step: bits(param, 8, 8) as u8,
            randomize_init: bit(param, 16),
            looped: bit(param, 17),
        })
    }

    /// Texture indices actually used by the flipbook
    pub fn frames(&self) -> &[u8] {
        &self.textures[..usize::from(self.frame_count).min(TEX_ANIM_SLOTS)]
    }

    /// Flipbook frame at life fraction `t`, shifted by `offset` frames
    pub fn frame(&self, t: f32, offset: u8) -> usize {
        let count = self.frames().len();
        if count == 0 {
            return 0;
        }
        let step = ratio(self.step);
        let advanced = if step > 0.0 { (t / step) as usize } else { 0 };
        let frame = advanced + usize::from(offset);
        if self.looped {
            frame % count
        } else {
            frame.min(count - 1)
        }
    }

    /// Texture index at life fraction `t`
    pub fn texture(&self, t: f32, offset: u8) -> u8 {
        self.frames().get(self.frame(t, offset)).copied().unwrap_or(0)
    }
}

impl Default for TexAnim {
    fn default() -> Self {
        Self {
            textures: [0; TEX_ANIM_SLOTS],
            frame_count: 1,
            step: 255,
            randomize_init: false,
            looped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_scale_curve_segments() {
        let anim = ScaleAnim {
            start: 0.0,
            mid: 2.0,
            end: 1.0,
            curve_in: 0.25,
            curve_out: 0.5,
            looped: false,
        };
        assert!(approx(anim.evaluate(0.0), 0.0));
        assert!(approx(anim.evaluate(0.125), 1.0));
        assert!(approx(anim.evaluate(0.3), 2.0));
        assert!(approx(anim.evaluate(0.75), 1.5));
        assert!(approx(anim.evaluate(1.0), 1.0));
    }

    #[test]
    fn test_scale_curve_without_ramps() {
        let anim = ScaleAnim {
            mid: 3.0,
            curve_in: 0.0,
            curve_out: 1.0,
            ..ScaleAnim::default()
        };
        assert!(approx(anim.evaluate(0.0), 3.0));
        assert!(approx(anim.evaluate(1.0), 3.0));
    }

    #[test]
    fn test_color_curve_interpolated() {
        let anim = ColorAnim {
            start: Vec3::ZERO,
            end: Vec3::new(0.0, 0.0, 1.0),
            curve_in: 0.2,
            peak: 0.4,
            curve_out: 0.8,
            ..ColorAnim::default()
        };
        let base = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(anim.evaluate(0.1, base, None), Vec3::ZERO);
        assert!(anim.evaluate(0.3, base, None).abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-5));
        assert!(anim.evaluate(0.6, base, None).abs_diff_eq(Vec3::new(0.5, 0.0, 0.5), 1e-5));
        assert_eq!(anim.evaluate(0.9, base, None), anim.end);
        assert_eq!(anim.evaluate(0.1, base, Some(base)), base);
    }

    #[test]
    fn test_color_curve_stepped() {
        let anim = ColorAnim {
            start: Vec3::ZERO,
            end: Vec3::ONE,
            curve_in: 0.2,
            peak: 0.4,
            curve_out: 0.8,
            interpolate: false,
            ..ColorAnim::default()
        };
        let base = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(anim.evaluate(0.1, base, None), Vec3::ZERO);
        assert_eq!(anim.evaluate(0.5, base, None), base);
        assert_eq!(anim.evaluate(0.8, base, None), Vec3::ONE);
    }

    #[test]
    fn test_alpha_parse_and_flicker() {
        // start 31, mid 0, end 31; random range 255, looped
        let alpha: u16 = 31 | (31 << 10);
        let flags: u16 = 0xFF | (1 << 8);
        let mut data = Vec::new();
        data.extend_from_slice(&alpha.to_le_bytes());
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&[0, 255, 0, 0]);
        let anim = AlphaAnim::parse(&mut Cursor::new(&data)).unwrap();
        assert_eq!(anim.start, 1.0);
        assert_eq!(anim.mid, 0.0);
        assert_eq!(anim.end, 1.0);
        assert!(anim.looped);
        assert_eq!(anim.random_range, 1.0);
        assert!(approx(anim.flicker(0.8, 0.5), 0.4));
    }

    #[test]
    fn test_tex_anim_frames() {
        let anim = TexAnim {
            textures: [10, 11, 12, 13, 0, 0, 0, 0],
            frame_count: 4,
            step: 51, // 0.2 of life per frame
            randomize_init: false,
            looped: false,
        };
        assert_eq!(anim.texture(0.0, 0), 10);
        assert_eq!(anim.texture(0.45, 0), 12);
        assert_eq!(anim.texture(0.99, 0), 13);
        assert_eq!(anim.texture(0.0, 2), 12);

        let looped = TexAnim { looped: true, ..anim };
        assert_eq!(looped.texture(0.85, 0), 10);
        assert_eq!(looped.texture(0.0, 3), 13);
    }
}
