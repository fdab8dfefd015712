//! Template for particles spawned by other particles.

use std::fmt;

use bitflags::bitflags;
use glam::Vec3;

use super::{DrawType, PolygonRotAxis};
use crate::error::{Result, SplError};
use crate::fx::{ratio, to_seconds};
use crate::reader::{ByteReader, Cursor, bit, bits};
use spl_tex::Rgb555;

bitflags! {
    /// Boolean options of a child resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChildFlags: u16 {
        /// Children are affected by the parent resource's behaviors
        const USES_BEHAVIORS = 1 << 0;
        /// Children scale from 1 to `end_scale` over their life
        const HAS_SCALE_ANIM = 1 << 1;
        /// Children fade out over their life
        const HAS_ALPHA_ANIM = 1 << 2;
        /// Children move with the emitter
        const FOLLOW_EMITTER = 1 << 5;
        /// Children use `color` instead of the parent's color
        const USE_CHILD_COLOR = 1 << 6;
        /// Polygon reference plane is XZ instead of XY
        const POLYGON_REFERENCE_PLANE = 1 << 11;
    }
}

/// How a child's rotation derives from its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChildRotationType {
    /// Start unrotated
    #[default]
    None,
    /// Copy the parent's angle
    InheritAngle,
    /// Copy the parent's angle and angular velocity
    InheritAngleAndVelocity,
}

impl ChildRotationType {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::InheritAngle),
            2 => Some(Self::InheritAngleAndVelocity),
            _ => None,
        }
    }
}

impl fmt::Display for ChildRotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::InheritAngle => "Inherit Angle",
            Self::InheritAngleAndVelocity => "Inherit Angle and Velocity",
        })
    }
}

/// Child particle template
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildResource {
    pub flags: ChildFlags,
    pub rotation_type: ChildRotationType,
    pub draw_type: DrawType,
    pub polygon_rot_axis: PolygonRotAxis,
    /// Magnitude of the random velocity added at spawn
    pub random_init_vel_mag: f32,
    /// Scale reached at the end of life when the scale animation is on
    pub end_scale: f32,
    /// Lifetime in seconds
    pub life_time: f32,
    /// Fraction of the parent's velocity inherited
    pub velocity_ratio: f32,
    /// Fraction of the parent's base scale inherited
    pub scale_ratio: f32,
    pub color: Vec3,
    /// Children spawned per emission
    pub emission_count: u8,
    /// Fraction of the parent's life before the first emission
    pub emission_delay: f32,
    /// Seconds between emissions
    pub emission_interval: f32,
    pub texture: u8,
    pub texture_tile_count_s: u8,
    pub texture_tile_count_t: u8,
    pub flip_texture_s: bool,
    pub flip_texture_t: bool,
    pub dpol_face_emitter: bool,
}

impl ChildResource {
    pub const SIZE: usize = 20;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let raw_flags = cursor.read_u16_le()?;
        let flag_bits = u32::from(raw_flags);
        let random_init_vel_mag = cursor.read_fx16()?;
        let end_scale = cursor.read_fx16()?;
        let life_time = to_seconds(cursor.read_u16_le()?);
        let velocity_ratio = ratio(cursor.read_u8()?);
        let scale_ratio = ratio(cursor.read_u8()?);
        let color = Vec3::from(Rgb555(cursor.read_u16_le()?).to_f32());
        let misc = cursor.read_u32_le()?;
        let texture_misc = cursor.read_u32_le()?;

        let rotation = bits(flag_bits, 3, 2);
        let rotation_type = ChildRotationType::from_raw(rotation).ok_or(SplError::InvalidEnum {
            field: "child rotation type",
            value: rotation,
        })?;
        let draw = bits(flag_bits, 7, 2);
        let draw_type = DrawType::from_raw(draw).ok_or(SplError::InvalidEnum {
            field: "child draw type",
            value: draw,
        })?;
        let axis = bits(flag_bits, 9, 2);
        let polygon_rot_axis = PolygonRotAxis::from_raw(axis).ok_or(SplError::InvalidEnum {
            field: "child polygon rotation axis",
            value: axis,
        })?;

        Ok(Self {
            flags: ChildFlags::from_bits_truncate(raw_flags),
            rotation_type,
            draw_type,
            polygon_rot_axis,
            random_init_vel_mag,
            end_scale,
            life_time,
            velocity_ratio,
            scale_ratio,
            color,
            emission_count: bits(misc, 0, 8) as u8,
            emission_delay: ratio(bits(misc, 8, 8) as u8),
            emission_interval: to_seconds(bits(misc, 16, 8) as u16),
            texture: bits(misc, 24, 8) as u8,
            texture_tile_count_s: bits(texture_misc, 0, 2) as u8,
            texture_tile_count_t: bits(texture_misc, 2, 2) as u8,
            flip_texture_s: bit(texture_misc, 4),
            flip_texture_t: bit(texture_misc, 5),
            dpol_face_emitter: bit(texture_misc, 6),
        })
    }

    /// Scale multiplier at life fraction `t`
    pub fn scale_at(&self, t: f32) -> f32 {
        if self.flags.contains(ChildFlags::HAS_SCALE_ANIM) {
            1.0 + (self.end_scale - 1.0) * t
        } else {
            1.0
        }
    }

    /// Alpha multiplier at life fraction `t`
    pub fn alpha_at(&self, t: f32) -> f32 {
        if self.flags.contains(ChildFlags::HAS_ALPHA_ANIM) {
            1.0 - t
        } else {
            1.0
        }
    }
}

impl Default for ChildResource {
    fn default() -> Self {
        Self {
            flags: ChildFlags::empty(),
            rotation_type: ChildRotationType::None,
            draw_type: DrawType::Billboard,
            polygon_rot_axis: PolygonRotAxis::Y,
            random_init_vel_mag: 0.0,
            end_scale: 1.0,
            life_time: to_seconds(1),
            velocity_ratio: 1.0,
            scale_ratio: 1.0,
            color: Vec3::ONE,
            emission_count: 1,
            emission_delay: 0.0,
            emission_interval: to_seconds(1),
            texture: 0,
            texture_tile_count_s: 0,
            texture_tile_count_t: 0,
            flip_texture_s: false,
            flip_texture_t: false,
            dpol_face_emitter: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_child_fields() {
        let flags: u16 = 1 | (1 << 1) | (2 << 3) | (1 << 6) | (1 << 7);
        let misc: u32 = 3 | (128 << 8) | (6 << 16) | (2 << 24);
        let mut data = Vec::new();
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&0x0800i16.to_le_bytes()); // 0.5
        data.extend_from_slice(&0x2000i16.to_le_bytes()); // 2.0
        data.extend_from_slice(&45u16.to_le_bytes());
        data.extend_from_slice(&[255, 51]);
        data.extend_from_slice(&0x001Fu16.to_le_bytes());
        data.extend_from_slice(&misc.to_le_bytes());
        data.extend_from_slice(&0b11_0101u32.to_le_bytes());

        let child = ChildResource::parse(&mut Cursor::new(&data)).unwrap();
        assert_eq!(
            child.flags,
            ChildFlags::USES_BEHAVIORS | ChildFlags::HAS_SCALE_ANIM | ChildFlags::USE_CHILD_COLOR
        );
        assert_eq!(child.rotation_type, ChildRotationType::InheritAngleAndVelocity);
        assert_eq!(child.draw_type, DrawType::DirectionalBillboard);
        assert_eq!(child.random_init_vel_mag, 0.5);
        assert_eq!(child.end_scale, 2.0);
        assert_eq!(child.life_time, 1.5);
        assert_eq!(child.velocity_ratio, 1.0);
        assert_eq!(child.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(child.emission_count, 3);
        assert_eq!(child.emission_interval, to_seconds(6));
        assert_eq!(child.texture, 2);
        assert_eq!(child.texture_tile_count_s, 1);
        assert_eq!(child.texture_tile_count_t, 1);
        assert!(child.flip_texture_s);
        assert!(child.flip_texture_t);
        assert!(!child.dpol_face_emitter);
    }

    #[test]
    fn test_child_curves() {
        let child = ChildResource {
            flags: ChildFlags::HAS_SCALE_ANIM | ChildFlags::HAS_ALPHA_ANIM,
            end_scale: 3.0,
            ..ChildResource::default()
        };
        assert_eq!(child.scale_at(0.5), 2.0);
        assert_eq!(child.alpha_at(0.25), 0.75);
        assert_eq!(ChildResource::default().scale_at(0.5), 1.0);
    }

    #[test]
    fn test_invalid_rotation_type() {
        let flags: u16 = 3 << 3;
        let mut data = flags.to_le_bytes().to_vec();
        data.resize(ChildResource::SIZE, 0);
        let err = ChildResource::parse(&mut Cursor::new(&data)).unwrap_err();
        assert!(matches!(err, SplError::InvalidEnum { value: 3, .. }));
    }
}
