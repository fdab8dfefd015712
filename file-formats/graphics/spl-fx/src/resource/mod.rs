//! Particle resources, the emitter templates stored in an archive.
//!
//! A resource is an 88-byte header followed by optional blocks whose
//! presence is announced by header flags. Their order is fixed:
//! scale, color, alpha and texture animations, the child resource, then
//! behaviors in [`BehaviorKind::ALL`] order.
//!
//! The `has_*` flags are kept in sync with the attached components by every
//! mutation method on [`ParticleResource`]. [`ParticleResource::validate`]
//! reports any drift introduced through [`ParticleResource::header_mut`].

pub mod anim;
pub mod behavior;
pub mod child;

use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use log::debug;

use crate::error::{Result, SplError};
use crate::fx::{
    angle_to_radians, fx16_to_float, ratio, rotation_to_radians, to_frames, to_seconds,
};
use crate::reader::{ByteReader, Cursor, bit, bits};
use spl_tex::Rgb555;

pub use anim::{AlphaAnim, ColorAnim, ScaleAnim, TexAnim};
pub use behavior::{
    Behavior, BehaviorContext, BehaviorKind, CollisionPlaneBehavior, CollisionType,
    ConvergenceBehavior, GravityBehavior, MagnetBehavior, RandomBehavior, SpinAxis, SpinBehavior,
};
pub use child::{ChildFlags, ChildResource, ChildRotationType};

bitflags! {
    /// Boolean options of a resource header
    ///
    /// The enumerated fields sharing the same word (emission type, draw type,
    /// circle axis, polygon rotation axis) are stored separately in [`ResourceHeader`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ResourceFlags: u32 {
        const HAS_SCALE_ANIM = 1 << 8;
        const HAS_COLOR_ANIM = 1 << 9;
        const HAS_ALPHA_ANIM = 1 << 10;
        const HAS_TEX_ANIM = 1 << 11;
        const HAS_ROTATION = 1 << 12;
        const RANDOM_INIT_ANGLE = 1 << 13;
        /// The emitter removes itself once emission ends and all particles died
        const SELF_MAINTAINING = 1 << 14;
        /// Particles move with the emitter
        const FOLLOW_EMITTER = 1 << 15;
        const HAS_CHILD_RESOURCE = 1 << 16;
        /// Polygon reference plane is XZ instead of XY
        const POLYGON_REFERENCE_PLANE = 1 << 19;
        const RANDOMIZE_LOOPED_ANIM = 1 << 20;
        const DRAW_CHILDREN_FIRST = 1 << 21;
        const HIDE_PARENT = 1 << 22;
        const USE_VIEW_SPACE = 1 << 23;
        const HAS_GRAVITY = 1 << 24;
        const HAS_RANDOM = 1 << 25;
        const HAS_MAGNET = 1 << 26;
        const HAS_SPIN = 1 << 27;
        const HAS_COLLISION_PLANE = 1 << 28;
        const HAS_CONVERGENCE = 1 << 29;
        const HAS_FIXED_POLYGON_ID = 1 << 30;
        const CHILD_HAS_FIXED_POLYGON_ID = 1 << 31;
    }
}

/// Shape particles are spawned on or in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmissionType {
    #[default]
    Point,
    SphereSurface,
    CircleBorder,
    /// Circle border with particles evenly spaced within one emission
    CircleBorderUniform,
    Sphere,
    Circle,
    CylinderSurface,
    Cylinder,
    HemisphereSurface,
    Hemisphere,
}

impl EmissionType {
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Point,
            1 => Self::SphereSurface,
            2 => Self::CircleBorder,
            3 => Self::CircleBorderUniform,
            4 => Self::Sphere,
            5 => Self::Circle,
            6 => Self::CylinderSurface,
            7 => Self::Cylinder,
            8 => Self::HemisphereSurface,
            9 => Self::Hemisphere,
            _ => return None,
        })
    }
}

impl fmt::Display for EmissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Point => "Point",
            Self::SphereSurface => "Sphere Surface",
            Self::CircleBorder => "Circle Border",
            Self::CircleBorderUniform => "Circle Border Uniform",
            Self::Sphere => "Sphere",
            Self::Circle => "Circle",
            Self::CylinderSurface => "Cylinder Surface",
            Self::Cylinder => "Cylinder",
            Self::HemisphereSurface => "Hemisphere Surface",
            Self::Hemisphere => "Hemisphere",
        })
    }
}

/// How particles are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawType {
    #[default]
    Billboard,
    /// Billboard stretched along the velocity
    DirectionalBillboard,
    Polygon,
    DirectionalPolygon,
    DirectionalPolygonCenter,
}

impl DrawType {
    pub fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Billboard,
            1 => Self::DirectionalBillboard,
            2 => Self::Polygon,
            3 => Self::DirectionalPolygon,
            4 => Self::DirectionalPolygonCenter,
            _ => return None,
        })
    }
}

impl fmt::Display for DrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Billboard => "Billboard",
            Self::DirectionalBillboard => "Directional Billboard",
            Self::Polygon => "Polygon",
            Self::DirectionalPolygon => "Directional Polygon",
            Self::DirectionalPolygonCenter => "Directional Polygon (Center)",
        })
    }
}

/// Normal of the plane used by the circle and cylinder shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircleAxis {
    #[default]
    Z,
    Y,
    X,
    /// The resource's own axis
    Emitter,
}

impl CircleAxis {
    pub fn from_raw(value: u32) -> Self {
        match value & 0b11 {
            0 => Self::Z,
            1 => Self::Y,
            2 => Self::X,
            _ => Self::Emitter,
        }
    }
}

impl fmt::Display for CircleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Z => "Z",
            Self::Y => "Y",
            Self::X => "X",
            Self::Emitter => "Emitter",
        })
    }
}

/// Axes a polygon particle rotates around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolygonRotAxis {
    #[default]
    Y,
    XYZ,
}

impl PolygonRotAxis {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Y),
            1 => Some(Self::XYZ),
            _ => None,
        }
    }
}

/// Axes the scale animation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleAnimDir {
    #[default]
    XY,
    X,
    Y,
}

impl ScaleAnimDir {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::XY),
            1 => Some(Self::X),
            2 => Some(Self::Y),
            _ => None,
        }
    }
}

/// Variance applied to per-particle values at spawn, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomAttenuation {
    pub base_scale: f32,
    pub life_time: f32,
    pub init_vel: f32,
}

/// Packed miscellaneous header fields
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMisc {
    /// Seconds between emissions
    pub emission_interval: f32,
    /// Particle opacity in `[0, 1]`
    pub base_alpha: f32,
    /// Velocity factor applied every frame
    pub air_resistance: f32,
    pub texture_index: u8,
    /// Period of looped animations in seconds
    pub loop_time: f32,
    /// Stretch factor of directional billboards
    pub dbb_scale: f32,
    /// Texture repeats along S, as a power of two
    pub texture_tile_count_s: u8,
    /// Texture repeats along T, as a power of two
    pub texture_tile_count_t: u8,
    pub scale_anim_dir: ScaleAnimDir,
    pub dpol_face_emitter: bool,
    pub flip_texture_s: bool,
    pub flip_texture_t: bool,
}

/// Decoded resource header in runtime units
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceHeader {
    pub flags: ResourceFlags,
    pub emission_type: EmissionType,
    pub draw_type: DrawType,
    pub circle_axis: CircleAxis,
    pub polygon_rot_axis: PolygonRotAxis,
    /// Spawn position relative to the emitter
    pub emitter_base_pos: Vec3,
    /// Particles per emission
    pub emission_count: f32,
    pub radius: f32,
    pub length: f32,
    pub axis: Vec3,
    pub color: Vec3,
    /// Outward speed along the spawn direction, per frame
    pub init_vel_pos_amplifier: f32,
    /// Speed along the axis, per frame
    pub init_vel_axis_amplifier: f32,
    pub base_scale: f32,
    pub aspect_ratio: f32,
    /// Seconds before the first emission
    pub start_delay: f32,
    /// Minimum angular velocity, radians per frame
    pub min_rotation: f32,
    /// Maximum angular velocity, radians per frame
    pub max_rotation: f32,
    /// Initial particle angle in radians
    pub init_angle: f32,
    pub reserved: u16,
    /// Seconds of emission, 0 emits forever
    pub emitter_life_time: f32,
    pub particle_life_time: f32,
    pub random_attenuation: RandomAttenuation,
    pub misc: ResourceMisc,
    pub polygon_x: f32,
    pub polygon_y: f32,
    pub user_data: u32,
}

impl ResourceHeader {
    pub const SIZE: usize = 88;

    pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let raw_flags = cursor.read_u32_le()?;
        let emission = bits(raw_flags, 0, 4);
        let emission_type = EmissionType::from_raw(emission).ok_or(SplError::InvalidEnum {
            field: "emission type",
            value: emission,
        })?;
        let draw = bits(raw_flags, 4, 2);
        let draw_type = DrawType::from_raw(draw).ok_or(SplError::InvalidEnum {
            field: "draw type",
            value: draw,
        })?;
        let circle_axis = CircleAxis::from_raw(bits(raw_flags, 6, 2));
        let rot_axis = bits(raw_flags, 17, 2);
        let polygon_rot_axis = PolygonRotAxis::from_raw(rot_axis).ok_or(SplError::InvalidEnum {
            field: "polygon rotation axis",
            value: rot_axis,
        })?;

        let emitter_base_pos = cursor.read_vec_fx32()?;
        let emission_count = cursor.read_fx32()?;
        let radius = cursor.read_fx32()?;
        let length = cursor.read_fx32()?;
        let axis = cursor.read_vec_fx16()?;
        let color = Vec3::from(Rgb555(cursor.read_u16_le()?).to_f32());
        let init_vel_pos_amplifier = cursor.read_fx32()?;
        let init_vel_axis_amplifier = cursor.read_fx32()?;
        let base_scale = cursor.read_fx32()?;
        let aspect_ratio = cursor.read_fx16()?;
        let start_delay = to_seconds(cursor.read_u16_le()?);
        let min_rotation = rotation_to_radians(cursor.read_i16_le()?);
        let max_rotation = rotation_to_radians(cursor.read_i16_le()?);
        let init_angle = angle_to_radians(cursor.read_u16_le()?);
        let reserved = cursor.read_u16_le()?;
        let emitter_life_time = to_seconds(cursor.read_u16_le()?);
        let particle_life_time = to_seconds(cursor.read_u16_le()?);

        let attenuation = cursor.read_u32_le()?;
        let random_attenuation = RandomAttenuation {
            base_scale: ratio(bits(attenuation, 0, 8) as u8),
            life_time: ratio(bits(attenuation, 8, 8) as u8),
            init_vel: ratio(bits(attenuation, 16, 8) as u8),
        };

        let misc0 = cursor.read_u32_le()?;
        let misc1 = cursor.read_u32_le()?;
        let misc2 = cursor.read_u32_le()?;
        let anim_dir = bits(misc1, 28, 3);
        let scale_anim_dir = ScaleAnimDir::from_raw(anim_dir).ok_or(SplError::InvalidEnum {
            field: "scale animation direction",
            value: anim_dir,
        })?;
        let misc = ResourceMisc {
            emission_interval: to_seconds(bits(misc0, 0, 8) as u16),
            base_alpha: (bits(misc0, 8, 8) as f32 / 31.0).min(1.0),
            air_resistance: (bits(misc0, 16, 8) as f32 + 384.0) / 512.0,
            texture_index: bits(misc0, 24, 8) as u8,
            loop_time: to_seconds(bits(misc1, 0, 8) as u16),
            dbb_scale: fx16_to_float(bits(misc1, 8, 16) as u16 as i16),
            texture_tile_count_s: bits(misc1, 24, 2) as u8,
            texture_tile_count_t: bits(misc1, 26, 2) as u8,
            scale_anim_dir,
            dpol_face_emitter: bit(misc1, 31),
            flip_texture_s: bit(misc2, 0),
            flip_texture_t: bit(misc2, 1),
        };

        Ok(Self {
            flags: ResourceFlags::from_bits_truncate(raw_flags),
            emission_type,
            draw_type,
            circle_axis,
            polygon_rot_axis,
            emitter_base_pos,
            emission_count,
            radius,
            length,
            axis,
            color,
            init_vel_pos_amplifier,
            init_vel_axis_amplifier,
            base_scale,
            aspect_ratio,
            start_delay,
            min_rotation,
            max_rotation,
            init_angle,
            reserved,
            emitter_life_time,
            particle_life_time,
            random_attenuation,
            misc,
            polygon_x: cursor.read_fx16()?,
            polygon_y: cursor.read_fx16()?,
            user_data: cursor.read_u32_le()?,
        })
    }

    /// Emission interval in whole frames, at least one
    pub fn emission_interval_frames(&self) -> u16 {
        to_frames(self.misc.emission_interval).max(1)
    }

    /// Number of emission events per emitter cycle, `None` when unbounded
    pub fn emission_budget(&self) -> Option<u32> {
        match to_frames(self.emitter_life_time) {
            0 => None,
            life => Some(u32::from(life).div_ceil(u32::from(self.emission_interval_frames()))),
        }
    }

    pub fn is_self_maintaining(&self) -> bool {
        self.flags.contains(ResourceFlags::SELF_MAINTAINING)
    }
}

/// An emitter template: header plus optional animations, child template and behaviors
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleResource {
    header: ResourceHeader,
    scale_anim: Option<ScaleAnim>,
    color_anim: Option<ColorAnim>,
    alpha_anim: Option<AlphaAnim>,
    tex_anim: Option<TexAnim>,
    child: Option<ChildResource>,
    behaviors: Vec<Behavior>,
}

impl ParticleResource {
    /// Decode one resource record
    pub(crate) fn parse(cursor: &mut Cursor<'_>, index: usize) -> Result<Self> {
        let context = |what: &str| format!("resource {index} {what}");
        let header = ResourceHeader::parse(cursor).map_err(|e| e.with_context(context("header")))?;
        let flags = header.flags;

        let scale_anim = flags
            .contains(ResourceFlags::HAS_SCALE_ANIM)
            .then(|| ScaleAnim::parse(cursor))
            .transpose()
            .map_err(|e| e.with_context(context("scale animation")))?;
        let color_anim = flags
            .contains(ResourceFlags::HAS_COLOR_ANIM)
            .then(|| ColorAnim::parse(cursor))
            .transpose()
            .map_err(|e| e.with_context(context("color animation")))?;
        let alpha_anim = flags
            .contains(ResourceFlags::HAS_ALPHA_ANIM)
            .then(|| AlphaAnim::parse(cursor))
            .transpose()
            .map_err(|e| e.with_context(context("alpha animation")))?;
        let tex_anim = flags
            .contains(ResourceFlags::HAS_TEX_ANIM)
            .then(|| TexAnim::parse(cursor))
            .transpose()
            .map_err(|e| e.with_context(context("texture animation")))?;
        let child = flags
            .contains(ResourceFlags::HAS_CHILD_RESOURCE)
            .then(|| ChildResource::parse(cursor))
            .transpose()
            .map_err(|e| e.with_context(context("child resource")))?;

        let mut behaviors = Vec::new();
        for kind in BehaviorKind::ALL {
            if flags.contains(kind.flag()) {
                let behavior = Behavior::parse(kind, cursor)
                    .map_err(|e| e.with_context(context(&format!("{kind} behavior"))))?;
                behaviors.push(behavior);
            }
        }

        debug!(
            "Resource {}: {} emission, {} behaviors, child: {}",
            index,
            header.emission_type,
            behaviors.len(),
            child.is_some()
        );

        Ok(Self {
            header,
            scale_anim,
            color_anim,
            alpha_anim,
            tex_anim,
            child,
            behaviors,
        })
    }

    /// A minimal resource: point emission, one particle per frame for one second
    pub fn blank() -> Self {
        let one_second = 1.0;
        Self {
            header: ResourceHeader {
                flags: ResourceFlags::SELF_MAINTAINING,
                emission_type: EmissionType::Point,
                draw_type: DrawType::Billboard,
                circle_axis: CircleAxis::Z,
                polygon_rot_axis: PolygonRotAxis::Y,
                emitter_base_pos: Vec3::ZERO,
                emission_count: 1.0,
                radius: 0.0,
                length: 0.0,
                axis: Vec3::Y,
                color: Vec3::ONE,
                init_vel_pos_amplifier: 0.0,
                init_vel_axis_amplifier: 0.0,
                base_scale: 1.0,
                aspect_ratio: 1.0,
                start_delay: 0.0,
                min_rotation: 0.0,
                max_rotation: 0.0,
                init_angle: 0.0,
                reserved: 0,
                emitter_life_time: one_second,
                particle_life_time: one_second,
                random_attenuation: RandomAttenuation::default(),
                misc: ResourceMisc {
                    emission_interval: to_seconds(1),
                    base_alpha: 1.0,
                    air_resistance: 1.0,
                    texture_index: 0,
                    loop_time: 0.0,
                    dbb_scale: 0.0,
                    texture_tile_count_s: 0,
                    texture_tile_count_t: 0,
                    scale_anim_dir: ScaleAnimDir::XY,
                    dpol_face_emitter: false,
                    flip_texture_s: false,
                    flip_texture_t: false,
                },
                polygon_x: 0.0,
                polygon_y: 0.0,
                user_data: 0,
            },
            scale_anim: None,
            color_anim: None,
            alpha_anim: None,
            tex_anim: None,
            child: None,
            behaviors: Vec::new(),
        }
    }

    pub fn header(&self) -> &ResourceHeader {
        &self.header
    }

    /// Mutable header access
    ///
    /// Component flags changed here are not synchronized; use the setters instead.
    pub fn header_mut(&mut self) -> &mut ResourceHeader {
        &mut self.header
    }

    pub fn scale_anim(&self) -> Option<&ScaleAnim> {
        self.scale_anim.as_ref()
    }

    pub fn color_anim(&self) -> Option<&ColorAnim> {
        self.color_anim.as_ref()
    }

    pub fn alpha_anim(&self) -> Option<&AlphaAnim> {
        self.alpha_anim.as_ref()
    }

    pub fn tex_anim(&self) -> Option<&TexAnim> {
        self.tex_anim.as_ref()
    }

    pub fn child_resource(&self) -> Option<&ChildResource> {
        self.child.as_ref()
    }

    /// Attached behaviors in application order
    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn behavior(&self, kind: BehaviorKind) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.kind() == kind)
    }

    pub fn set_scale_anim(&mut self, anim: Option<ScaleAnim>) {
        self.header
            .flags
            .set(ResourceFlags::HAS_SCALE_ANIM, anim.is_some());
        self.scale_anim = anim;
    }

    pub fn set_color_anim(&mut self, anim: Option<ColorAnim>) {
        self.header
            .flags
            .set(ResourceFlags::HAS_COLOR_ANIM, anim.is_some());
        self.color_anim = anim;
    }

    pub fn set_alpha_anim(&mut self, anim: Option<AlphaAnim>) {
        self.header
            .flags
            .set(ResourceFlags::HAS_ALPHA_ANIM, anim.is_some());
        self.alpha_anim = anim;
    }

    pub fn set_tex_anim(&mut self, anim: Option<TexAnim>) {
        self.header
            .flags
            .set(ResourceFlags::HAS_TEX_ANIM, anim.is_some());
        self.tex_anim = anim;
    }

    pub fn set_child_resource(&mut self, child: Option<ChildResource>) {
        self.header
            .flags
            .set(ResourceFlags::HAS_CHILD_RESOURCE, child.is_some());
        self.child = child;
    }

    /// Attach a behavior, replacing any existing one of the same kind
    pub fn add_behavior(&mut self, behavior: Behavior) {
        let kind = behavior.kind();
        match self.behaviors.binary_search_by_key(&kind, Behavior::kind) {
            Ok(pos) => self.behaviors[pos] = behavior,
            Err(pos) => self.behaviors.insert(pos, behavior),
        }
        self.header.flags.insert(kind.flag());
    }

    /// Detach the behavior of `kind`, returning it if present
    pub fn remove_behavior(&mut self, kind: BehaviorKind) -> Option<Behavior> {
        self.header.flags.remove(kind.flag());
        let pos = self.behaviors.iter().position(|b| b.kind() == kind)?;
        Some(self.behaviors.remove(pos))
    }

    /// Every texture index this resource refers to
    pub fn texture_references(&self) -> Vec<u8> {
        let mut indices = vec![self.header.misc.texture_index];
        if let Some(tex_anim) = &self.tex_anim {
            indices.extend_from_slice(tex_anim.frames());
        }
        if let Some(child) = &self.child {
            indices.push(child.texture);
        }
        indices
    }

    /// Check flag consistency and texture references against `texture_count`
    pub fn validate(&self, index: usize, texture_count: usize) -> Result<()> {
        let flags = self.header.flags;
        let components = [
            ("scale animation", ResourceFlags::HAS_SCALE_ANIM, self.scale_anim.is_some()),
            ("color animation", ResourceFlags::HAS_COLOR_ANIM, self.color_anim.is_some()),
            ("alpha animation", ResourceFlags::HAS_ALPHA_ANIM, self.alpha_anim.is_some()),
            ("texture animation", ResourceFlags::HAS_TEX_ANIM, self.tex_anim.is_some()),
            ("child resource", ResourceFlags::HAS_CHILD_RESOURCE, self.child.is_some()),
        ];
        for (name, flag, present) in components {
            if flags.contains(flag) != present {
                return Err(SplError::InvariantViolation(format!(
                    "resource {index}: {name} flag is {} but the component is {}",
                    flags.contains(flag),
                    if present { "present" } else { "missing" }
                )));
            }
        }
        for kind in BehaviorKind::ALL {
            if flags.contains(kind.flag()) != self.behavior(kind).is_some() {
                return Err(SplError::InvariantViolation(format!(
                    "resource {index}: {kind} behavior flag disagrees with the behavior list"
                )));
            }
        }
        if !self.behaviors.is_sorted_by_key(Behavior::kind) {
            return Err(SplError::InvariantViolation(format!(
                "resource {index}: behaviors are out of order"
            )));
        }
        if let Some(tex_anim) = &self.tex_anim
            && usize::from(tex_anim.frame_count) > anim::TEX_ANIM_SLOTS
        {
            return Err(SplError::InvalidEnum {
                field: "texture animation frame count",
                value: u32::from(tex_anim.frame_count),
            });
        }
        for texture in self.texture_references() {
            if usize::from(texture) >= texture_count {
                return Err(SplError::TextureIndexOutOfRange {
                    resource: index,
                    index: usize::from(texture),
                    count: texture_count,
                });
            }
        }
        Ok(())
    }

    /// Upper bound on simultaneously live parent particles
    pub fn estimated_max_particles(&self) -> usize {
        let per_emission = self.header.emission_count.max(0.0) as usize;
        let interval = f32::from(self.header.emission_interval_frames());
        let life = f32::from(to_frames(self.header.particle_life_time));
        let overlapping = (life / interval).ceil().max(1.0) as usize;
        let overlapping = match self.header.emission_budget() {
            Some(budget) => overlapping.min(budget as usize).max(1),
            None => overlapping,
        };
        per_emission * overlapping
    }
}
