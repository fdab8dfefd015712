//! Per-frame physics modifiers attached to a resource.
//!
//! Behaviors are stored and applied in a fixed order: gravity, random,
//! magnet, spin, collision plane, convergence. All magnitudes are per
//! hardware frame and get scaled by the number of frames in a step.

use std::fmt;

use glam::{Quat, Vec3};

use super::ResourceFlags;
use crate::error::{Result, SplError};
use crate::fx::{angle_to_radians, to_seconds};
use crate::particles::Particle;
use crate::random::SplRandom;
use crate::reader::{ByteReader, Cursor, bits};

/// Constant acceleration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GravityBehavior {
    pub magnitude: Vec3,
}

/// Random impulse, redrawn every `apply_interval` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomBehavior {
    pub magnitude: Vec3,
    pub apply_interval: f32,
}

/// Pulls velocity toward an emitter-relative target
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagnetBehavior {
    pub target: Vec3,
    pub force: f32,
}

/// Rotates particles around the emitter
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpinBehavior {
    /// Radians per frame
    pub angle: f32,
    pub axis: SpinAxis,
}

/// Horizontal plane that kills or bounces particles crossing it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionPlaneBehavior {
    /// World-space height of the plane
    pub y: f32,
    pub elasticity: f32,
    pub collision_type: CollisionType,
}

/// Pulls position toward an emitter-relative target
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvergenceBehavior {
    pub target: Vec3,
    pub force: f32,
}

/// Axis for [`SpinBehavior`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpinAxis {
    X,
    #[default]
    Y,
    Z,
}

impl SpinAxis {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    pub fn vector(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// What happens when a particle crosses a collision plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionType {
    #[default]
    Kill,
    Bounce,
}

impl CollisionType {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Kill),
            1 => Some(Self::Bounce),
            _ => None,
        }
    }
}

/// Discriminant of [`Behavior`], in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorKind {
    Gravity,
    Random,
    Magnet,
    Spin,
    CollisionPlane,
    Convergence,
}

impl BehaviorKind {
    /// Every kind, in on-disk and application order
    pub const ALL: [Self; 6] = [
        Self::Gravity,
        Self::Random,
        Self::Magnet,
        Self::Spin,
        Self::CollisionPlane,
        Self::Convergence,
    ];

    /// Resource flag announcing this behavior
    pub fn flag(self) -> ResourceFlags {
        match self {
            Self::Gravity => ResourceFlags::HAS_GRAVITY,
            Self::Random => ResourceFlags::HAS_RANDOM,
            Self::Magnet => ResourceFlags::HAS_MAGNET,
            Self::Spin => ResourceFlags::HAS_SPIN,
            Self::CollisionPlane => ResourceFlags::HAS_COLLISION_PLANE,
            Self::Convergence => ResourceFlags::HAS_CONVERGENCE,
        }
    }

    /// Encoded size in bytes
    pub fn size(self) -> usize {
        match self {
            Self::Gravity | Self::Random | Self::CollisionPlane => 8,
            Self::Magnet | Self::Convergence => 16,
            Self::Spin => 4,
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gravity => "Gravity",
            Self::Random => "Random",
            Self::Magnet => "Magnet",
            Self::Spin => "Spin",
            Self::CollisionPlane => "Collision Plane",
            Self::Convergence => "Convergence",
        })
    }
}

/// A behavior with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Behavior {
    Gravity(GravityBehavior),
    Random(RandomBehavior),
    Magnet(MagnetBehavior),
    Spin(SpinBehavior),
    CollisionPlane(CollisionPlaneBehavior),
    Convergence(ConvergenceBehavior),
}

/// Emitter state a behavior may read
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext {
    /// Step length in seconds
    pub delta: f32,
    /// Step length in hardware frames
    pub frames: f32,
    /// World position of the emitter
    pub emitter_position: Vec3,
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Gravity(_) => BehaviorKind::Gravity,
            Self::Random(_) => BehaviorKind::Random,
            Self::Magnet(_) => BehaviorKind::Magnet,
            Self::Spin(_) => BehaviorKind::Spin,
            Self::CollisionPlane(_) => BehaviorKind::CollisionPlane,
            Self::Convergence(_) => BehaviorKind::Convergence,
        }
    }

    /// A behavior of `kind` with neutral parameters
    pub fn default_for(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Gravity => Self::Gravity(GravityBehavior {
                magnitude: Vec3::ZERO,
            }),
            BehaviorKind::Random => Self::Random(RandomBehavior {
                magnitude: Vec3::ZERO,
                apply_interval: to_seconds(1),
            }),
            BehaviorKind::Magnet => Self::Magnet(MagnetBehavior {
                target: Vec3::ZERO,
                force: 0.0,
            }),
            BehaviorKind::Spin => Self::Spin(SpinBehavior {
                angle: 0.0,
                axis: SpinAxis::Y,
            }),
            BehaviorKind::CollisionPlane => Self::CollisionPlane(CollisionPlaneBehavior {
                y: 0.0,
                elasticity: 0.0,
                collision_type: CollisionType::Kill,
            }),
            BehaviorKind::Convergence => Self::Convergence(ConvergenceBehavior {
                target: Vec3::ZERO,
                force: 0.0,
            }),
        }
    }

    pub(crate) fn parse(kind: BehaviorKind, cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(match kind {
            BehaviorKind::Gravity => {
                let magnitude = cursor.read_vec_fx16()?;
                cursor.skip(2)?;
                Self::Gravity(GravityBehavior { magnitude })
            }
            BehaviorKind::Random => Self::Random(RandomBehavior {
                magnitude: cursor.read_vec_fx16()?,
                apply_interval: to_seconds(cursor.read_u16_le()?),
            }),
            BehaviorKind::Magnet => {
                let target = cursor.read_vec_fx32()?;
                let force = cursor.read_fx16()?;
                cursor.skip(2)?;
                Self::Magnet(MagnetBehavior { target, force })
            }
            BehaviorKind::Spin => {
                let angle = angle_to_radians(cursor.read_u16_le()?);
                let raw = u32::from(cursor.read_u16_le()?);
                let axis = SpinAxis::from_raw(raw).ok_or(SplError::InvalidEnum {
                    field: "spin axis",
                    value: raw,
                })?;
                Self::Spin(SpinBehavior { angle, axis })
            }
            BehaviorKind::CollisionPlane => {
                let y = cursor.read_fx32()?;
                let elasticity = cursor.read_fx16()?;
                let raw = bits(u32::from(cursor.read_u16_le()?), 0, 2);
                let collision_type = CollisionType::from_raw(raw).ok_or(SplError::InvalidEnum {
                    field: "collision type",
                    value: raw,
                })?;
                Self::CollisionPlane(CollisionPlaneBehavior {
                    y,
                    elasticity,
                    collision_type,
                })
            }
            BehaviorKind::Convergence => {
                let target = cursor.read_vec_fx32()?;
                let force = cursor.read_fx16()?;
                cursor.skip(2)?;
                Self::Convergence(ConvergenceBehavior { target, force })
            }
        })
    }

    /// Apply this behavior to one particle for one step
    pub fn apply(&self, particle: &mut Particle, ctx: &BehaviorContext, rng: &mut SplRandom) {
        match self {
            Self::Gravity(gravity) => {
                particle.velocity += gravity.magnitude * ctx.frames;
            }
            Self::Random(random) => {
                let due = particle.random_timer >= random.apply_interval;
                if particle.random_impulse.is_none() || due {
                    particle.random_impulse = Some(rng.around_zero_vec(random.magnitude));
                    if due && random.apply_interval > 0.0 {
                        particle.random_timer -= random.apply_interval;
                    } else {
                        particle.random_timer = 0.0;
                    }
                }
                if let Some(impulse) = particle.random_impulse {
                    particle.velocity += impulse * ctx.frames;
                }
                particle.random_timer += ctx.delta;
            }
            Self::Magnet(magnet) => {
                particle.velocity += (magnet.target - particle.position) * magnet.force * ctx.frames;
            }
            Self::Spin(spin) => {
                let rotation = Quat::from_axis_angle(spin.axis.vector(), spin.angle * ctx.frames);
                particle.position = rotation * particle.position;
                particle.velocity = rotation * particle.velocity;
            }
            Self::CollisionPlane(plane) => {
                let world_y = particle.emitter_position.y + particle.position.y;
                let above = ctx.emitter_position.y >= plane.y;
                let crossed = if above { world_y < plane.y } else { world_y > plane.y };
                if crossed {
                    match plane.collision_type {
                        CollisionType::Kill => particle.killed = true,
                        CollisionType::Bounce => {
                            particle.position.y = plane.y - particle.emitter_position.y;
                            particle.velocity.y = -particle.velocity.y * plane.elasticity;
                        }
                    }
                }
            }
            Self::Convergence(convergence) => {
                let amount = (convergence.force * ctx.frames).clamp(0.0, 1.0);
                particle.position += (convergence.target - particle.position) * amount;
            }
        }
    }
}
