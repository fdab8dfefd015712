//! Individual particle representation

use glam::Vec3;

use crate::fx::TIME_EPSILON;

/// A single live particle
///
/// Positions are relative to the particle's emitter anchor; the world
/// position is `emitter_position + position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Emitter-relative position
    pub position: Vec3,
    /// Velocity in units per frame
    pub velocity: Vec3,
    /// World position of the emitter this particle is anchored to
    pub emitter_position: Vec3,
    /// Current angle in radians
    pub rotation: f32,
    /// Radians per frame
    pub angular_velocity: f32,
    pub base_scale: f32,
    /// Scale multiplier from the scale curve
    pub anim_scale: f32,
    pub color: Vec3,
    pub base_alpha: f32,
    /// Alpha multiplier from the alpha curve
    pub anim_alpha: f32,
    /// Seconds since spawn
    pub age: f32,
    /// Lifetime in seconds
    pub life_time: f32,
    /// Texture index into the archive
    pub texture: u8,
    pub(crate) loop_offset: f32,
    pub(crate) tex_frame_offset: u8,
    pub(crate) start_color: Option<Vec3>,
    pub(crate) child_accumulator: f32,
    pub(crate) random_impulse: Option<Vec3>,
    pub(crate) random_timer: f32,
    pub(crate) killed: bool,
}

impl Particle {
    /// Create a particle with neutral appearance
    pub fn new(position: Vec3, velocity: Vec3, emitter_position: Vec3, life_time: f32) -> Self {
        Self {
            position,
            velocity,
            emitter_position,
            rotation: 0.0,
            angular_velocity: 0.0,
            base_scale: 1.0,
            anim_scale: 1.0,
            color: Vec3::ONE,
            base_alpha: 1.0,
            anim_alpha: 1.0,
            age: 0.0,
            life_time,
            texture: 0,
            loop_offset: 0.0,
            tex_frame_offset: 0,
            start_color: None,
            child_accumulator: 0.0,
            random_impulse: None,
            random_timer: 0.0,
            killed: false,
        }
    }

    /// Check if the particle is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.killed && self.age + TIME_EPSILON < self.life_time
    }

    /// Age as a fraction of lifetime, clamped to `[0, 1]`
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.life_time > 0.0 {
            (self.age / self.life_time).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Position within a repeating period of `loop_time` seconds, in `[0, 1)`
    pub fn loop_fraction(&self, loop_time: f32) -> f32 {
        if loop_time > 0.0 {
            ((self.age + self.loop_offset) % loop_time) / loop_time
        } else {
            self.life_fraction()
        }
    }

    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.emitter_position + self.position
    }

    /// Final scale before aspect ratio
    #[inline]
    pub fn scale(&self) -> f32 {
        self.base_scale * self.anim_scale
    }

    /// Final opacity
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.base_alpha * self.anim_alpha
    }

    /// Integrate position and angle over `frames` hardware frames
    pub(crate) fn integrate(&mut self, frames: f32) {
        self.position += self.velocity * frames;
        self.rotation += self.angular_velocity * frames;
    }
}
