//! Spawn position sampling for the emission shapes

use std::f32::consts::TAU;

use glam::Vec3;

use crate::random::SplRandom;
use crate::resource::{CircleAxis, EmissionType};

/// Orthonormal frame of the circle and cylinder shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionAxes {
    /// First in-plane axis
    pub cross1: Vec3,
    /// Second in-plane axis
    pub cross2: Vec3,
    /// Plane normal, `cross1 × cross2`
    pub normal: Vec3,
}

impl EmissionAxes {
    /// Axes for `circle_axis`; `axis` is only used by [`CircleAxis::Emitter`]
    pub fn new(circle_axis: CircleAxis, axis: Vec3) -> Self {
        let (cross1, cross2) = match circle_axis {
            CircleAxis::Z => (Vec3::X, Vec3::Y),
            CircleAxis::Y => (Vec3::Z, Vec3::X),
            CircleAxis::X => (Vec3::Y, Vec3::Z),
            CircleAxis::Emitter => axis.normalize_or(Vec3::Y).any_orthonormal_pair(),
        };
        Self {
            cross1,
            cross2,
            normal: cross1.cross(cross2),
        }
    }

    fn in_plane(&self, v: Vec3) -> Vec3 {
        self.cross1 * v.x + self.cross2 * v.y
    }
}

/// Shape parameters of one emission
#[derive(Debug, Clone, Copy)]
pub struct ShapeParams {
    pub emission_type: EmissionType,
    pub radius: f32,
    pub length: f32,
    /// Index of the particle within its emission
    pub index: u32,
    /// Particles in this emission
    pub count: u32,
}

/// Sample an emitter-relative spawn position
pub fn sample_position(shape: &ShapeParams, axes: &EmissionAxes, rng: &mut SplRandom) -> Vec3 {
    let radius = shape.radius;
    match shape.emission_type {
        EmissionType::Point => Vec3::ZERO,
        EmissionType::SphereSurface => rng.unit_vector() * radius,
        EmissionType::Sphere => rng.unit_vector() * radius * rng.next_f32(),
        EmissionType::CircleBorder => axes.in_plane(rng.unit_xy()) * radius,
        EmissionType::CircleBorderUniform => {
            let angle = TAU * shape.index as f32 / shape.count.max(1) as f32;
            (axes.cross1 * angle.cos() + axes.cross2 * angle.sin()) * radius
        }
        EmissionType::Circle => axes.in_plane(rng.unit_xy()) * radius * rng.next_f32(),
        EmissionType::CylinderSurface => {
            let ring = axes.in_plane(rng.unit_xy()) * radius;
            ring + axes.normal * rng.around_zero(shape.length / 2.0)
        }
        EmissionType::Cylinder => {
            let disc = axes.in_plane(rng.unit_xy()) * radius * rng.next_f32();
            disc + axes.normal * rng.around_zero(shape.length / 2.0)
        }
        EmissionType::HemisphereSurface => hemisphere(rng.unit_vector(), axes.normal) * radius,
        EmissionType::Hemisphere => {
            hemisphere(rng.unit_vector(), axes.normal) * radius * rng.next_f32()
        }
    }
}

/// Reflect `v` into the half-space `normal` points to
fn hemisphere(v: Vec3, normal: Vec3) -> Vec3 {
    let d = v.dot(normal);
    if d < 0.0 { v - normal * (2.0 * d) } else { v }
}
