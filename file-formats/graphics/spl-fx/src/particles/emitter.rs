//! Emitter runtime state

use std::f32::consts::TAU;

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use log::trace;

use super::emission::{EmissionAxes, ShapeParams, sample_position};
use super::particle::Particle;
use crate::fx::{TIME_EPSILON, frames_in, to_seconds};
use crate::random::SplRandom;
use crate::resource::{
    Behavior, BehaviorContext, ChildFlags, ChildResource, ChildRotationType, DrawType,
    ParticleResource, ResourceFlags, ResourceHeader, ScaleAnimDir,
};

bitflags! {
    /// Runtime state flags of an emitter
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EmitterFlags: u8 {
        /// Stop emitting and terminate once all particles are gone
        const TERMINATE = 1 << 0;
        /// Suspend new spawns; live particles keep aging
        const EMISSION_PAUSED = 1 << 1;
        /// Suspend all advancement
        const PAUSED = 1 << 2;
        /// Produce no render instances
        const RENDERING_DISABLED = 1 << 3;
        /// The start delay has elapsed
        const STARTED = 1 << 4;
    }
}

/// Lifecycle of an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// Waiting for the start delay
    Delayed,
    /// Spawning particles
    Emitting,
    /// Emission finished, waiting for live particles to die
    Aging,
    /// Ready for removal
    Terminated,
}

/// Per-instance copies of the resource fields that drive emission
///
/// Filled from the resource when the emitter spawns; edits only affect
/// this emitter.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterParams {
    pub axis: Vec3,
    pub init_angle: f32,
    pub emission_count: f32,
    pub radius: f32,
    pub length: f32,
    pub init_vel_pos_amplifier: f32,
    pub init_vel_axis_amplifier: f32,
    pub base_scale: f32,
    pub particle_life_time: f32,
    pub color: Vec3,
    pub base_alpha: f32,
    /// Seconds between emissions, at least one frame
    pub emission_interval: f32,
}

impl From<&ResourceHeader> for EmitterParams {
    fn from(header: &ResourceHeader) -> Self {
        Self {
            axis: header.axis,
            init_angle: header.init_angle,
            emission_count: header.emission_count,
            radius: header.radius,
            length: header.length,
            init_vel_pos_amplifier: header.init_vel_pos_amplifier,
            init_vel_axis_amplifier: header.init_vel_axis_amplifier,
            base_scale: header.base_scale,
            particle_life_time: header.particle_life_time,
            color: header.color,
            base_alpha: header.misc.base_alpha,
            emission_interval: to_seconds(header.emission_interval_frames()),
        }
    }
}

/// Renderable snapshot of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleInstance {
    /// World position
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: f32,
    pub scale: Vec2,
    pub color: Vec3,
    pub alpha: f32,
    pub texture: u8,
    pub draw_type: DrawType,
    pub is_child: bool,
}

/// A running instance of a particle resource
#[derive(Debug, Clone)]
pub struct Emitter {
    resource: usize,
    /// World position
    pub position: Vec3,
    /// Units per frame
    pub velocity: Vec3,
    /// Added to the initial velocity of every spawned particle
    pub particle_init_velocity: Vec3,
    pub params: EmitterParams,
    pub flags: EmitterFlags,
    state: EmitterState,
    looped: bool,
    age: f32,
    start_delay: f32,
    life_time: f32,
    emission_time: f32,
    accumulator: f32,
    budget: Option<u32>,
    cycle_emissions: u32,
    total_emissions: u32,
    axes: EmissionAxes,
    max_particles: usize,
    particles: Vec<Particle>,
    children: Vec<Particle>,
}

impl Emitter {
    /// Create an emitter for `resource`, stored at `index` in its archive
    pub fn new(
        index: usize,
        resource: &ParticleResource,
        position: Vec3,
        looped: bool,
        max_particles: usize,
    ) -> Self {
        let header = resource.header();
        let params = EmitterParams::from(header);
        let axes = EmissionAxes::new(header.circle_axis, params.axis);
        let budget = header.emission_budget();
        let capacity = resource.estimated_max_particles().min(max_particles);

        Self {
            resource: index,
            position,
            velocity: Vec3::ZERO,
            particle_init_velocity: Vec3::ZERO,
            accumulator: params.emission_interval,
            params,
            flags: EmitterFlags::empty(),
            state: EmitterState::Delayed,
            looped,
            age: 0.0,
            start_delay: header.start_delay,
            life_time: header.emitter_life_time,
            emission_time: 0.0,
            budget,
            cycle_emissions: 0,
            total_emissions: 0,
            axes,
            max_particles,
            particles: Vec::with_capacity(capacity),
            children: Vec::new(),
        }
    }

    /// Index of the resource in the archive
    pub fn resource_index(&self) -> usize {
        self.resource
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Seconds since spawn, excluding paused steps
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Emission events since spawn
    pub fn emission_count(&self) -> u32 {
        self.total_emissions
    }

    /// Emission events left in the current cycle, `None` when unbounded
    pub fn remaining_budget(&self) -> Option<u32> {
        self.budget
            .map(|budget| budget.saturating_sub(self.cycle_emissions))
    }

    pub fn axes(&self) -> &EmissionAxes {
        &self.axes
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn children(&self) -> &[Particle] {
        &self.children
    }

    /// Live parent and child particles
    pub fn particle_count(&self) -> usize {
        self.particles.len() + self.children.len()
    }

    pub fn is_terminated(&self) -> bool {
        self.state == EmitterState::Terminated
    }

    /// Stop emitting; the emitter terminates once its particles are gone
    pub fn stop(&mut self) {
        self.flags.insert(EmitterFlags::TERMINATE);
    }

    /// Advance by `delta` seconds
    ///
    /// Live particles are updated before new ones spawn, so a particle is
    /// first aged on the step after the one that created it.
    pub fn update(&mut self, resource: &ParticleResource, delta: f32, rng: &mut SplRandom) {
        if self.state == EmitterState::Terminated || self.flags.contains(EmitterFlags::PAUSED) {
            return;
        }

        let frames = frames_in(delta);
        self.age += delta;
        self.position += self.velocity * frames;

        self.update_children(resource, delta, frames, rng);
        self.update_particles(resource, delta, frames, rng);

        if self.flags.contains(EmitterFlags::TERMINATE)
            && matches!(self.state, EmitterState::Delayed | EmitterState::Emitting)
        {
            trace!("Emitter for resource {} stopped", self.resource);
            self.state = EmitterState::Aging;
        }

        match self.state {
            EmitterState::Delayed => {
                if self.age >= self.start_delay {
                    self.flags.insert(EmitterFlags::STARTED);
                    self.state = EmitterState::Emitting;
                    let active = (self.age - self.start_delay).min(delta);
                    self.emit_step(resource, active, rng);
                }
            }
            EmitterState::Emitting => self.emit_step(resource, delta, rng),
            EmitterState::Aging => self.emission_time += delta,
            EmitterState::Terminated => {}
        }

        if self.state == EmitterState::Aging && self.particle_count() == 0 {
            let expired = self.emission_time + TIME_EPSILON >= self.life_time;
            let terminate = self.flags.contains(EmitterFlags::TERMINATE)
                || (!self.looped && resource.header().is_self_maintaining() && expired);
            if terminate {
                trace!(
                    "Emitter for resource {} terminated at {:.3}s",
                    self.resource, self.age
                );
                self.state = EmitterState::Terminated;
            }
        }
    }

    /// Run emissions due at the start of the step, then accumulate `step`
    fn emit_step(&mut self, resource: &ParticleResource, step: f32, rng: &mut SplRandom) {
        if self.looped && self.life_time > 0.0 && self.emission_time + TIME_EPSILON >= self.life_time
        {
            self.emission_time -= self.life_time;
            self.cycle_emissions = 0;
        }

        if !self.flags.contains(EmitterFlags::EMISSION_PAUSED) {
            let interval = self.params.emission_interval;
            while self.accumulator + TIME_EPSILON >= interval
                && self.budget.is_none_or(|budget| self.cycle_emissions < budget)
            {
                self.accumulator -= interval;
                self.emit(resource, rng);
                self.cycle_emissions += 1;
                self.total_emissions += 1;
            }
            self.accumulator += step;
        }
        self.emission_time += step;

        if !self.looped
            && self
                .budget
                .is_some_and(|budget| self.cycle_emissions >= budget)
        {
            trace!(
                "Emitter for resource {} exhausted its budget after {} emissions",
                self.resource, self.total_emissions
            );
            self.state = EmitterState::Aging;
        }
    }

    /// Spawn one emission's worth of particles
    pub fn emit(&mut self, resource: &ParticleResource, rng: &mut SplRandom) {
        let count = self.params.emission_count.max(0.0) as u32;
        trace!(
            "Emitter for resource {} emits {} particles at {:.3}s",
            self.resource, count, self.age
        );
        for index in 0..count {
            if self.particle_count() >= self.max_particles {
                trace!("Particle limit {} reached, spawn dropped", self.max_particles);
                break;
            }
            let particle = self.spawn_particle(resource, index, count, rng);
            self.particles.push(particle);
        }
    }

    fn spawn_particle(
        &self,
        resource: &ParticleResource,
        index: u32,
        count: u32,
        rng: &mut SplRandom,
    ) -> Particle {
        let header = resource.header();
        let params = &self.params;
        let attenuation = header.random_attenuation;

        let shape = ShapeParams {
            emission_type: header.emission_type,
            radius: params.radius,
            length: params.length,
            index,
            count,
        };
        let local = sample_position(&shape, &self.axes, rng);
        let direction = if local == Vec3::ZERO {
            rng.unit_vector()
        } else {
            local.normalize()
        };

        let pos_speed = attenuated(rng, params.init_vel_pos_amplifier, attenuation.init_vel);
        let axis_speed = attenuated(rng, params.init_vel_axis_amplifier, attenuation.init_vel);
        let velocity =
            direction * pos_speed + params.axis * axis_speed + self.particle_init_velocity;

        let base_scale = attenuated(rng, params.base_scale, attenuation.base_scale);
        let life_time = attenuated(rng, params.particle_life_time, attenuation.life_time);

        let mut particle = Particle::new(
            local + header.emitter_base_pos,
            velocity,
            self.position,
            life_time,
        );
        particle.base_scale = base_scale;
        particle.base_alpha = params.base_alpha;
        particle.color = params.color;
        particle.texture = header.misc.texture_index;

        particle.rotation = if header.flags.contains(ResourceFlags::RANDOM_INIT_ANGLE) {
            rng.next_f32() * TAU
        } else {
            params.init_angle
        };
        if header.flags.contains(ResourceFlags::HAS_ROTATION) {
            particle.angular_velocity = rng.range(header.min_rotation, header.max_rotation);
        }

        let loop_time = header.misc.loop_time;
        if header.flags.contains(ResourceFlags::RANDOMIZE_LOOPED_ANIM) && loop_time > 0.0 {
            particle.loop_offset = unit_hash(rng) * loop_time;
        }
        if let Some(tex) = resource.tex_anim()
            && tex.randomize_init
            && tex.frame_count > 0
        {
            particle.tex_frame_offset = (rng.crc_hash() % u32::from(tex.frame_count)) as u8;
        }
        if let Some(color) = resource.color_anim()
            && color.random_start_color
        {
            particle.start_color = Some(match rng.crc_hash() % 3 {
                0 => color.start,
                1 => params.color,
                _ => color.end,
            });
        }
        if let Some(child) = resource.child_resource() {
            particle.child_accumulator = child_interval(child);
        }

        animate(&mut particle, resource, params.color, None);
        particle
    }

    fn update_particles(
        &mut self,
        resource: &ParticleResource,
        delta: f32,
        frames: f32,
        rng: &mut SplRandom,
    ) {
        let header = resource.header();
        let follow = header.flags.contains(ResourceFlags::FOLLOW_EMITTER);
        let drag = header.misc.air_resistance.powf(frames);
        let ctx = BehaviorContext {
            delta,
            frames,
            emitter_position: self.position,
        };
        let base_color = self.params.color;
        let emitter_position = self.position;
        let mut room = self.max_particles.saturating_sub(self.particle_count());
        let mut spawned = Vec::new();

        self.particles.retain_mut(|particle| {
            particle.age += delta;
            if !particle.is_alive() {
                return false;
            }
            if follow {
                particle.emitter_position = emitter_position;
            }

            particle.velocity *= drag;
            for behavior in resource.behaviors() {
                behavior.apply(particle, &ctx, rng);
            }
            if particle.killed {
                return false;
            }
            particle.integrate(frames);

            let flicker = match resource.alpha_anim() {
                Some(alpha) if alpha.random_range > 0.0 => Some(rng.next_f32()),
                _ => None,
            };
            animate(particle, resource, base_color, flicker);

            if let Some(child) = resource.child_resource() {
                emit_children(particle, child, delta, &mut room, &mut spawned, rng);
            }
            true
        });

        self.children.append(&mut spawned);
    }

    fn update_children(
        &mut self,
        resource: &ParticleResource,
        delta: f32,
        frames: f32,
        rng: &mut SplRandom,
    ) {
        let Some(child) = resource.child_resource() else {
            self.children.clear();
            return;
        };
        let follow = child.flags.contains(ChildFlags::FOLLOW_EMITTER);
        let behaviors: &[Behavior] = if child.flags.contains(ChildFlags::USES_BEHAVIORS) {
            resource.behaviors()
        } else {
            &[]
        };
        let drag = resource.header().misc.air_resistance.powf(frames);
        let ctx = BehaviorContext {
            delta,
            frames,
            emitter_position: self.position,
        };
        let emitter_position = self.position;

        self.children.retain_mut(|particle| {
            particle.age += delta;
            if !particle.is_alive() {
                return false;
            }
            if follow {
                particle.emitter_position = emitter_position;
            }

            particle.velocity *= drag;
            for behavior in behaviors {
                behavior.apply(particle, &ctx, rng);
            }
            if particle.killed {
                return false;
            }
            particle.integrate(frames);

            let t = particle.life_fraction();
            particle.anim_scale = child.scale_at(t);
            particle.anim_alpha = child.alpha_at(t);
            true
        });
    }

    /// Render snapshots in draw order
    pub fn instances(&self, resource: &ParticleResource) -> Vec<ParticleInstance> {
        if self.flags.contains(EmitterFlags::RENDERING_DISABLED) {
            return Vec::new();
        }
        let header = resource.header();
        let aspect = header.aspect_ratio;
        let dir = header.misc.scale_anim_dir;
        let hide_parent = header.flags.contains(ResourceFlags::HIDE_PARENT);
        let children_first = header.flags.contains(ResourceFlags::DRAW_CHILDREN_FIRST);

        let parents = self
            .particles
            .iter()
            .filter(|_| !hide_parent)
            .map(|particle| {
                let base = Vec2::new(particle.base_scale * aspect, particle.base_scale);
                let scale = match dir {
                    ScaleAnimDir::XY => base * particle.anim_scale,
                    ScaleAnimDir::X => Vec2::new(base.x * particle.anim_scale, base.y),
                    ScaleAnimDir::Y => Vec2::new(base.x, base.y * particle.anim_scale),
                };
                instance(particle, scale, header.draw_type, false)
            });

        let child_draw = resource
            .child_resource()
            .map_or(header.draw_type, |child| child.draw_type);
        let children = self.children.iter().map(|particle| {
            let scale = particle.scale();
            instance(particle, Vec2::new(scale * aspect, scale), child_draw, true)
        });

        if children_first {
            children.chain(parents).collect()
        } else {
            parents.chain(children).collect()
        }
    }
}

fn instance(
    particle: &Particle,
    scale: Vec2,
    draw_type: DrawType,
    is_child: bool,
) -> ParticleInstance {
    ParticleInstance {
        position: particle.world_position(),
        velocity: particle.velocity,
        rotation: particle.rotation,
        scale,
        color: particle.color,
        alpha: particle.alpha(),
        texture: particle.texture,
        draw_type,
        is_child,
    }
}

/// `value` randomized by `variance`, unchanged and without a draw when the variance is zero
fn attenuated(rng: &mut SplRandom, value: f32, variance: f32) -> f32 {
    if variance > 0.0 {
        rng.scaled_range(value, variance)
    } else {
        value
    }
}

/// Uniform `[0, 1)` value from the CRC stream
fn unit_hash(rng: &mut SplRandom) -> f32 {
    (rng.crc_hash() >> 8) as f32 / (1u32 << 24) as f32
}

fn child_interval(child: &ChildResource) -> f32 {
    child.emission_interval.max(to_seconds(1))
}

/// Evaluate the resource curves for a parent particle
fn animate(
    particle: &mut Particle,
    resource: &ParticleResource,
    base_color: Vec3,
    flicker: Option<f32>,
) {
    let loop_time = resource.header().misc.loop_time;
    let life = particle.life_fraction();
    let curve_t = |looped: bool| {
        if looped && loop_time > 0.0 {
            particle.loop_fraction(loop_time)
        } else {
            life
        }
    };

    let scale = resource.scale_anim().map(|anim| anim.evaluate(curve_t(anim.looped)));
    let color = resource
        .color_anim()
        .map(|anim| anim.evaluate(curve_t(anim.looped), base_color, particle.start_color));
    let alpha = resource.alpha_anim().map(|anim| {
        let value = anim.evaluate(curve_t(anim.looped));
        flicker.map_or(value, |r| anim.flicker(value, r))
    });
    let texture = resource.tex_anim().map(|anim| {
        let t = if anim.randomize_init && !anim.looped {
            0.0
        } else {
            curve_t(anim.looped)
        };
        anim.texture(t, particle.tex_frame_offset)
    });

    if let Some(scale) = scale {
        particle.anim_scale = scale;
    }
    if let Some(color) = color {
        particle.color = color;
    }
    if let Some(alpha) = alpha {
        particle.anim_alpha = alpha;
    }
    if let Some(texture) = texture {
        particle.texture = texture;
    }
}

fn emit_children(
    parent: &mut Particle,
    child: &ChildResource,
    delta: f32,
    room: &mut usize,
    out: &mut Vec<Particle>,
    rng: &mut SplRandom,
) {
    if parent.life_fraction() < child.emission_delay {
        return;
    }
    parent.child_accumulator += delta;
    let interval = child_interval(child);
    while parent.child_accumulator + TIME_EPSILON >= interval {
        parent.child_accumulator -= interval;
        for _ in 0..child.emission_count {
            if *room == 0 {
                trace!("Particle limit reached, child spawn dropped");
                return;
            }
            *room -= 1;
            out.push(spawn_child(parent, child, rng));
        }
    }
}

fn spawn_child(parent: &Particle, child: &ChildResource, rng: &mut SplRandom) -> Particle {
    let velocity =
        parent.velocity * child.velocity_ratio + rng.unit_vector() * child.random_init_vel_mag;
    let mut particle = Particle::new(
        parent.position,
        velocity,
        parent.emitter_position,
        child.life_time,
    );
    particle.base_scale = parent.base_scale * child.scale_ratio;
    particle.base_alpha = parent.base_alpha;
    particle.color = if child.flags.contains(ChildFlags::USE_CHILD_COLOR) {
        child.color
    } else {
        parent.color
    };
    particle.texture = child.texture;
    match child.rotation_type {
        ChildRotationType::None => {}
        ChildRotationType::InheritAngle => particle.rotation = parent.rotation,
        ChildRotationType::InheritAngleAndVelocity => {
            particle.rotation = parent.rotation;
            particle.angular_velocity = parent.angular_velocity;
        }
    }
    particle.anim_scale = child.scale_at(0.0);
    particle.anim_alpha = child.alpha_at(0.0);
    particle
}
