//! Particle simulation
//!
//! Emitters are runtime instances of a [`ParticleResource`](crate::resource::ParticleResource).
//! Every step advances the emitter state machine, updates live particles and
//! children, then spawns whatever emissions came due.
//!
//! # Architecture
//!
//! - `Particle`: position, velocity, age, appearance of one particle
//! - `Emitter`: state machine, per-instance parameters and particle storage
//! - `ParticleSystem`: owns an archive, a random engine and every emitter
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use spl_fx::particles::{ParticleSystem, SystemConfig};
//!
//! let archive = Arc::new(SplArchive::load("effect.spa")?);
//! let mut system = ParticleSystem::with_config(archive, SystemConfig {
//!     seed: Some(42),
//!     ..Default::default()
//! });
//!
//! let handle = system.spawn_emitter(0, false)?;
//! system.advance(1.0 / 30.0);
//!
//! for instance in system.instances() {
//!     draw(instance.position, instance.scale, instance.color, instance.alpha);
//! }
//! ```
//!
//! # Timing
//!
//! Time is measured in seconds. Per-frame quantities from the archive are
//! scaled by the number of 30 Hz frames in each step, so stepping by
//! `1.0 / 30.0` reproduces one hardware frame.

mod emission;
mod emitter;
mod particle;
mod system;

pub use emission::{EmissionAxes, ShapeParams, sample_position};
pub use emitter::{Emitter, EmitterFlags, EmitterParams, EmitterState, ParticleInstance};
pub use particle::Particle;
pub use system::{DEFAULT_MAX_PARTICLES, EmitterHandle, ParticleSystem, SystemConfig};
