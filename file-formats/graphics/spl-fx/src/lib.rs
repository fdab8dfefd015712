//! Parser and simulator for Nintendo DS SPL particle archives (`.spa`).
//!
//! An archive holds a list of particle resources (emitter templates) and a
//! table of textures. This crate decodes both into plain Rust types and runs
//! emitters built from those resources with a random engine that reproduces
//! the hardware's fixed-point distributions.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use spl_fx::{ParticleResource, ParticleSystem, SplArchive, SplRandom, TextureRecord};
//! use spl_tex::{TextureFormat, TextureParam};
//!
//! let mut archive = SplArchive::new();
//! let param = TextureParam::from_bits(TextureFormat::Direct as u32)?;
//! archive.add_texture(TextureRecord::from_rgba(param, vec![255; 8 * 8 * 4])?);
//! archive.add_resource(ParticleResource::blank())?;
//!
//! let mut system = ParticleSystem::new(Arc::new(archive), SplRandom::new(1));
//! system.spawn_emitter(0, false)?;
//! system.advance(1.0 / 30.0);
//! assert_eq!(system.particle_count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Loading from disk:
//!
//! ```no_run
//! use spl_fx::SplArchive;
//!
//! let archive = SplArchive::load("effect.spa")?;
//! for (index, resource) in archive.resources().iter().enumerate() {
//!     println!("{index}: {}", resource.header().emission_type);
//! }
//! # Ok::<(), spl_fx::SplError>(())
//! ```

#![forbid(unsafe_code)]

pub mod archive;
pub mod error;
pub mod fx;
pub mod header;
pub mod particles;
pub mod random;
pub mod reader;
pub mod resource;
pub mod texture;

pub use archive::SplArchive;
pub use error::{Result, SplError};
pub use header::{SplHeader, is_valid};
pub use particles::{
    Emitter, EmitterFlags, EmitterHandle, EmitterState, Particle, ParticleInstance,
    ParticleSystem, SystemConfig,
};
pub use random::{RandomMode, SplRandom};
pub use resource::{Behavior, BehaviorKind, ParticleResource, ResourceFlags, ResourceHeader};
pub use texture::TextureRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
