//! Top-level simulation driver

use std::sync::Arc;

use glam::Vec3;
use log::{debug, trace};

use super::emitter::{Emitter, ParticleInstance};
use crate::archive::SplArchive;
use crate::error::{Result, SplError};
use crate::random::{RandomMode, SplRandom};

/// Default cap on live particles per emitter
pub const DEFAULT_MAX_PARTICLES: usize = 10_000;

/// Runtime configuration of a [`ParticleSystem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Explicit seed, or OS entropy when `None`
    pub seed: Option<u64>,
    pub random_mode: RandomMode,
    /// Live parent and child particles allowed per emitter
    pub max_particles: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            random_mode: RandomMode::Accurate,
            max_particles: DEFAULT_MAX_PARTICLES,
        }
    }
}

/// Identifies an emitter within its [`ParticleSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterHandle(u32);

impl EmitterHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// Owns the emitters of one archive and advances them in lockstep
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use spl_fx::{ParticleSystem, SplArchive, SplRandom};
///
/// let archive = Arc::new(SplArchive::load("effect.spa")?);
/// let mut system = ParticleSystem::new(archive, SplRandom::new(7));
/// system.spawn_emitter(0, false)?;
/// for _ in 0..60 {
///     system.advance(1.0 / 30.0);
/// }
/// println!("{} particles alive", system.particle_count());
/// # Ok::<(), spl_fx::SplError>(())
/// ```
#[derive(Debug)]
pub struct ParticleSystem {
    archive: Arc<SplArchive>,
    rng: SplRandom,
    emitters: Vec<(EmitterHandle, Emitter)>,
    next_handle: u32,
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(archive: Arc<SplArchive>, rng: SplRandom) -> Self {
        Self {
            archive,
            rng,
            emitters: Vec::new(),
            next_handle: 0,
            max_particles: DEFAULT_MAX_PARTICLES,
        }
    }

    pub fn with_config(archive: Arc<SplArchive>, config: SystemConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SplRandom::with_mode(seed, config.random_mode),
            None => {
                let mut rng = SplRandom::from_entropy();
                rng.set_mode(config.random_mode);
                rng
            }
        };
        Self {
            max_particles: config.max_particles,
            ..Self::new(archive, rng)
        }
    }

    pub fn archive(&self) -> &Arc<SplArchive> {
        &self.archive
    }

    pub fn rng_mut(&mut self) -> &mut SplRandom {
        &mut self.rng
    }

    /// Spawn an emitter for resource `index` at the origin
    pub fn spawn_emitter(&mut self, index: usize, looped: bool) -> Result<EmitterHandle> {
        self.spawn_emitter_at(index, Vec3::ZERO, looped)
    }

    /// Spawn an emitter for resource `index` at a world position
    pub fn spawn_emitter_at(
        &mut self,
        index: usize,
        position: Vec3,
        looped: bool,
    ) -> Result<EmitterHandle> {
        let resource =
            self.archive
                .resource(index)
                .ok_or_else(|| SplError::InvalidResourceIndex {
                    index,
                    count: self.archive.resource_count(),
                })?;
        let handle = EmitterHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);

        let emitter = Emitter::new(index, resource, position, looped, self.max_particles);
        debug!(
            "Spawned emitter {} for resource {} at {} (looped: {})",
            handle.0, index, position, looped
        );
        self.emitters.push((handle, emitter));
        Ok(handle)
    }

    /// Remove an emitter and its particles immediately
    pub fn kill_emitter(&mut self, handle: EmitterHandle) -> bool {
        let before = self.emitters.len();
        self.emitters.retain(|(h, _)| *h != handle);
        before != self.emitters.len()
    }

    /// Stop an emitter's emission; it is removed once its particles are gone
    pub fn stop_emitter(&mut self, handle: EmitterHandle) -> bool {
        match self.emitter_mut(handle) {
            Some(emitter) => {
                emitter.stop();
                true
            }
            None => false,
        }
    }

    /// Remove every emitter
    pub fn kill_all_emitters(&mut self) {
        debug!("Killing {} emitters", self.emitters.len());
        self.emitters.clear();
    }

    /// Advance every emitter by `delta` seconds and drop terminated ones
    pub fn advance(&mut self, delta: f32) {
        let resources = self.archive.resources();
        for (_, emitter) in &mut self.emitters {
            if let Some(resource) = resources.get(emitter.resource_index()) {
                emitter.update(resource, delta, &mut self.rng);
            }
        }

        self.emitters.retain(|(handle, emitter)| {
            if emitter.is_terminated() {
                trace!("Removing terminated emitter {}", handle.0);
            }
            !emitter.is_terminated()
        });
    }

    pub fn emitter(&self, handle: EmitterHandle) -> Option<&Emitter> {
        self.emitters
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, emitter)| emitter)
    }

    pub fn emitter_mut(&mut self, handle: EmitterHandle) -> Option<&mut Emitter> {
        self.emitters
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, emitter)| emitter)
    }

    /// Live emitters in spawn order
    pub fn emitters(&self) -> impl Iterator<Item = (EmitterHandle, &Emitter)> {
        self.emitters.iter().map(|(handle, emitter)| (*handle, emitter))
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Live particles across all emitters, children included
    pub fn particle_count(&self) -> usize {
        self.emitters
            .iter()
            .map(|(_, emitter)| emitter.particle_count())
            .sum()
    }

    /// Render snapshots of every emitter in spawn order
    pub fn instances(&self) -> Vec<ParticleInstance> {
        let resources = self.archive.resources();
        self.emitters
            .iter()
            .filter_map(|(_, emitter)| {
                resources
                    .get(emitter.resource_index())
                    .map(|resource| emitter.instances(resource))
            })
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ParticleResource;
    use crate::texture::TextureRecord;
    use spl_tex::{TextureFormat, TextureParam};

    fn archive() -> Arc<SplArchive> {
        let mut archive = SplArchive::new();
        let param = TextureParam::from_bits(TextureFormat::Direct as u32).unwrap();
        archive.add_texture(TextureRecord::from_rgba(param, vec![255; 8 * 8 * 4]).unwrap());
        let mut resource = ParticleResource::blank();
        resource.header_mut().misc.emission_interval = 0.5;
        resource.header_mut().emitter_life_time = 1.0;
        resource.header_mut().particle_life_time = 0.5;
        archive.add_resource(resource).unwrap();
        Arc::new(archive)
    }

    fn system() -> ParticleSystem {
        ParticleSystem::with_config(
            archive(),
            SystemConfig {
                seed: Some(1),
                random_mode: RandomMode::Float,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_spawn_invalid_resource() {
        let mut system = system();
        let err = system.spawn_emitter(3, false).unwrap_err();
        assert!(matches!(
            err,
            SplError::InvalidResourceIndex { index: 3, count: 1 }
        ));
    }

    #[test]
    fn test_handles_are_unique() {
        let mut system = system();
        let a = system.spawn_emitter(0, false).unwrap();
        let b = system.spawn_emitter(0, false).unwrap();
        assert_ne!(a, b);
        assert_eq!(system.emitter_count(), 2);
        assert!(system.kill_emitter(a));
        assert!(!system.kill_emitter(a));
        assert!(system.emitter(b).is_some());
    }

    #[test]
    fn test_advance_removes_terminated() {
        let mut system = system();
        system.spawn_emitter(0, false).unwrap();
        system.advance(0.25);
        assert_eq!(system.particle_count(), 1);
        for _ in 0..8 {
            system.advance(0.25);
        }
        assert_eq!(system.emitter_count(), 0);
    }

    #[test]
    fn test_stop_and_kill_all() {
        let mut system = system();
        let looped = system.spawn_emitter(0, true).unwrap();
        system.spawn_emitter_at(0, Vec3::X, true).unwrap();
        system.advance(0.25);
        assert_eq!(system.instances().len(), 2);
        assert_eq!(system.instances()[1].position, Vec3::X);

        assert!(system.stop_emitter(looped));
        for _ in 0..4 {
            system.advance(0.25);
        }
        assert!(system.emitter(looped).is_none());
        assert_eq!(system.emitter_count(), 1);

        system.kill_all_emitters();
        assert_eq!(system.emitter_count(), 0);
        assert_eq!(system.particle_count(), 0);
    }
}
