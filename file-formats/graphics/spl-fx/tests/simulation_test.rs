//! Integration tests for the particle simulation

mod common;

use std::sync::Arc;

use common::*;
use glam::Vec3;
use spl_fx::{
    Emitter, EmitterFlags, EmitterState, ParticleSystem, RandomMode, SplArchive, SplRandom,
    SystemConfig,
};
use test_case::test_case;

fn load(resource: RawResource) -> Arc<SplArchive> {
    Arc::new(SplArchive::from_bytes(&single(resource)).unwrap())
}

fn system(archive: Arc<SplArchive>, seed: u64) -> ParticleSystem {
    let _ = env_logger::builder().is_test(true).try_init();
    ParticleSystem::with_config(
        archive,
        SystemConfig {
            seed: Some(seed),
            ..Default::default()
        },
    )
}

fn float_rng() -> SplRandom {
    SplRandom::with_mode(5, RandomMode::Float)
}

#[test]
fn test_end_to_end_emission_schedule() {
    let archive = load(RawResource {
        emission_interval: 30,
        emitter_life_time: 150,
        particle_life_time: 60,
        ..Default::default()
    });
    let mut system = system(archive, 1234);
    let handle = system.spawn_emitter(0, false).unwrap();

    let delta = 1.0 / 30.0;
    let mut emissions = 0;
    let mut peak = 0;
    let mut terminated_step = None;
    for step in 1..=300 {
        system.advance(delta);
        match system.emitter(handle) {
            Some(emitter) => {
                emissions = emitter.emission_count();
                peak = peak.max(emitter.particle_count());
            }
            None => {
                terminated_step = Some(step);
                break;
            }
        }
    }

    assert_eq!(emissions, 5);
    assert!(peak <= 2, "peak of {peak} live particles");
    // Emission starts on the first step, so the fifth burst lands on step 121
    // and its particle expires 60 frames later.
    assert_eq!(terminated_step, Some(181));
}

#[test_case(1.0 / 30.0, 150, 30, 5 ; "one frame steps")]
#[test_case(0.07, 150, 30, 5 ; "steps not dividing the interval")]
#[test_case(0.013, 150, 30, 5 ; "short steps")]
#[test_case(2.5, 150, 30, 5 ; "steps longer than the interval")]
#[test_case(0.07, 100, 30, 4 ; "life not a multiple of the interval")]
#[test_case(0.05, 90, 7, 13 ; "uneven interval")]
fn test_emission_budget(delta: f32, life: u16, interval: u8, expected: u32) {
    let archive = load(RawResource {
        emission_interval: interval,
        emitter_life_time: life,
        particle_life_time: 15,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    let steps = (20.0 / delta) as usize;
    for _ in 0..steps {
        emitter.update(resource, delta, &mut rng);
    }
    assert_eq!(emitter.emission_count(), expected);
    assert!(emitter.is_terminated());
}

#[test_case(0.25 ; "quarter second")]
#[test_case(0.125 ; "eighth second")]
#[test_case(0.5 ; "half second")]
fn test_particle_lifetime_window(delta: f32) {
    let archive = load(RawResource {
        emission_interval: 30,
        emitter_life_time: 1,
        particle_life_time: 30,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    let mut oldest = 0.0f32;
    for _ in 0..(3.0 / delta) as usize {
        emitter.update(resource, delta, &mut rng);
        if let Some(particle) = emitter.particles().first() {
            oldest = oldest.max(particle.age);
        }
    }

    assert_eq!(oldest, 1.0 - delta);
    assert!(emitter.particles().is_empty());
}

#[test]
fn test_particle_lifetime_window_accurate_mode() {
    let archive = load(RawResource {
        emission_interval: 30,
        emitter_life_time: 1,
        particle_life_time: 300,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = SplRandom::new(77);
    assert_eq!(rng.mode(), RandomMode::Accurate);

    let delta = 1.0 / 30.0;
    let mut oldest = 0.0f32;
    let mut steps_alive = 0;
    for _ in 0..330 {
        emitter.update(resource, delta, &mut rng);
        if let Some(particle) = emitter.particles().first() {
            assert_eq!(particle.life_time, 10.0);
            oldest = oldest.max(particle.age);
            steps_alive += 1;
        }
    }

    assert!((oldest - (10.0 - delta)).abs() < 1e-3, "oldest age {oldest}");
    assert_eq!(steps_alive, 300);
    assert!(emitter.particles().is_empty());
}

#[test]
fn test_self_maintaining_terminates_on_next_advance() {
    let archive = load(RawResource {
        emission_interval: 30,
        emitter_life_time: 30,
        particle_life_time: 15,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    for _ in 0..3 {
        emitter.update(resource, 0.25, &mut rng);
    }
    assert_eq!(emitter.state(), EmitterState::Aging);
    assert_eq!(emitter.remaining_budget(), Some(0));
    assert_eq!(emitter.particle_count(), 0);

    emitter.update(resource, 0.25, &mut rng);
    assert_eq!(emitter.state(), EmitterState::Terminated);
}

#[test]
fn test_live_particle_keeps_emitter_aging() {
    let archive = load(RawResource {
        emission_interval: 30,
        emitter_life_time: 30,
        particle_life_time: 150,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    for _ in 0..8 {
        emitter.update(resource, 0.25, &mut rng);
    }
    assert_eq!(emitter.remaining_budget(), Some(0));
    assert_eq!(emitter.particle_count(), 1);
    assert_eq!(emitter.state(), EmitterState::Aging);
}

fn busy_resource() -> RawResource {
    let mut blocks = gravity_block([0.0, -0.01, 0.0]);
    blocks.extend(random_block([0.05, 0.05, 0.05], 4));
    RawResource {
        flags: FLAG_SELF_MAINTAINING | FLAG_GRAVITY | FLAG_RANDOM | 1, // sphere surface
        radius: 2.0,
        emission_count: 3.0,
        init_vel_pos: 0.5,
        init_vel_axis: 0.25,
        attenuation: 0x00_80_80_80,
        emission_interval: 2,
        emitter_life_time: 60,
        particle_life_time: 45,
        blocks,
        ..Default::default()
    }
}

#[test]
fn test_same_seed_is_deterministic() {
    let archive = load(busy_resource());
    let run = |seed| {
        let mut system = system(Arc::clone(&archive), seed);
        system.spawn_emitter(0, false).unwrap();
        let mut frames = Vec::new();
        for _ in 0..90 {
            system.advance(1.0 / 30.0);
            frames.push(system.instances());
        }
        frames
    };

    let a = run(99);
    let b = run(99);
    assert_eq!(a, b);
    assert!(a.iter().any(|frame| !frame.is_empty()));

    let c = run(100);
    assert_ne!(a, c);
}

#[test]
fn test_emission_paused_through_system() {
    let archive = load(busy_resource());
    let mut system = system(archive, 7);
    let handle = system.spawn_emitter(0, false).unwrap();
    system.advance(1.0 / 30.0);
    let count = system.particle_count();
    assert_eq!(count, 3);

    system
        .emitter_mut(handle)
        .unwrap()
        .flags
        .insert(EmitterFlags::EMISSION_PAUSED);
    for _ in 0..10 {
        system.advance(1.0 / 30.0);
    }
    assert_eq!(system.particle_count(), count);
    let emitter = system.emitter(handle).unwrap();
    assert!(emitter.particles().iter().all(|p| p.age > 0.3));

    let emitter = system.emitter_mut(handle).unwrap();
    emitter.flags.remove(EmitterFlags::EMISSION_PAUSED);
    emitter.flags.insert(EmitterFlags::PAUSED);
    let before = system.emitter(handle).unwrap().age();
    system.advance(1.0 / 30.0);
    assert_eq!(system.emitter(handle).unwrap().age(), before);
}

#[test]
fn test_children_spawn_from_parents() {
    let archive = load(RawResource {
        flags: FLAG_SELF_MAINTAINING | FLAG_CHILD,
        emission_interval: 30,
        emitter_life_time: 30,
        particle_life_time: 30,
        blocks: child_block(2, 3, 10, 0),
        ..Default::default()
    });
    let mut system = system(archive, 3);
    system.spawn_emitter_at(0, Vec3::new(0.0, 5.0, 0.0), false).unwrap();

    for _ in 0..6 {
        system.advance(1.0 / 30.0);
    }
    let instances = system.instances();
    let children: Vec<_> = instances.iter().filter(|i| i.is_child).collect();
    assert!(!children.is_empty());
    assert!(children.len() % 2 == 0);
    assert!(children.iter().all(|c| c.position.y == 5.0));
}

#[test_case(false ; "kill")]
#[test_case(true ; "bounce")]
fn test_collision_plane(bounce: bool) {
    let mut blocks = gravity_block([0.0, -0.05, 0.0]);
    blocks.extend(collision_plane_block(-1.0, 0.5, bounce));
    let archive = load(RawResource {
        flags: FLAG_SELF_MAINTAINING | FLAG_GRAVITY | FLAG_COLLISION_PLANE,
        emission_interval: 30,
        emitter_life_time: 1,
        particle_life_time: 150,
        blocks,
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    for _ in 0..60 {
        emitter.update(resource, 1.0 / 30.0, &mut rng);
    }
    if bounce {
        assert_eq!(emitter.particle_count(), 1);
        assert!(emitter.particles()[0].world_position().y > -5.0);
    } else {
        assert_eq!(emitter.particle_count(), 0);
    }
}

#[test]
fn test_gravity_accelerates_particles() {
    let archive = load(RawResource {
        flags: FLAG_SELF_MAINTAINING | FLAG_GRAVITY,
        emission_interval: 30,
        emitter_life_time: 1,
        particle_life_time: 150,
        blocks: gravity_block([0.0, -0.5, 0.0]),
        ..Default::default()
    });
    let resource = archive.resource(0).unwrap();
    let mut emitter = Emitter::new(0, resource, Vec3::ZERO, false, 1000);
    let mut rng = float_rng();

    for _ in 0..3 {
        emitter.update(resource, 1.0 / 30.0, &mut rng);
    }
    let particle = &emitter.particles()[0];
    assert!((particle.velocity.y + 1.0).abs() < 1e-3);
    assert!(particle.position.y < -1.0);
}
