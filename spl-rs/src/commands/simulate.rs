//! Headless emitter simulation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use spl_fx::fx::FRAMES_PER_SECOND;
use spl_fx::{ParticleSystem, RandomMode, SystemConfig};
use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::load_archive;
use crate::utils::{format_duration, key_value_table};

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the SPA file
    pub file: PathBuf,

    /// Index of the resource to emit
    #[arg(short, long, default_value = "0")]
    pub resource: usize,

    /// Seconds to simulate before giving up
    #[arg(long, default_value = "10")]
    pub seconds: f32,

    /// Random seed (OS entropy if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Restart the emission cycle whenever the emitter life time runs out
    #[arg(long)]
    pub looped: bool,

    /// Random number distribution
    #[arg(long, value_enum, default_value = "accurate")]
    pub random: RandomModeCli,

    /// Print nothing but the final summary
    #[arg(long)]
    pub summary: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RandomModeCli {
    /// Fixed-point distributions matching the hardware
    Accurate,
    /// Plain floating-point distributions
    Float,
}

impl From<RandomModeCli> for RandomMode {
    fn from(value: RandomModeCli) -> Self {
        match value {
            RandomModeCli::Accurate => RandomMode::Accurate,
            RandomModeCli::Float => RandomMode::Float,
        }
    }
}

/// Outcome of a headless run
#[derive(Debug, Default)]
struct RunReport {
    frames: u32,
    emissions: u32,
    peak_particles: usize,
    terminated_at: Option<u32>,
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        anyhow::bail!("--seconds must be a positive number, got {}", args.seconds);
    }

    let (archive, _) = load_archive(&args.file)?;
    let config = SystemConfig {
        seed: args.seed,
        random_mode: args.random.into(),
        ..SystemConfig::default()
    };
    let mut system = ParticleSystem::with_config(Arc::new(archive), config);
    let handle = system
        .spawn_emitter(args.resource, args.looped)
        .with_context(|| format!("Failed to spawn emitter for resource {}", args.resource))?;

    let step = 1.0 / FRAMES_PER_SECOND as f32;
    let max_frames = (args.seconds * FRAMES_PER_SECOND as f32).ceil() as u32;
    let mut report = RunReport::default();

    log::info!(
        "Simulating resource {} for {} frames (looped: {})",
        args.resource,
        max_frames,
        args.looped
    );

    for frame in 1..=max_frames {
        system.advance(step);
        report.frames = frame;

        let Some(emitter) = system.emitter(handle) else {
            report.terminated_at = Some(frame);
            if !args.summary {
                println!("frame {frame:>5}: emitter terminated");
            }
            break;
        };

        let particles = system.particle_count();
        report.peak_particles = report.peak_particles.max(particles);
        let total = emitter.emission_count();
        if total > report.emissions {
            if !args.summary {
                println!(
                    "frame {:>5}: emission {:>4} ({} particles alive, state {:?})",
                    frame,
                    total,
                    particles,
                    emitter.state()
                );
            }
            report.emissions = total;
        }
    }

    if !args.summary {
        println!();
    }
    print_report(&args, &report, step);
    Ok(())
}

fn print_report(args: &SimulateArgs, report: &RunReport, step: f32) {
    let terminated = report
        .terminated_at
        .map_or_else(|| "no".to_string(), |frame| format_duration(frame as f32 * step));
    let table = key_value_table(&[
        ("Resource", args.resource.to_string()),
        ("Simulated", format_duration(report.frames as f32 * step)),
        ("Emissions", report.emissions.to_string()),
        ("Peak particles", report.peak_particles.to_string()),
        ("Terminated", terminated),
    ]);
    table.printstd();
}
