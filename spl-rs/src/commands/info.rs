//! SPA archive inspection

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use spl_fx::{ParticleResource, SplArchive, SplHeader, TextureRecord};
use spl_tex::TextureParam;
use std::path::PathBuf;

use crate::commands::load_archive;
use crate::utils::{add_table_row, create_table, format_bytes, format_duration, format_life_time};

#[derive(Args)]
pub struct InfoArgs {
    /// Path to the SPA file
    pub file: PathBuf,

    /// Show a table of every particle resource
    #[arg(long)]
    pub resources: bool,

    /// Show a table of every texture record
    #[arg(long)]
    pub textures: bool,

    /// Dump the decoded archive as JSON instead
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ArchiveDump<'a> {
    header: &'a SplHeader,
    resources: &'a [ParticleResource],
    textures: Vec<TextureSummary>,
}

#[derive(Serialize)]
struct TextureSummary {
    param: TextureParam,
    width: u32,
    height: u32,
    texture_size: usize,
    palette_size: usize,
    decoded: bool,
}

impl From<&TextureRecord> for TextureSummary {
    fn from(texture: &TextureRecord) -> Self {
        Self {
            param: texture.param,
            width: texture.width,
            height: texture.height,
            texture_size: texture.texture_size,
            palette_size: texture.palette_size,
            decoded: texture.is_decoded(),
        }
    }
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let (archive, file_size) = load_archive(&args.file)?;

    if args.json {
        let dump = ArchiveDump {
            header: archive.header(),
            resources: archive.resources(),
            textures: archive.textures().iter().map(TextureSummary::from).collect(),
        };
        let json = serde_json::to_string_pretty(&dump).context("Failed to serialize archive")?;
        println!("{json}");
        return Ok(());
    }

    print_summary(&args, &archive, file_size);

    if args.resources && archive.resource_count() > 0 {
        println!();
        print_resources(&archive);
    }

    if args.textures && archive.texture_count() > 0 {
        println!();
        print_textures(&archive);
    }

    Ok(())
}

fn print_summary(args: &InfoArgs, archive: &SplArchive, file_size: u64) {
    let header = archive.header();

    println!("SPA Archive: {}", args.file.display());
    println!("{}", "=".repeat(40));
    println!("File size:  {}", format_bytes(file_size));
    println!("Version:    {}", String::from_utf8_lossy(&header.version));
    println!(
        "Resources:  {} ({})",
        header.resource_count,
        format_bytes(u64::from(header.resource_size))
    );
    println!(
        "Textures:   {} ({} at {:#x})",
        header.texture_count,
        format_bytes(u64::from(header.texture_size)),
        header.texture_offset
    );

    let undecoded = archive.textures().iter().filter(|t| !t.is_decoded()).count();
    if undecoded > 0 {
        println!("Undecoded:  {undecoded} texture(s)");
    }
}

fn print_resources(archive: &SplArchive) {
    let mut table = create_table(&[
        "#",
        "Emission",
        "Draw",
        "Count",
        "Interval",
        "Emitter Life",
        "Particle Life",
        "Texture",
        "Behaviors",
        "Child",
    ]);

    for (index, resource) in archive.resources().iter().enumerate() {
        let header = resource.header();
        let behaviors = resource
            .behaviors()
            .iter()
            .map(|b| b.kind().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let child = resource
            .child_resource()
            .map_or_else(|| "-".to_string(), |c| format!("tex {}", c.texture));

        add_table_row(
            &mut table,
            [
                index.to_string(),
                header.emission_type.to_string(),
                header.draw_type.to_string(),
                format!("{:.2}", header.emission_count),
                format!("{}f", header.emission_interval_frames()),
                format_life_time(header.emitter_life_time),
                format_duration(header.particle_life_time),
                header.misc.texture_index.to_string(),
                if behaviors.is_empty() {
                    "-".to_string()
                } else {
                    behaviors
                },
                child,
            ],
        );
    }

    table.printstd();
}

fn print_textures(archive: &SplArchive) {
    let mut table = create_table(&[
        "#", "Format", "Size", "Repeat", "Flip", "Texels", "Palette", "Decoded",
    ]);

    for (index, texture) in archive.textures().iter().enumerate() {
        add_table_row(
            &mut table,
            [
                index.to_string(),
                texture.format().to_string(),
                format!("{}x{}", texture.width, texture.height),
                texture.param.repeat.to_string(),
                texture.param.flip.to_string(),
                format_bytes(texture.texture_size as u64),
                format_bytes(texture.palette_size as u64),
                if texture.is_decoded() { "yes" } else { "no" }.to_string(),
            ],
        );
    }

    table.printstd();
}
