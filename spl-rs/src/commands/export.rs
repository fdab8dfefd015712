//! Texture export

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use image::ImageFormat;
use spl_fx::SplArchive;
use std::path::{Path, PathBuf};

use crate::commands::load_archive;

#[derive(Args)]
pub struct ExportArgs {
    /// Path to the SPA file
    pub file: PathBuf,

    /// Texture indices to export (all textures if omitted)
    #[arg(short, long = "index")]
    pub indices: Vec<usize>,

    /// Output directory, or a file path when exporting a single texture
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image format (taken from the output file extension if one is given)
    #[arg(short, long, value_enum, default_value = "png")]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Png,
    Bmp,
    Tga,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tga => "tga",
        }
    }
}

impl From<OutputFormat> for ImageFormat {
    fn from(value: OutputFormat) -> ImageFormat {
        match value {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tga => ImageFormat::Tga,
        }
    }
}

fn guess_output_format(path: &Path) -> Option<OutputFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some(OutputFormat::Png),
        "bmp" => Some(OutputFormat::Bmp),
        "tga" => Some(OutputFormat::Tga),
        _ => None,
    }
}

pub fn execute(args: ExportArgs) -> Result<()> {
    let (archive, _) = load_archive(&args.file)?;

    let indices: Vec<usize> = if args.indices.is_empty() {
        (0..archive.texture_count()).collect()
    } else {
        args.indices.clone()
    };
    for &index in &indices {
        if index >= archive.texture_count() {
            anyhow::bail!(
                "Texture index {} out of range ({} textures)",
                index,
                archive.texture_count()
            );
        }
    }

    let output = args.output.clone().unwrap_or_else(|| PathBuf::from("."));
    if output.extension().is_some() && !output.is_dir() {
        if indices.len() != 1 {
            anyhow::bail!(
                "Output {} is a file but {} textures were selected; pass a directory or a single --index",
                output.display(),
                indices.len()
            );
        }
        let format = guess_output_format(&output).unwrap_or(args.format);
        let index = indices[0];
        if !export_texture(&archive, index, &output, format)? {
            anyhow::bail!("Texture {} cannot be decoded", index);
        }
        println!("Exported texture {} to {}", index, output.display());
        return Ok(());
    }

    std::fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create directory: {}", output.display()))?;

    let mut exported = 0;
    for index in indices {
        let path = output.join(format!("texture_{index}.{}", args.format.extension()));
        if export_texture(&archive, index, &path, args.format)? {
            exported += 1;
        }
    }

    println!("Exported {} texture(s) to {}", exported, output.display());
    Ok(())
}

/// Write one texture, returning `false` when it has no decoded pixels
fn export_texture(
    archive: &SplArchive,
    index: usize,
    path: &Path,
    format: OutputFormat,
) -> Result<bool> {
    let Some(texture) = archive.texture(index) else {
        anyhow::bail!("Texture index {} out of range", index);
    };
    let Some(image) = texture.to_image() else {
        log::warn!(
            "Skipping texture {}: {} textures are not decoded",
            index,
            texture.format()
        );
        return Ok(false);
    };

    image
        .save_with_format(path, format.into())
        .with_context(|| format!("Failed to write image: {}", path.display()))?;
    log::info!(
        "Texture {} ({}, {}x{}) -> {}",
        index,
        texture.format(),
        texture.width,
        texture.height,
        path.display()
    );
    Ok(true)
}
