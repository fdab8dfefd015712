//! Command implementations

pub mod export;
pub mod info;
pub mod simulate;

use anyhow::{Context, Result};
use spl_fx::SplArchive;
use std::path::Path;

/// Read and decode an archive, returning it with its size on disk
pub(crate) fn load_archive(path: &Path) -> Result<(SplArchive, u64)> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let archive = SplArchive::from_bytes(&data)
        .with_context(|| format!("Failed to parse SPA archive: {}", path.display()))?;
    Ok((archive, data.len() as u64))
}
