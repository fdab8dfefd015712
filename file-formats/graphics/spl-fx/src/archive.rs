//! SPA archive loading.

use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, SplError};
use crate::header::SplHeader;
use crate::reader::Cursor;
use crate::resource::ParticleResource;
use crate::texture::{TextureRecord, parse_textures};

/// A fully decoded particle archive
///
/// Resources and textures are stored in load order; emitters and particles
/// refer to them by index.
#[derive(Debug, Clone)]
pub struct SplArchive {
    header: SplHeader,
    resources: Vec<ParticleResource>,
    textures: Vec<TextureRecord>,
}

impl SplArchive {
    /// An archive without resources or textures
    pub fn new() -> Self {
        Self {
            header: SplHeader::default(),
            resources: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Load and decode an archive from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        info!("Loading SPL archive {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(&data)
    }

    /// Decode an archive held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = SplHeader::parse(data)?;

        let resource_range = header.resource_range();
        let base = resource_range.start;
        let mut cursor = Cursor::with_base(&data[resource_range], base);
        let mut resources = Vec::with_capacity(usize::from(header.resource_count));
        for index in 0..usize::from(header.resource_count) {
            resources.push(ParticleResource::parse(&mut cursor, index)?);
        }
        if cursor.remaining() > 0 {
            debug!(
                "{} trailing bytes after the last resource",
                cursor.remaining()
            );
        }

        let textures = parse_textures(data, &header)?;

        let archive = Self {
            header,
            resources,
            textures,
        };
        archive.validate()?;
        Ok(archive)
    }

    /// Check every resource against the texture table
    pub fn validate(&self) -> Result<()> {
        for (index, resource) in self.resources.iter().enumerate() {
            resource.validate(index, self.textures.len())?;
        }
        Ok(())
    }

    pub fn header(&self) -> &SplHeader {
        &self.header
    }

    pub fn resources(&self) -> &[ParticleResource] {
        &self.resources
    }

    pub fn resource(&self, index: usize) -> Option<&ParticleResource> {
        self.resources.get(index)
    }

    /// Mutable access for editing; call [`validate`](Self::validate) afterwards
    pub fn resource_mut(&mut self, index: usize) -> Option<&mut ParticleResource> {
        self.resources.get_mut(index)
    }

    /// Append a resource and return its index
    pub fn add_resource(&mut self, resource: ParticleResource) -> Result<usize> {
        let index = self.resources.len();
        resource.validate(index, self.textures.len())?;
        self.resources.push(resource);
        Ok(index)
    }

    /// Append a texture and return its index
    pub fn add_texture(&mut self, texture: TextureRecord) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn textures(&self) -> &[TextureRecord] {
        &self.textures
    }

    pub fn texture(&self, index: usize) -> Option<&TextureRecord> {
        self.textures.get(index)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl Default for SplArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&[u8]> for SplArchive {
    type Error = SplError;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::from_bytes(data)
    }
}
