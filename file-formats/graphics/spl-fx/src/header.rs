use log::debug;

use crate::error::{Result, SplError};
use crate::reader::{ByteReader, Cursor};

/// File magic, stored as the bytes `" APS"`
pub const SPA_MAGIC: [u8; 4] = *b" APS";

/// The only archive version this library reads
pub const SPA_VERSION: [u8; 4] = *b"12_1";

/// Size of the file header in bytes
pub const HEADER_SIZE: usize = 32;

/// SPA file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplHeader {
    /// Magic bytes
    pub magic: [u8; 4],
    /// Version string bytes
    pub version: [u8; 4],
    /// Number of particle resources
    pub resource_count: u16,
    /// Number of texture records
    pub texture_count: u16,
    /// Reserved
    pub reserved0: u32,
    /// Size in bytes of the resource block that follows the header
    pub resource_size: u32,
    /// Size in bytes of the texture block
    pub texture_size: u32,
    /// File offset of the texture block
    pub texture_offset: u32,
    /// Reserved
    pub reserved1: u32,
}

impl SplHeader {
    /// Parse and validate the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let header = Self::read(&mut cursor).map_err(|e| e.with_context("file header"))?;
        header.validate(data.len())?;
        debug!(
            "SPA header: {} resources ({} bytes), {} textures ({} bytes at {:#x})",
            header.resource_count,
            header.resource_size,
            header.texture_count,
            header.texture_size,
            header.texture_offset
        );
        Ok(header)
    }

    fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            magic: cursor.read_array()?,
            version: cursor.read_array()?,
            resource_count: cursor.read_u16_le()?,
            texture_count: cursor.read_u16_le()?,
            reserved0: cursor.read_u32_le()?,
            resource_size: cursor.read_u32_le()?,
            texture_size: cursor.read_u32_le()?,
            texture_offset: cursor.read_u32_le()?,
            reserved1: cursor.read_u32_le()?,
        })
    }

    fn validate(&self, file_size: usize) -> Result<()> {
        if self.magic != SPA_MAGIC {
            return Err(SplError::InvalidMagic {
                expected: String::from_utf8_lossy(&SPA_MAGIC).into_owned(),
                actual: String::from_utf8_lossy(&self.magic).into_owned(),
            });
        }
        if self.version != SPA_VERSION {
            return Err(SplError::UnsupportedVersion(
                String::from_utf8_lossy(&self.version).into_owned(),
            ));
        }

        let check = |what, offset: usize, size: usize| {
            if offset.checked_add(size).is_none_or(|end| end > file_size) {
                Err(SplError::OutOfBounds {
                    what,
                    offset,
                    size,
                    file_size,
                })
            } else {
                Ok(())
            }
        };
        check("resource block", HEADER_SIZE, self.resource_size as usize)?;
        check(
            "texture block",
            self.texture_offset as usize,
            self.texture_size as usize,
        )
    }

    /// Byte range of the resource block
    pub fn resource_range(&self) -> std::ops::Range<usize> {
        HEADER_SIZE..HEADER_SIZE + self.resource_size as usize
    }

    /// Byte range of the texture block
    pub fn texture_range(&self) -> std::ops::Range<usize> {
        let start = self.texture_offset as usize;
        start..start + self.texture_size as usize
    }
}

impl Default for SplHeader {
    /// Header of an empty archive
    fn default() -> Self {
        Self {
            magic: SPA_MAGIC,
            version: SPA_VERSION,
            resource_count: 0,
            texture_count: 0,
            reserved0: 0,
            resource_size: 0,
            texture_size: 0,
            texture_offset: HEADER_SIZE as u32,
            reserved1: 0,
        }
    }
}

/// Cheap structural check of an archive without decoding it
///
/// Checks the magic, the version and that both data blocks lie inside the buffer.
pub fn is_valid(data: &[u8]) -> bool {
    SplHeader::parse(data).is_ok()
}
