//! Little-endian byte reading over an in-memory archive.

use glam::Vec3;

use crate::error::{Result, SplError};
use crate::fx;

/// Trait for reading binary data from a byte slice
pub trait ByteReader {
    /// Read a single unsigned 8-bit integer
    fn read_u8(&mut self) -> Result<u8>;

    /// Read an unsigned 16-bit integer in little-endian format
    fn read_u16_le(&mut self) -> Result<u16>;

    /// Read an unsigned 32-bit integer in little-endian format
    fn read_u32_le(&mut self) -> Result<u32>;

    /// Read exactly `N` bytes
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]>;

    /// Read a signed 16-bit integer in little-endian format
    fn read_i16_le(&mut self) -> Result<i16> {
        Ok(self.read_u16_le()? as i16)
    }

    /// Read a signed 32-bit integer in little-endian format
    fn read_i32_le(&mut self) -> Result<i32> {
        Ok(self.read_u32_le()? as i32)
    }

    /// Read a 20.12 fixed-point value
    fn read_fx32(&mut self) -> Result<f32> {
        Ok(fx::to_float(self.read_i32_le()?))
    }

    /// Read a 4.12 fixed-point value
    fn read_fx16(&mut self) -> Result<f32> {
        Ok(fx::fx16_to_float(self.read_i16_le()?))
    }

    /// Read three 20.12 fixed-point components
    fn read_vec_fx32(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_fx32()?,
            self.read_fx32()?,
            self.read_fx32()?,
        ))
    }

    /// Read three 4.12 fixed-point components
    fn read_vec_fx16(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_fx16()?,
            self.read_fx16()?,
            self.read_fx16()?,
        ))
    }
}

/// A cursor for reading binary data from a byte slice
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    /// Offset of `data[0]` within the whole file, for error reporting
    base: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the beginning of the data
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            base: 0,
        }
    }

    /// Create a cursor over a sub-slice that starts at `base` in the file
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            position: 0,
            base,
        }
    }

    /// Current position relative to the start of the slice
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Advance the position by `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(SplError::UnexpectedEof {
                offset: self.base + self.position,
                wanted: n,
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}

impl ByteReader for Cursor<'_> {
    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// Extract `width` bits starting at `shift`
#[inline]
pub(crate) fn bits(value: u32, shift: u32, width: u32) -> u32 {
    (value >> shift) & ((1u32 << width) - 1)
}

#[inline]
pub(crate) fn bit(value: u32, shift: u32) -> bool {
    bits(value, shift, 1) != 0
}
