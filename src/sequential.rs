// SPDX-License-Identifier: Apache-2.0

//! The sequential cursor contracts: a position/limit-bearing view plus the
//! `Readable` and `Writable` capability sets that specialize it. Only
//! [`crate::buffer::BufferedData`] implements the full set in this crate;
//! [`crate::bytes::Bytes::to_readable_sequential`] adapts a `Bytes` to
//! `Readable` without a backing cursor-bearing buffer.

use crate::error::Result;
use crate::random_access::Endian;

/// A positional cursor over a fixed-capacity byte region.
pub trait SequentialData {
    /// Current read/write position, `0 <= position <= limit`.
    fn position(&self) -> usize;

    /// Moves the cursor to `p`. Implementations clamp or reject `p > limit`
    /// per their own contract; see [`crate::buffer::BufferedData::set_position`].
    fn set_position(&mut self, p: usize) -> Result<()>;

    /// The current limit, `position <= limit <= capacity`.
    fn limit(&self) -> usize;

    /// Sets the limit, clamped into `[position(), capacity()]`.
    fn set_limit(&mut self, l: usize) -> Result<()>;

    /// Total addressable capacity of the region.
    fn capacity(&self) -> usize;

    /// `limit() - position()`.
    fn remaining(&self) -> usize {
        self.limit() - self.position()
    }

    /// `remaining() > 0`.
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Advances the position by `min(n, remaining())`, returning the actual
    /// number of bytes skipped.
    fn skip(&mut self, n: usize) -> Result<usize> {
        let actual = n.min(self.remaining());
        self.set_position(self.position() + actual)?;
        Ok(actual)
    }
}

/// The readable specialization: sequential reads that advance `position`.
pub trait Readable: SequentialData {
    /// Reads one signed byte, advancing the position by 1.
    fn read_byte(&mut self) -> Result<i8>;

    /// Reads one unsigned byte, advancing the position by 1.
    fn read_unsigned_byte(&mut self) -> Result<u8> {
        Ok(self.read_byte()? as u8)
    }

    /// Reads `dst.len()` bytes into `dst`, advancing the position by that
    /// many bytes.
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Reads a 4-byte integer, advancing the position by 4.
    fn read_int(&mut self, order: Endian) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(match order {
            Endian::Big => i32::from_be_bytes(buf),
            Endian::Little => i32::from_le_bytes(buf),
        })
    }

    /// Reads an unsigned 4-byte integer, advancing the position by 4.
    fn read_unsigned_int(&mut self, order: Endian) -> Result<u32> {
        Ok(self.read_int(order)? as u32)
    }

    /// Reads an 8-byte integer, advancing the position by 8.
    fn read_long(&mut self, order: Endian) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(match order {
            Endian::Big => i64::from_be_bytes(buf),
            Endian::Little => i64::from_le_bytes(buf),
        })
    }

    /// Reads a 4-byte IEEE-754 float, advancing the position by 4.
    fn read_float(&mut self, order: Endian) -> Result<f32> {
        Ok(f32::from_bits(self.read_int(order)? as u32))
    }

    /// Reads an 8-byte IEEE-754 double, advancing the position by 8.
    fn read_double(&mut self, order: Endian) -> Result<f64> {
        Ok(f64::from_bits(self.read_long(order)? as u64))
    }

    /// Reads a varint, optionally zig-zag decoding it, advancing the
    /// position by the number of bytes the varint occupied.
    fn read_var_long(&mut self, zigzag: bool) -> Result<i64>;

    /// Same as [`Readable::read_var_long`] truncated to 32 bits.
    fn read_var_int(&mut self, zigzag: bool) -> Result<i32> {
        Ok(self.read_var_long(zigzag)? as i32)
    }
}

/// The writable specialization: sequential writes that advance `position`.
pub trait Writable: SequentialData {
    /// Writes one signed byte, advancing the position by 1.
    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_unsigned_byte(value as u8)
    }

    /// Writes one unsigned byte, advancing the position by 1.
    fn write_unsigned_byte(&mut self, value: u8) -> Result<()>;

    /// Writes all of `src`, advancing the position by `src.len()`.
    fn write_bytes(&mut self, src: &[u8]) -> Result<()>;

    /// Writes a 4-byte integer, advancing the position by 4.
    fn write_int(&mut self, value: i32, order: Endian) -> Result<()> {
        let bytes = match order {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes)
    }

    /// Writes an 8-byte integer, advancing the position by 8.
    fn write_long(&mut self, value: i64, order: Endian) -> Result<()> {
        let bytes = match order {
            Endian::Big => value.to_be_bytes(),
            Endian::Little => value.to_le_bytes(),
        };
        self.write_bytes(&bytes)
    }

    /// Writes a 4-byte IEEE-754 float, advancing the position by 4.
    fn write_float(&mut self, value: f32, order: Endian) -> Result<()> {
        self.write_int(value.to_bits() as i32, order)
    }

    /// Writes an 8-byte IEEE-754 double, advancing the position by 8.
    fn write_double(&mut self, value: f64, order: Endian) -> Result<()> {
        self.write_long(value.to_bits() as i64, order)
    }

    /// Writes a varint, optionally zig-zag encoding it first, advancing the
    /// position by the number of bytes written.
    fn write_var_long(&mut self, value: i64, zigzag: bool) -> Result<()>;

    /// Same as [`Writable::write_var_long`] but for a 32-bit value.
    fn write_var_int(&mut self, value: i32, zigzag: bool) -> Result<()> {
        self.write_var_long(value as i64, zigzag)
    }
}
