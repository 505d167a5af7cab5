// SPDX-License-Identifier: Apache-2.0

//! The `RandomAccessData` capability: reading bytes at arbitrary absolute
//! offsets without moving any cursor. Implemented by [`crate::bytes::Bytes`]
//! and, over its own region, by [`crate::buffer::BufferedData`].

use crate::error::{CodecError, Result};
use crate::varint;

/// Byte order used for multi-byte scalar reads. Protobuf fixed-width fields
/// are always little-endian on the wire (see [`crate::wire`]); this type
/// exists so the buffer/byte-sequence primitives stay usable for non-wire
/// purposes too, with big-endian as the conventional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first. What the wire format uses.
    Little,
}

/// Capability set for reading bytes at arbitrary absolute offsets.
///
/// All offsets are relative to the start of the implementor's own logical
/// region; `length()` is the number of addressable bytes. Methods never
/// mutate any cursor.
pub trait RandomAccessData {
    /// Number of addressable bytes in this region.
    fn length(&self) -> usize;

    /// The signed byte value at `offset`.
    fn get_byte(&self, offset: usize) -> Result<i8> {
        Ok(self.get_unsigned_byte(offset)? as i8)
    }

    /// The unsigned byte value at `offset`.
    fn get_unsigned_byte(&self, offset: usize) -> Result<u8>;

    /// Copies `min(max_len, length() - offset)` bytes into `dst` starting at
    /// `dst_off`, returning the number of bytes copied.
    fn get_bytes(&self, offset: usize, dst: &mut [u8], dst_off: usize, max_len: usize) -> Result<usize> {
        self.check_offset(offset)?;
        let available = self.length() - offset;
        let n = max_len.min(available).min(dst.len().saturating_sub(dst_off));
        for i in 0..n {
            dst[dst_off + i] = self.get_unsigned_byte(offset + i)?;
        }
        Ok(n)
    }

    /// Reads a 4-byte integer at `offset` using the given byte order.
    fn get_int(&self, offset: usize, order: Endian) -> Result<i32> {
        let bytes = self.read_fixed::<4>(offset)?;
        Ok(match order {
            Endian::Big => i32::from_be_bytes(bytes),
            Endian::Little => i32::from_le_bytes(bytes),
        })
    }

    /// Reads an 8-byte integer at `offset` using the given byte order.
    fn get_long(&self, offset: usize, order: Endian) -> Result<i64> {
        let bytes = self.read_fixed::<8>(offset)?;
        Ok(match order {
            Endian::Big => i64::from_be_bytes(bytes),
            Endian::Little => i64::from_le_bytes(bytes),
        })
    }

    /// Reads a 4-byte IEEE-754 float at `offset`.
    fn get_float(&self, offset: usize, order: Endian) -> Result<f32> {
        Ok(f32::from_bits(self.get_int(offset, order)? as u32))
    }

    /// Reads an 8-byte IEEE-754 double at `offset`.
    fn get_double(&self, offset: usize, order: Endian) -> Result<f64> {
        Ok(f64::from_bits(self.get_long(offset, order)? as u64))
    }

    /// Reads an unsigned varint at `offset`, optionally zig-zag decoding the
    /// result, returning `(value, bytes_consumed)`.
    fn get_var_long(&self, offset: usize, zigzag: bool) -> Result<(i64, usize)> {
        let scratch = self.varint_scratch(offset)?;
        let (raw, consumed) = varint::decode_u64(&scratch, 0)?;
        let value = if zigzag {
            varint::zigzag_decode64(raw)
        } else {
            raw as i64
        };
        Ok((value, consumed))
    }

    /// Same as [`RandomAccessData::get_var_long`] truncated to 32 bits.
    fn get_var_int(&self, offset: usize, zigzag: bool) -> Result<(i32, usize)> {
        let (value, consumed) = self.get_var_long(offset, zigzag)?;
        Ok((value as i32, consumed))
    }

    /// Decodes the UTF-8 text found in `[offset, offset + len)`.
    fn as_utf8_string(&self, offset: usize, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        let copied = self.get_bytes(offset, &mut buf, 0, len)?;
        if copied != len {
            return Err(CodecError::Underflow {
                needed: len,
                remaining: copied,
            });
        }
        Ok(std::str::from_utf8(&buf)?.to_owned())
    }

    /// Whether the `len(prefix)` bytes starting at `offset` equal `prefix`.
    fn contains(&self, offset: usize, prefix: &[u8]) -> Result<bool> {
        if offset.checked_add(prefix.len()).is_none() || offset + prefix.len() > self.length() {
            return Ok(false);
        }
        for (i, expected) in prefix.iter().enumerate() {
            if self.get_unsigned_byte(offset + i)? != *expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `contains(0, prefix)`.
    fn matches_prefix(&self, prefix: &[u8]) -> Result<bool> {
        self.contains(0, prefix)
    }

    /// Validates that `offset` is within `[0, length())`, or that it equals
    /// `length()` (a valid "one past the end" position for a zero-length
    /// read).
    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.length() {
            return Err(CodecError::OutOfBounds {
                offset,
                length: 0,
                region_len: self.length(),
            });
        }
        Ok(())
    }

    /// Reads exactly `N` bytes at `offset` into a fixed-size array, failing
    /// with underflow if fewer remain.
    fn read_fixed<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        self.check_offset(offset)?;
        if offset + N > self.length() {
            return Err(CodecError::Underflow {
                needed: N,
                remaining: self.length() - offset,
            });
        }
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.get_unsigned_byte(offset + i)?;
        }
        Ok(out)
    }

    /// Materializes up to [`varint::MAX_VARINT_BYTES`] bytes starting at
    /// `offset` into a scratch buffer so the shared varint decoder can run
    /// over a contiguous slice regardless of the implementor's storage.
    fn varint_scratch(&self, offset: usize) -> Result<Vec<u8>> {
        self.check_offset(offset)?;
        let available = self.length() - offset;
        let n = available.min(varint::MAX_VARINT_BYTES);
        let mut buf = vec![0u8; n];
        let copied = self.get_bytes(offset, &mut buf, 0, n)?;
        buf.truncate(copied);
        Ok(buf)
    }
}
