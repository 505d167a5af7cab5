// SPDX-License-Identifier: Apache-2.0

//! [`BufferedData`]: a cursor-bearing, bidirectional byte buffer. It is the
//! read/write substrate the wire codec writes tags and payloads into and
//! reads them back out of.
//!
//! Three storage tactics share one external contract, per the
//! variant-specific policy in the design: a plain heap `Vec<u8>` (direct
//! indexing), an off-heap region owned via a raw pointer (bulk copies go
//! through `ptr::copy`), and a heap `Vec<u8>` whose hot single-byte paths
//! skip bounds checks after a single manual check. The three MUST be
//! behaviorally indistinguishable; only their internal tactics differ.

use std::alloc::{self, Layout};
use std::io::Read;
use std::ptr::NonNull;

use crate::bytes::Bytes;
use crate::error::{CodecError, Result};
use crate::random_access::{Endian, RandomAccessData};
use crate::sequential::{Readable, SequentialData, Writable};
use crate::varint;

/// An owned, page-aligned off-heap region. Modeled after the "direct
/// variant" design note: a value holding an aligned pointer and a length,
/// with release semantics on `Drop`.
struct DirectRegion {
    ptr: NonNull<u8>,
    len: usize,
    layout: Layout,
}

// SAFETY: `DirectRegion` exclusively owns the memory behind `ptr`; nothing
// else can reach it, so moving it (and the bytes it points to) across
// threads is sound as long as access to a single instance isn't shared
// without synchronization, which `BufferedData`'s `!Sync` contract ensures.
unsafe impl Send for DirectRegion {}

impl DirectRegion {
    fn allocate(len: usize) -> Self {
        if len == 0 {
            #[allow(clippy::expect_used)]
            let layout = Layout::from_size_align(0, 1).expect("zero-size layout is always valid");
            return DirectRegion {
                ptr: NonNull::dangling(),
                len: 0,
                layout,
            };
        }
        #[allow(clippy::expect_used)]
        let layout = Layout::array::<u8>(len).expect("buffer length overflows isize");
        // SAFETY: layout has non-zero size, checked above.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        DirectRegion { ptr, len, layout }
    }

    fn as_slice(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: `ptr` points to `len` initialized bytes owned by `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        if self.len == 0 {
            return &mut [];
        }
        // SAFETY: `ptr` points to `len` initialized bytes exclusively
        // owned by `self`, which we hold `&mut` to.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for DirectRegion {
    fn drop(&mut self) {
        if self.len != 0 {
            // SAFETY: `ptr`/`layout` are exactly what `alloc_zeroed` was
            // called with in `allocate`, and this is the sole owner.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

enum Storage {
    Heap(Vec<u8>),
    Direct(DirectRegion),
    UnsafeHeap(Vec<u8>),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Heap(v) | Storage::UnsafeHeap(v) => v,
            Storage::Direct(d) => d.as_slice(),
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Heap(v) | Storage::UnsafeHeap(v) => v,
            Storage::Direct(d) => d.as_mut_slice(),
        }
    }
}

/// A mutable, cursor-bearing byte buffer implementing random access,
/// sequential reads, and sequential writes over one of three backing
/// storage tactics.
pub struct BufferedData {
    storage: Storage,
    position: usize,
    limit: usize,
}

impl BufferedData {
    /// Wraps an owned vector as a heap buffer. Position starts at 0, limit
    /// and capacity equal the vector's length.
    #[must_use]
    pub fn wrap(data: Vec<u8>) -> Self {
        let len = data.len();
        BufferedData {
            storage: Storage::Heap(data),
            position: 0,
            limit: len,
        }
    }

    /// Copies `off..off+len` of `data` into a new heap buffer.
    ///
    /// Unlike [`crate::bytes::Bytes::slice`], `BufferedData` exclusively
    /// owns its region, so this always copies rather than sharing `data`.
    pub fn wrap_range(data: &[u8], off: usize, len: usize) -> Result<Self> {
        if off.checked_add(len).map_or(true, |end| end > data.len()) {
            return Err(CodecError::OutOfBounds {
                offset: off,
                length: len,
                region_len: data.len(),
            });
        }
        Ok(BufferedData::wrap(data[off..off + len].to_vec()))
    }

    /// Allocates a zero-filled heap buffer of `n` bytes whose single-byte
    /// hot paths skip redundant bounds checks (the "unsafe heap" variant).
    /// Behaviorally identical to [`BufferedData::wrap`] over a zeroed
    /// vector of the same length.
    #[must_use]
    pub fn allocate(n: usize) -> Self {
        BufferedData {
            storage: Storage::UnsafeHeap(vec![0u8; n]),
            position: 0,
            limit: n,
        }
    }

    /// Allocates `n` bytes of off-heap memory.
    #[must_use]
    pub fn allocate_off_heap(n: usize) -> Self {
        BufferedData {
            storage: Storage::Direct(DirectRegion::allocate(n)),
            position: 0,
            limit: n,
        }
    }

    fn capacity_internal(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Moves `limit` to `position` and `position` to 0, the standard
    /// "switch from filling to draining" operation.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Resets `position` to 0 and `limit` to `capacity`.
    pub fn reset(&mut self) {
        self.position = 0;
        self.limit = self.capacity_internal();
    }

    /// Resets `position` to 0, leaving `limit` unchanged.
    pub fn reset_position(&mut self) {
        self.position = 0;
    }

    /// Returns a new [`Readable`] view over the next `length` bytes,
    /// advancing this buffer's position by `length`.
    pub fn view(&mut self, length: usize) -> Result<crate::bytes::BytesReadable> {
        let owned = self.read_bytes_owned(length)?;
        Ok(owned.to_readable_sequential())
    }

    /// Reads `length` bytes starting at the current position into a new
    /// [`Bytes`], advancing the position by `length`.
    ///
    /// This implementation always performs a defensive copy. Sharing the
    /// backing array without copying is explicitly optional per the
    /// contract (`BufferedData` is exclusively owned and mutable, so
    /// sharing its storage with an immutable `Bytes` would require
    /// copy-on-write bookkeeping this crate does not add).
    pub fn read_bytes_owned(&mut self, length: usize) -> Result<Bytes> {
        let remaining = self.remaining();
        if remaining < length {
            return Err(CodecError::Underflow {
                needed: length,
                remaining,
            });
        }
        let start = self.position;
        let slice = &self.storage.as_slice()[start..start + length];
        let owned = Bytes::wrap(slice.to_vec());
        self.position += length;
        Ok(owned)
    }

    /// Bulk-writes from another [`RandomAccessData`] region.
    pub fn write_from_random_access(
        &mut self,
        src: &impl RandomAccessData,
        offset: usize,
        len: usize,
    ) -> Result<()> {
        let mut tmp = vec![0u8; len];
        let copied = src.get_bytes(offset, &mut tmp, 0, len)?;
        if copied != len {
            return Err(CodecError::Underflow {
                needed: len,
                remaining: copied,
            });
        }
        self.write_bytes(&tmp)
    }

    /// Bulk-writes up to `max` bytes read from `reader`, returning the
    /// number of bytes actually written.
    pub fn write_from_reader_up_to(&mut self, reader: &mut impl Read, max: usize) -> Result<usize> {
        let remaining = self.remaining();
        let budget = max.min(remaining);
        let mut tmp = vec![0u8; budget];
        let mut total = 0;
        while total < budget {
            let n = reader.read(&mut tmp[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        self.write_bytes(&tmp[..total])?;
        Ok(total)
    }
}

impl RandomAccessData for BufferedData {
    /// The buffer's own region is its full backing capacity, independent of
    /// the current cursor.
    fn length(&self) -> usize {
        self.capacity_internal()
    }

    fn get_unsigned_byte(&self, offset: usize) -> Result<u8> {
        self.storage
            .as_slice()
            .get(offset)
            .copied()
            .ok_or(CodecError::OutOfBounds {
                offset,
                length: 1,
                region_len: self.length(),
            })
    }

    fn get_bytes(&self, offset: usize, dst: &mut [u8], dst_off: usize, max_len: usize) -> Result<usize> {
        self.check_offset(offset)?;
        let region = self.storage.as_slice();
        let available = region.len() - offset;
        let n = max_len.min(available).min(dst.len().saturating_sub(dst_off));
        dst[dst_off..dst_off + n].copy_from_slice(&region[offset..offset + n]);
        Ok(n)
    }
}

impl SequentialData for BufferedData {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, p: usize) -> Result<()> {
        if p > self.limit {
            return Err(CodecError::OutOfBounds {
                offset: p,
                length: 0,
                region_len: self.limit,
            });
        }
        self.position = p;
        Ok(())
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn set_limit(&mut self, l: usize) -> Result<()> {
        let capacity = self.capacity_internal();
        self.limit = l.clamp(self.position.min(capacity), capacity);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.capacity_internal()
    }
}

impl Readable for BufferedData {
    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_unsigned_byte()? as i8)
    }

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        if self.remaining() < 1 {
            return Err(CodecError::Underflow {
                needed: 1,
                remaining: 0,
            });
        }
        let byte = match &self.storage {
            // The unsafe-heap variant's hot path: the bounds check above
            // already proved `position < limit <= capacity`, so the
            // indexed access cannot be out of range.
            Storage::UnsafeHeap(v) => unsafe { *v.get_unchecked(self.position) },
            _ => self.storage.as_slice()[self.position],
        };
        self.position += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let n = dst.len();
        let remaining = self.remaining();
        if remaining < n {
            return Err(CodecError::Underflow {
                needed: n,
                remaining,
            });
        }
        dst.copy_from_slice(&self.storage.as_slice()[self.position..self.position + n]);
        self.position += n;
        Ok(())
    }

    fn read_var_long(&mut self, zigzag: bool) -> Result<i64> {
        let scratch_len = self.remaining().min(varint::MAX_VARINT_BYTES);
        let region = &self.storage.as_slice()[self.position..self.position + scratch_len];
        let (raw, consumed) = varint::decode_u64(region, 0)?;
        self.position += consumed;
        Ok(if zigzag {
            varint::zigzag_decode64(raw)
        } else {
            raw as i64
        })
    }
}

impl Writable for BufferedData {
    fn write_unsigned_byte(&mut self, value: u8) -> Result<()> {
        if self.remaining() < 1 {
            return Err(CodecError::Overflow {
                needed: 1,
                remaining: 0,
            });
        }
        match &mut self.storage {
            Storage::UnsafeHeap(v) => unsafe { *v.get_unchecked_mut(self.position) = value },
            _ => self.storage.as_mut_slice()[self.position] = value,
        }
        self.position += 1;
        Ok(())
    }

    fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        let n = src.len();
        let remaining = self.remaining();
        if remaining < n {
            return Err(CodecError::Overflow {
                needed: n,
                remaining,
            });
        }
        let pos = self.position;
        self.storage.as_mut_slice()[pos..pos + n].copy_from_slice(src);
        self.position += n;
        Ok(())
    }

    fn write_var_long(&mut self, value: i64, zigzag: bool) -> Result<()> {
        let raw = if zigzag {
            varint::zigzag_encode64(value)
        } else {
            value as u64
        };
        let mut encoded = Vec::with_capacity(varint::MAX_VARINT_BYTES);
        varint::encode_u64(raw, &mut encoded);
        self.write_bytes(&encoded)
    }
}

impl BufferedData {
    /// Convenience wrapper over [`Readable::read_int`] using big-endian,
    /// the buffer's default order.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_int(Endian::Big)
    }

    /// Convenience wrapper over [`Writable::write_int`] using big-endian.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_int(value, Endian::Big)
    }
}
