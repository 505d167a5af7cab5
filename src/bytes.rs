// SPDX-License-Identifier: Apache-2.0

//! [`Bytes`]: an immutable, shareable, sliceable byte sequence with
//! structural equality, ordering, and zero-copy slicing.
//!
//! Grounded on the `bytes::Bytes`-shaped design referenced by
//! `libdd-tinybytes` in the teacher workspace: an `Arc`-backed array plus a
//! `(start, len)` window, so that `slice` is O(1) and shares storage with
//! its origin. The owning contract documented at [`Bytes::wrap`] — the
//! backing array must not be mutated through any alias for the lifetime of
//! any `Bytes` built from it — mirrors the same contract on the teacher's
//! `wrap` constructors.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::error::{CodecError, Result};
use crate::random_access::RandomAccessData;
use crate::sequential::{Readable, SequentialData};

/// An immutable view over a contiguous byte region.
///
/// Cloning a `Bytes` is O(1): it bumps a reference count on the shared
/// backing array rather than copying data. [`Bytes::slice`] is likewise
/// O(1) and produces a `Bytes` that shares the same backing array as its
/// parent.
///
/// # Safety / aliasing contract
///
/// The backing array is assumed not to change for as long as any `Bytes`
/// built from it is alive. Callers who hand a `Vec<u8>` to [`Bytes::wrap`]
/// must not retain another handle capable of mutating it afterwards.
#[derive(Clone)]
pub struct Bytes {
    array: Arc<[u8]>,
    start: usize,
    len: usize,
}

impl Bytes {
    /// Wraps an owned byte vector, taking ownership of the whole thing.
    #[must_use]
    pub fn wrap(data: Vec<u8>) -> Self {
        let array: Arc<[u8]> = Arc::from(data.into_boxed_slice());
        let len = array.len();
        Bytes {
            array,
            start: 0,
            len,
        }
    }

    /// Wraps `off..off+len` of an already-shared array, without copying.
    pub fn wrap_range(array: Arc<[u8]>, off: usize, len: usize) -> Result<Self> {
        if off.checked_add(len).map_or(true, |end| end > array.len()) {
            return Err(CodecError::OutOfBounds {
                offset: off,
                length: len,
                region_len: array.len(),
            });
        }
        Ok(Bytes {
            array,
            start: off,
            len,
        })
    }

    /// UTF-8 encodes `s` and wraps the result.
    #[must_use]
    pub fn wrap_str(s: &str) -> Self {
        Bytes::wrap(s.as_bytes().to_vec())
    }

    /// Decodes `s` as standard base64 and wraps the result.
    pub fn from_base64(s: &str) -> Result<Self> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|e| CodecError::MalformedEncoding(format!("invalid base64: {e}")))?;
        Ok(Bytes::wrap(decoded))
    }

    /// Decodes `s` as hexadecimal and wraps the result.
    pub fn from_hex(s: &str) -> Result<Self> {
        let decoded =
            hex::decode(s).map_err(|e| CodecError::MalformedEncoding(format!("invalid hex: {e}")))?;
        Ok(Bytes::wrap(decoded))
    }

    /// The zero-length `Bytes` value.
    #[must_use]
    pub fn empty() -> Self {
        Bytes {
            array: Arc::from(Vec::new().into_boxed_slice()),
            start: 0,
            len: 0,
        }
    }

    /// Borrows this region as an ordinary byte slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.array[self.start..self.start + self.len]
    }

    /// Returns a zero-copy slice `[off, off+len)` sharing this `Bytes`'s
    /// backing array. Returns [`Bytes::empty`] when `len == 0`.
    pub fn slice(&self, off: usize, len: usize) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::empty());
        }
        if off.checked_add(len).map_or(true, |end| end > self.len) {
            return Err(CodecError::OutOfBounds {
                offset: off,
                length: len,
                region_len: self.len,
            });
        }
        Ok(Bytes {
            array: Arc::clone(&self.array),
            start: self.start + off,
            len,
        })
    }

    /// Alias for [`Bytes::slice`], matching the wire-codec naming used when
    /// reading a length-delimited field.
    pub fn get_bytes_slice(&self, off: usize, len: usize) -> Result<Bytes> {
        self.slice(off, len)
    }

    /// Decodes the full region as UTF-8 text, copying it into a new
    /// `String`.
    pub fn as_utf8_string_full(&self) -> Result<String> {
        Ok(std::str::from_utf8(self.as_slice())?.to_owned())
    }

    /// Unsigned lexicographic byte comparison with a length tiebreak
    /// (shorter is less, when one is a prefix of the other).
    #[must_use]
    pub fn compare_to(&self, other: &Bytes) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }

    /// Returns a new `Bytes` containing `self` followed by `other`. Unlike
    /// `slice`, this allocates a fresh backing array since the two inputs
    /// are not necessarily contiguous in memory.
    #[must_use]
    pub fn append(&self, other: &Bytes) -> Bytes {
        let mut combined = Vec::with_capacity(self.len + other.len);
        combined.extend_from_slice(self.as_slice());
        combined.extend_from_slice(other.as_slice());
        Bytes::wrap(combined)
    }

    /// Streams this region's content to `sink` without an intermediate
    /// copy beyond what `Write` itself requires. Works for any sink that
    /// implements [`std::io::Write`], including hash digests (most
    /// `RustCrypto` digests implement `Write` via incremental `update`)
    /// and plain output streams.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(self.as_slice())?;
        Ok(())
    }

    /// Returns a byte-stream reader over the full region. A read at EOF
    /// returns `Ok(0)`, the end-of-stream sentinel for [`std::io::Read`].
    /// Each call produces an independent reader sharing the same backing
    /// array.
    #[must_use]
    pub fn to_input_stream(&self) -> BytesReader {
        BytesReader {
            bytes: self.clone(),
            pos: 0,
        }
    }

    /// Returns a [`Readable`] sequential view over the full region,
    /// independent of any other view created from the same `Bytes`.
    #[must_use]
    pub fn to_readable_sequential(&self) -> BytesReadable {
        BytesReadable {
            bytes: self.clone(),
            pos: 0,
        }
    }

    /// Returns a deep copy with its own, non-shared backing array.
    #[must_use]
    pub fn replicate(&self) -> Bytes {
        Bytes::wrap(self.as_slice().to_vec())
    }
}

impl RandomAccessData for Bytes {
    fn length(&self) -> usize {
        self.len
    }

    fn get_unsigned_byte(&self, offset: usize) -> Result<u8> {
        self.as_slice().get(offset).copied().ok_or(CodecError::OutOfBounds {
            offset,
            length: 1,
            region_len: self.len,
        })
    }

    fn get_bytes(&self, offset: usize, dst: &mut [u8], dst_off: usize, max_len: usize) -> Result<usize> {
        self.check_offset(offset)?;
        let available = self.len - offset;
        let n = max_len.min(available).min(dst.len().saturating_sub(dst_off));
        dst[dst_off..dst_off + n].copy_from_slice(&self.as_slice()[offset..offset + n]);
        Ok(n)
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Bytes {}

impl PartialOrd for Bytes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Ord for Bytes {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other)
    }
}

impl Hash for Bytes {
    /// Hashes by content only — never by identity or by the internal
    /// `start` offset — so that two `Bytes` comparing equal always hash
    /// equal, including a `slice()` of one array and an independently
    /// wrapped array with the same content.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bytes")
            .field("hex", &hex::encode(self.as_slice()))
            .finish()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(data: Vec<u8>) -> Self {
        Bytes::wrap(data)
    }
}

impl From<&[u8]> for Bytes {
    fn from(data: &[u8]) -> Self {
        Bytes::wrap(data.to_vec())
    }
}

/// A [`std::io::Read`] adapter over a [`Bytes`] region, produced by
/// [`Bytes::to_input_stream`].
pub struct BytesReader {
    bytes: Bytes,
    pos: usize,
}

impl Read for BytesReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.bytes.length() - self.pos;
        let n = remaining.min(buf.len());
        let copied = self
            .bytes
            .get_bytes(self.pos, buf, 0, n)
            .map_err(io::Error::other)?;
        self.pos += copied;
        Ok(copied)
    }
}

/// A [`Readable`] sequential adapter over a [`Bytes`] region, produced by
/// [`Bytes::to_readable_sequential`].
pub struct BytesReadable {
    bytes: Bytes,
    pos: usize,
}

impl SequentialData for BytesReadable {
    fn position(&self) -> usize {
        self.pos
    }

    fn set_position(&mut self, p: usize) -> Result<()> {
        if p > self.bytes.length() {
            return Err(CodecError::OutOfBounds {
                offset: p,
                length: 0,
                region_len: self.bytes.length(),
            });
        }
        self.pos = p;
        Ok(())
    }

    fn limit(&self) -> usize {
        self.bytes.length()
    }

    fn set_limit(&mut self, _l: usize) -> Result<()> {
        Err(CodecError::Argument(
            "BytesReadable's limit is fixed to the underlying Bytes length".to_string(),
        ))
    }

    fn capacity(&self) -> usize {
        self.bytes.length()
    }
}

impl Readable for BytesReadable {
    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_unsigned_byte()? as i8)
    }

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        let b = self.bytes.get_unsigned_byte(self.pos)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let n = dst.len();
        if self.bytes.length() - self.pos < n {
            return Err(CodecError::Underflow {
                needed: n,
                remaining: self.bytes.length() - self.pos,
            });
        }
        let copied = self.bytes.get_bytes(self.pos, dst, 0, n)?;
        self.pos += copied;
        Ok(())
    }

    fn read_var_long(&mut self, zigzag: bool) -> Result<i64> {
        let (value, consumed) = self.bytes.get_var_long(self.pos, zigzag)?;
        self.pos += consumed;
        Ok(value)
    }
}
