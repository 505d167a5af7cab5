// SPDX-License-Identifier: Apache-2.0

//! Adapters between this crate's [`Readable`]/[`Writable`] cursors and plain
//! [`std::io::Read`]/[`std::io::Write`] streams, for callers whose input
//! isn't already a [`Bytes`] or [`BufferedData`] — a socket, a file, or any
//! other byte-oriented stream.

use std::io::{Read, Write};

use crate::buffer::BufferedData;
use crate::bytes::Bytes;
use crate::codec::Codec;
use crate::error::{CodecError, Result};
use crate::guards::ParseOptions;
use crate::sequential::SequentialData;

/// Reads all of `reader` into a single in-memory buffer, failing with
/// [`CodecError::SizeLimitExceeded`] rather than growing unbounded if the
/// stream turns out to exceed `max_size`.
pub fn read_to_buffer(reader: &mut impl Read, max_size: u64) -> Result<BufferedData> {
    let mut raw = Vec::new();
    let limit = max_size as usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        if raw.len() + n > limit {
            return Err(CodecError::SizeLimitExceeded {
                declared: (raw.len() + n) as u64,
                max: max_size,
            });
        }
        raw.extend_from_slice(&chunk[..n]);
    }
    Ok(BufferedData::wrap(raw))
}

/// Parses a single top-level message out of `reader`, consuming the whole
/// stream (protobuf messages are not self-delimiting at the top level —
/// framing, if any, is the caller's concern via [`write_length_delimited_message`]
/// and [`read_length_delimited_message`]).
pub fn parse_from_reader<C: Codec>(reader: &mut impl Read, options: &ParseOptions) -> Result<C> {
    let mut buffer = read_to_buffer(reader, options.max_size())?;
    C::parse(&mut buffer, options)
}

/// Writes `message`'s encoded bytes to `sink` with no additional framing.
pub fn write_to_writer<C: Codec>(message: &C, sink: &mut impl Write) -> Result<()> {
    let bytes = message.to_bytes()?;
    bytes.write_to(sink)
}

/// Writes `message` to `sink` preceded by a varint length prefix, the
/// common self-delimiting framing for messages sent back to back over a
/// single stream.
pub fn write_length_delimited_message<C: Codec>(message: &C, sink: &mut impl Write) -> Result<()> {
    let bytes = message.to_bytes()?;
    let mut framed = BufferedData::allocate(
        crate::varint::encoded_len(bytes.length() as u64) + bytes.length(),
    );
    crate::wire::write_length_delimited(&mut framed, bytes.as_slice())?;
    framed.flip();
    let owned = framed.read_bytes_owned(framed.remaining())?;
    owned.write_to(sink)
}

/// Reads one length-prefixed message from `reader`, the counterpart to
/// [`write_length_delimited_message`].
pub fn read_length_delimited_message<C: Codec>(
    reader: &mut impl Read,
    options: &ParseOptions,
) -> Result<C> {
    let mut len_bytes = Vec::new();
    let mut one = [0u8; 1];
    loop {
        let n = reader.read(&mut one)?;
        if n == 0 {
            return Err(CodecError::Underflow {
                needed: 1,
                remaining: 0,
            });
        }
        let more = one[0] & 0x80 != 0;
        len_bytes.push(one[0]);
        if !more {
            break;
        }
        if len_bytes.len() > crate::varint::MAX_VARINT_BYTES {
            return Err(CodecError::MalformedEncoding(
                "length prefix varint exceeds 10 bytes".to_string(),
            ));
        }
    }
    let (declared, _) = crate::varint::decode_u64(&len_bytes, 0)?;
    if declared > options.max_size() {
        return Err(CodecError::SizeLimitExceeded {
            declared,
            max: options.max_size(),
        });
    }
    let mut payload = vec![0u8; declared as usize];
    reader.read_exact(&mut payload)?;
    let mut buffer = BufferedData::wrap(payload);
    C::parse(&mut buffer, options)
}

/// Wraps raw bytes as a standalone readable region, the entry point for
/// callers who already hold the full message in memory.
#[must_use]
pub fn from_bytes(data: Vec<u8>) -> Bytes {
    Bytes::wrap(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential::Writable;

    #[derive(Debug, PartialEq, Eq)]
    struct Pair {
        a: i64,
        b: i64,
    }

    impl Codec for Pair {
        fn write<W: Writable>(&self, out: &mut W) -> Result<()> {
            crate::wire::Tag::new(1, crate::wire::WireType::Varint)?.write(out)?;
            crate::wire::write_varint_scalar(out, self.a as u64)?;
            crate::wire::Tag::new(2, crate::wire::WireType::Varint)?.write(out)?;
            crate::wire::write_varint_scalar(out, self.b as u64)?;
            Ok(())
        }

        fn parse<R: crate::sequential::Readable>(
            input: &mut R,
            _options: &ParseOptions,
        ) -> Result<Self> {
            let mut a = 0;
            let mut b = 0;
            while input.has_remaining() {
                let tag = crate::wire::Tag::read(input)?;
                let value = crate::wire::read_varint_scalar(input)? as i64;
                match tag.field_number {
                    1 => a = value,
                    2 => b = value,
                    _ => {}
                }
            }
            Ok(Pair { a, b })
        }
    }

    #[test]
    fn round_trips_through_plain_writer_and_reader() {
        let original = Pair { a: 1, b: 2 };
        let mut out = Vec::new();
        write_to_writer(&original, &mut out).unwrap();

        let options = ParseOptions::default();
        let parsed: Pair = parse_from_reader(&mut &out[..], &options).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn round_trips_length_delimited_framing_back_to_back() {
        let first = Pair { a: 10, b: 20 };
        let second = Pair { a: 30, b: 40 };
        let mut out = Vec::new();
        write_length_delimited_message(&first, &mut out).unwrap();
        write_length_delimited_message(&second, &mut out).unwrap();

        let options = ParseOptions::default();
        let mut cursor = &out[..];
        let parsed_first: Pair = read_length_delimited_message(&mut cursor, &options).unwrap();
        let parsed_second: Pair = read_length_delimited_message(&mut cursor, &options).unwrap();
        assert_eq!(parsed_first, first);
        assert_eq!(parsed_second, second);
    }

    #[test]
    fn oversized_stream_is_rejected() {
        let data = vec![0u8; 128];
        let mut reader = &data[..];
        let err = read_to_buffer(&mut reader, 16).unwrap_err();
        assert!(matches!(err, CodecError::SizeLimitExceeded { .. }));
    }
}
