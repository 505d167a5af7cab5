// SPDX-License-Identifier: Apache-2.0

//! Protobuf wire-format primitives: tags, wire types, scalar encodings, and
//! packed-repeated framing. Everything here operates against the
//! [`Readable`]/[`Writable`] capability sets so it works uniformly over any
//! [`crate::buffer::BufferedData`] variant.
//!
//! All fixed-width integer and floating-point fields are little-endian on
//! the wire, per the Protocol Buffers specification, regardless of the
//! buffer's own default order.

use crate::error::{CodecError, Result};
use crate::random_access::Endian;
use crate::sequential::{Readable, Writable};
use crate::varint;

/// Wire types used by the Protocol Buffers encoding. Group start/end (3, 4)
/// are recognized only so parsing can reject them with a clear error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// Varint-encoded scalar.
    Varint = 0,
    /// 8-byte fixed-width scalar.
    Fixed64 = 1,
    /// Varint length prefix followed by that many bytes.
    LengthDelimited = 2,
    /// 4-byte fixed-width scalar.
    Fixed32 = 5,
}

impl WireType {
    /// Decodes the 3-bit wire-type code from a tag's low bits.
    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            3 | 4 => Err(CodecError::MalformedEncoding(
                "group start/end wire types are not supported".to_string(),
            )),
            other => Err(CodecError::MalformedEncoding(format!(
                "unrecognized wire type {other}"
            ))),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// The smallest legal protobuf field number.
pub const MIN_FIELD_NUMBER: u32 = 1;

/// The largest legal protobuf field number (29-bit limit).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// A decoded or to-be-encoded `(field_number, wire_type)` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// The field number this tag identifies.
    pub field_number: u32,
    /// How the payload following this tag is framed.
    pub wire_type: WireType,
}

impl Tag {
    /// Composes a tag: `(field_number << 3) | wire_type`.
    pub fn new(field_number: u32, wire_type: WireType) -> Result<Self> {
        if !(MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&field_number) {
            return Err(CodecError::Argument(format!(
                "field number {field_number} out of range [{MIN_FIELD_NUMBER}, {MAX_FIELD_NUMBER}]"
            )));
        }
        Ok(Tag {
            field_number,
            wire_type,
        })
    }

    fn encoded(self) -> u64 {
        ((self.field_number << 3) | self.wire_type.as_u32()) as u64
    }

    /// Number of bytes this tag occupies on the wire.
    #[must_use]
    pub fn encoded_len(self) -> usize {
        varint::encoded_len(self.encoded())
    }

    /// Writes this tag to `out`.
    pub fn write(self, out: &mut impl Writable) -> Result<()> {
        out.write_var_long(self.encoded() as i64, false)
    }

    /// Reads the next tag from `input`. Fails with malformed-encoding if the
    /// wire-type bits decode to group start/end.
    pub fn read(input: &mut impl Readable) -> Result<Self> {
        let raw = input.read_var_long(false)? as u64;
        let field_number = (raw >> 3) as u32;
        let wire_type = WireType::from_u8((raw & 0x7) as u8)?;
        Tag::new(field_number, wire_type)
    }
}

/// Writes an unsigned varint scalar value (INT32/INT64/UINT32/UINT64/ENUM).
pub fn write_varint_scalar(out: &mut impl Writable, value: u64) -> Result<()> {
    out.write_var_long(value as i64, false)
}

/// Reads an unsigned varint scalar value.
pub fn read_varint_scalar(input: &mut impl Readable) -> Result<u64> {
    Ok(input.read_var_long(false)? as u64)
}

/// Writes a zig-zag encoded varint scalar value (SINT32/SINT64).
pub fn write_zigzag_scalar(out: &mut impl Writable, value: i64) -> Result<()> {
    out.write_var_long(value, true)
}

/// Reads a zig-zag encoded varint scalar value.
pub fn read_zigzag_scalar(input: &mut impl Readable) -> Result<i64> {
    input.read_var_long(true)
}

/// Writes a BOOL scalar: `0` or `1`.
pub fn write_bool(out: &mut impl Writable, value: bool) -> Result<()> {
    out.write_var_long(if value { 1 } else { 0 }, false)
}

/// Reads a BOOL scalar. Any varint value other than 0 or 1 is malformed —
/// the permissive "any nonzero value is true" reading some protobuf
/// implementations allow is explicitly rejected here.
pub fn read_bool(input: &mut impl Readable) -> Result<bool> {
    let raw = input.read_var_long(false)? as u64;
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::MalformedEncoding(format!(
            "invalid bool varint value {other}, expected 0 or 1"
        ))),
    }
}

/// Writes a FIXED32/SFIXED32 scalar, little-endian.
pub fn write_fixed32(out: &mut impl Writable, value: u32) -> Result<()> {
    out.write_int(value as i32, Endian::Little)
}

/// Reads a FIXED32/SFIXED32 scalar, little-endian.
pub fn read_fixed32(input: &mut impl Readable) -> Result<u32> {
    Ok(input.read_int(Endian::Little)? as u32)
}

/// Writes a FIXED64/SFIXED64 scalar, little-endian.
pub fn write_fixed64(out: &mut impl Writable, value: u64) -> Result<()> {
    out.write_long(value as i64, Endian::Little)
}

/// Reads a FIXED64/SFIXED64 scalar, little-endian.
pub fn read_fixed64(input: &mut impl Readable) -> Result<u64> {
    Ok(input.read_long(Endian::Little)? as u64)
}

/// Writes a FLOAT scalar: IEEE-754 little-endian.
pub fn write_float(out: &mut impl Writable, value: f32) -> Result<()> {
    out.write_float(value, Endian::Little)
}

/// Reads a FLOAT scalar: IEEE-754 little-endian.
pub fn read_float(input: &mut impl Readable) -> Result<f32> {
    input.read_float(Endian::Little)
}

/// Writes a DOUBLE scalar: IEEE-754 little-endian.
pub fn write_double(out: &mut impl Writable, value: f64) -> Result<()> {
    out.write_double(value, Endian::Little)
}

/// Reads a DOUBLE scalar: IEEE-754 little-endian.
pub fn read_double(input: &mut impl Readable) -> Result<f64> {
    input.read_double(Endian::Little)
}

/// Reads a length-delimited payload's varint length prefix, validating it
/// against `max_size` and the bytes actually remaining.
pub fn read_length_prefix(input: &mut impl Readable, max_size: u64) -> Result<usize> {
    let declared = read_varint_scalar(input)?;
    if declared > max_size {
        #[cfg(feature = "tracing")]
        tracing::debug!(declared, max = max_size, "length prefix exceeds size limit");
        return Err(CodecError::SizeLimitExceeded {
            declared,
            max: max_size,
        });
    }
    let remaining = input.remaining() as u64;
    if declared > remaining {
        return Err(CodecError::Underflow {
            needed: declared as usize,
            remaining: remaining as usize,
        });
    }
    Ok(declared as usize)
}

/// Writes a length prefix followed by `payload`.
pub fn write_length_delimited(out: &mut impl Writable, payload: &[u8]) -> Result<()> {
    write_varint_scalar(out, payload.len() as u64)?;
    out.write_bytes(payload)
}

/// Encodes a packed repeated varint field's payload (values only, caller
/// writes the tag and length prefix).
#[must_use]
pub fn encode_packed_varints(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        varint::encode_u64(v, &mut out);
    }
    out
}

/// Decodes a packed repeated varint payload into its constituent values.
pub fn decode_packed_varints(payload: &[u8]) -> Result<Vec<u64>> {
    let mut values = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let (value, next) = varint::decode_u64(payload, pos)?;
        values.push(value);
        pos = next;
    }
    Ok(values)
}

/// Encodes a packed repeated FIXED32 field's payload.
#[must_use]
pub fn encode_packed_fixed32(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decodes a packed repeated FIXED32 payload.
pub fn decode_packed_fixed32(payload: &[u8]) -> Result<Vec<u32>> {
    if payload.len() % 4 != 0 {
        return Err(CodecError::MalformedEncoding(
            "packed fixed32 payload length is not a multiple of 4".to_string(),
        ));
    }
    Ok(payload
        .chunks_exact(4)
        .map(|c| {
            #[allow(clippy::expect_used)]
            u32::from_le_bytes(c.try_into().expect("chunk size is 4"))
        })
        .collect())
}

/// Encodes a packed repeated FIXED64 field's payload.
#[must_use]
pub fn encode_packed_fixed64(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decodes a packed repeated FIXED64 payload.
pub fn decode_packed_fixed64(payload: &[u8]) -> Result<Vec<u64>> {
    if payload.len() % 8 != 0 {
        return Err(CodecError::MalformedEncoding(
            "packed fixed64 payload length is not a multiple of 8".to_string(),
        ));
    }
    Ok(payload
        .chunks_exact(8)
        .map(|c| {
            #[allow(clippy::expect_used)]
            u64::from_le_bytes(c.try_into().expect("chunk size is 8"))
        })
        .collect())
}

/// Skips the payload following a tag whose field number is not recognized
/// and `parse_unknown_fields` is disabled.
pub fn skip_field(input: &mut impl Readable, wire_type: WireType, max_size: u64) -> Result<()> {
    match wire_type {
        WireType::Varint => {
            read_varint_scalar(input)?;
        }
        WireType::Fixed32 => {
            input.skip(4)?;
        }
        WireType::Fixed64 => {
            input.skip(8)?;
        }
        WireType::LengthDelimited => {
            let len = read_length_prefix(input, max_size)?;
            input.skip(len)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferedData;

    #[test]
    fn tag_round_trip() {
        let mut buf = BufferedData::allocate(8);
        let tag = Tag::new(1, WireType::Varint).unwrap();
        tag.write(&mut buf).unwrap();
        buf.flip();
        assert_eq!(Tag::read(&mut buf).unwrap(), tag);
    }

    #[test]
    fn malformed_tag_rejects_group_wire_types() {
        let mut buf = BufferedData::allocate(8);
        // field 1, wire type 3 (GROUP_START) = (1 << 3) | 3 = 11
        buf.write_var_long(11, false).unwrap();
        buf.flip();
        let err = Tag::read(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEncoding(_)));
    }

    #[test]
    fn bool_accepts_only_zero_and_one() {
        let mut buf = BufferedData::allocate(8);
        buf.write_var_long(2, false).unwrap();
        buf.flip();
        let err = read_bool(&mut buf).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEncoding(_)));
    }

    #[test]
    fn size_limit_exceeded_even_with_input_remaining() {
        let mut buf = BufferedData::allocate(64);
        write_varint_scalar(&mut buf, 1000).unwrap();
        buf.write_bytes(&vec![0u8; 60]).unwrap();
        buf.flip();
        let err = read_length_prefix(&mut buf, 10).unwrap_err();
        assert!(matches!(err, CodecError::SizeLimitExceeded { .. }));
    }

    #[test]
    fn packed_repeated_int32_literal() {
        // {list: [1, 300, -1]} under proto3 packed semantics, -1 truncated
        // to an int32 still costs a full 10-byte varint on the wire.
        let values: Vec<u64> = vec![1, 300, 0xFFFF_FFFF];
        let payload = encode_packed_varints(&[1, 300]);
        assert_eq!(payload, vec![0x01, 0xAC, 0x02]);
        let mut full = payload.clone();
        // encode -1 as a 32-bit value sign-extended through the full 10
        // byte varint, matching protobuf's int32-in-varint behavior.
        let neg_one_32: i32 = -1;
        let mut neg_encoded = Vec::new();
        varint::encode_u64(neg_one_32 as i64 as u64, &mut neg_encoded);
        full.extend_from_slice(&neg_encoded);
        assert_eq!(
            full,
            vec![
                0x01, 0xAC, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01
            ]
        );
        let _ = values;
    }
}
