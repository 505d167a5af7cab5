// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios exercising the codec core the way a generated
//! message type would: hand-written `Codec` implementations standing in
//! for what a schema compiler would otherwise emit.

use protocodec::{
    BufferedData, Codec, CodecError, FieldType, ParseOptions, RandomAccessData, Readable,
    SequentialData, Tag, UnknownFieldSet, Writable, WireType,
};

/// `{seconds: int64 = 1, nanos: int32 = 2}`, the canonical seed example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Timestamp {
    seconds: i64,
    nanos: i32,
}

impl Codec for Timestamp {
    fn write<W: Writable>(&self, out: &mut W) -> protocodec::error::Result<()> {
        if self.seconds != 0 {
            Tag::new(1, FieldType::Int64.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, self.seconds as u64)?;
        }
        if self.nanos != 0 {
            Tag::new(2, FieldType::Int32.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, self.nanos as u64)?;
        }
        Ok(())
    }

    fn parse<R: Readable>(input: &mut R, _options: &ParseOptions) -> protocodec::error::Result<Self> {
        let mut value = Timestamp::default();
        while input.has_remaining() {
            let tag = Tag::read(input)?;
            match tag.field_number {
                1 => value.seconds = protocodec::wire::read_varint_scalar(input)? as i64,
                2 => value.nanos = protocodec::wire::read_varint_scalar(input)? as i32,
                _ => protocodec::wire::skip_field(input, tag.wire_type, u32::MAX as u64)?,
            }
        }
        Ok(value)
    }
}

#[test]
fn timestamp_literal_bytes_and_equality() {
    let value = Timestamp {
        seconds: 1,
        nanos: 2,
    };
    let bytes = value.to_bytes().unwrap();
    assert_eq!(bytes.as_slice(), &[0x08, 0x01, 0x10, 0x02]);
    assert_eq!(value.measure_record().unwrap(), 4);

    let options = ParseOptions::default();
    let mut cursor = BufferedData::wrap(bytes.as_slice().to_vec());
    let parsed = Timestamp::parse(&mut cursor, &options).unwrap();
    assert_eq!(parsed, value);

    let other = Timestamp {
        seconds: 1,
        nanos: 3,
    };
    assert_ne!(value, other);
}

#[test]
fn empty_message_serializes_to_zero_bytes() {
    let value = Timestamp::default();
    let bytes = value.to_bytes().unwrap();
    assert_eq!(bytes.length(), 0);
    let options = ParseOptions::default();
    let mut cursor = BufferedData::wrap(bytes.as_slice().to_vec());
    assert_eq!(Timestamp::parse(&mut cursor, &options).unwrap(), value);
}

#[test]
fn packed_repeated_int32_literal_matches_wire_bytes() {
    let payload = protocodec::wire::encode_packed_varints(&[1, 300]);
    let mut buf = BufferedData::allocate(16);
    Tag::new(1, WireType::LengthDelimited).unwrap().write(&mut buf).unwrap();
    protocodec::wire::write_length_delimited(&mut buf, &payload).unwrap();
    buf.flip();
    let mut out = vec![0u8; buf.remaining()];
    buf.read_bytes(&mut out).unwrap();
    assert_eq!(out, vec![0x0A, 0x06, 0x01, 0xAC, 0x02]);

    let decoded = protocodec::wire::decode_packed_varints(&payload).unwrap();
    assert_eq!(decoded, vec![1, 300]);
}

/// A message with one known field (number 1) and a parser that preserves
/// anything else, standing in for schema A reading bytes produced by a
/// wider schema B.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct NarrowSchema {
    known: i64,
    unknown: UnknownFieldSet,
}

impl Codec for NarrowSchema {
    fn write<W: Writable>(&self, out: &mut W) -> protocodec::error::Result<()> {
        if self.known != 0 {
            Tag::new(1, FieldType::Int64.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, self.known as u64)?;
        }
        self.unknown.write_all(out)
    }

    fn parse<R: Readable>(input: &mut R, options: &ParseOptions) -> protocodec::error::Result<Self> {
        let mut value = NarrowSchema::default();
        while input.has_remaining() {
            let tag = Tag::read(input)?;
            match tag.field_number {
                1 => value.known = protocodec::wire::read_varint_scalar(input)? as i64,
                _ if options.parse_unknown_fields() => {
                    value.unknown.capture(input, tag, options.max_size())?
                }
                _ => protocodec::wire::skip_field(input, tag.wire_type, options.max_size())?,
            }
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct WideSchema {
    known: i64,
    extra: i64,
}

impl Codec for WideSchema {
    fn write<W: Writable>(&self, out: &mut W) -> protocodec::error::Result<()> {
        if self.known != 0 {
            Tag::new(1, FieldType::Int64.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, self.known as u64)?;
        }
        if self.extra != 0 {
            Tag::new(5, FieldType::Int64.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, self.extra as u64)?;
        }
        Ok(())
    }

    fn parse<R: Readable>(input: &mut R, _options: &ParseOptions) -> protocodec::error::Result<Self> {
        let mut value = WideSchema::default();
        while input.has_remaining() {
            let tag = Tag::read(input)?;
            match tag.field_number {
                1 => value.known = protocodec::wire::read_varint_scalar(input)? as i64,
                5 => value.extra = protocodec::wire::read_varint_scalar(input)? as i64,
                _ => protocodec::wire::skip_field(input, tag.wire_type, u32::MAX as u64)?,
            }
        }
        Ok(value)
    }
}

#[test]
fn unknown_fields_survive_a_round_trip_through_a_narrower_schema() {
    let wide = WideSchema {
        known: 7,
        extra: 99,
    };
    let wide_bytes = wide.to_bytes().unwrap();

    let options = ParseOptions::new().with_parse_unknown_fields(true);
    let mut cursor = BufferedData::wrap(wide_bytes.as_slice().to_vec());
    let narrow = NarrowSchema::parse(&mut cursor, &options).unwrap();
    assert_eq!(narrow.known, 7);
    assert_eq!(narrow.unknown.len(), 1);

    let reemitted = narrow.to_bytes().unwrap();
    let mut cursor2 = BufferedData::wrap(reemitted.as_slice().to_vec());
    let roundtripped = WideSchema::parse(&mut cursor2, &options).unwrap();
    assert_eq!(roundtripped, wide);
}

#[test]
fn varint_boundary_literals() {
    let mut buf = BufferedData::allocate(16);
    protocodec::wire::write_varint_scalar(&mut buf, 127).unwrap();
    protocodec::wire::write_varint_scalar(&mut buf, 128).unwrap();
    buf.flip();
    assert_eq!(protocodec::wire::read_varint_scalar(&mut buf).unwrap(), 127);
    assert_eq!(protocodec::wire::read_varint_scalar(&mut buf).unwrap(), 128);
}

#[test]
fn group_start_tag_is_rejected() {
    let mut buf = BufferedData::allocate(8);
    // field 1, wire type 3 (GROUP_START)
    buf.write_var_long(((1u64 << 3) | 3) as i64, false).unwrap();
    buf.flip();
    let err = Tag::read(&mut buf).unwrap_err();
    assert!(matches!(err, CodecError::MalformedEncoding(_)));
}

/// A message with enough repeated values to push its encoded length past
/// the 256-byte scratch buffer [`Codec::measure_record`]'s default
/// implementation starts from, exercising its grow-and-retry path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct WideRepeated {
    values: Vec<i64>,
}

impl Codec for WideRepeated {
    fn write<W: Writable>(&self, out: &mut W) -> protocodec::error::Result<()> {
        for &v in &self.values {
            Tag::new(1, FieldType::Int64.wire_type())?.write(out)?;
            protocodec::wire::write_varint_scalar(out, v as u64)?;
        }
        Ok(())
    }

    fn parse<R: Readable>(input: &mut R, options: &ParseOptions) -> protocodec::error::Result<Self> {
        let mut value = WideRepeated::default();
        while input.has_remaining() {
            let tag = Tag::read(input)?;
            match tag.field_number {
                1 => value.values.push(protocodec::wire::read_varint_scalar(input)? as i64),
                _ => protocodec::wire::skip_field(input, tag.wire_type, options.max_size())?,
            }
        }
        Ok(value)
    }
}

#[test]
fn measuring_and_serializing_a_message_over_256_bytes_round_trips() {
    let value = WideRepeated {
        values: (0..200).collect(),
    };
    let measured = value.measure_record().unwrap();
    assert!(measured > 256);

    let bytes = value.to_bytes().unwrap();
    assert_eq!(bytes.length(), measured);

    let options = ParseOptions::default();
    let mut cursor = BufferedData::wrap(bytes.as_slice().to_vec());
    let parsed = WideRepeated::parse(&mut cursor, &options).unwrap();
    assert_eq!(parsed, value);
}

#[derive(Debug, Clone, Default)]
struct Recursive {
    child: Option<Box<Recursive>>,
}

impl Recursive {
    fn parse_with_depth<R: Readable>(
        input: &mut R,
        options: &ParseOptions,
        depth: &protocodec::DepthGuard,
    ) -> protocodec::error::Result<Self> {
        let mut value = Recursive::default();
        while input.has_remaining() {
            let tag = Tag::read(input)?;
            if tag.field_number == 1 {
                let len = protocodec::wire::read_length_prefix(input, options.max_size())?;
                let mut raw = vec![0u8; len];
                input.read_bytes(&mut raw)?;
                let _scope = depth.enter()?;
                let mut sub = BufferedData::wrap(raw);
                let child = Recursive::parse_with_depth(&mut sub, options, depth)?;
                value.child = Some(Box::new(child));
            } else {
                protocodec::wire::skip_field(input, tag.wire_type, options.max_size())?;
            }
        }
        Ok(value)
    }
}

impl Codec for Recursive {
    fn write<W: Writable>(&self, out: &mut W) -> protocodec::error::Result<()> {
        if let Some(child) = &self.child {
            let bytes = child.to_bytes()?;
            Tag::new(1, WireType::LengthDelimited)?.write(out)?;
            protocodec::wire::write_length_delimited(out, bytes.as_slice())?;
        }
        Ok(())
    }

    fn parse<R: Readable>(input: &mut R, options: &ParseOptions) -> protocodec::error::Result<Self> {
        let depth = protocodec::DepthGuard::new(options.max_depth());
        Recursive::parse_with_depth(input, options, &depth)
    }
}

#[test]
fn max_depth_is_enforced_on_nested_recursion() {
    let mut chain = Recursive::default();
    for _ in 0..10 {
        chain = Recursive {
            child: Some(Box::new(chain)),
        };
    }
    let bytes = chain.to_bytes().unwrap();
    let tight = ParseOptions::new().with_max_depth(3);
    let mut cursor = BufferedData::wrap(bytes.as_slice().to_vec());
    let err = Recursive::parse(&mut cursor, &tight).unwrap_err();
    assert!(matches!(err, CodecError::MaxDepthExceeded { .. }));

    let roomy = ParseOptions::new().with_max_depth(64);
    let mut cursor2 = BufferedData::wrap(bytes.as_slice().to_vec());
    assert!(Recursive::parse(&mut cursor2, &roomy).is_ok());
}
