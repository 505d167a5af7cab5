// SPDX-License-Identifier: Apache-2.0

//! Preservation of fields a schema does not recognize, so that messages
//! round-trip unchanged through code that doesn't know about every field —
//! the same forward-compatibility guarantee the wire format exists to give.

use crate::bytes::Bytes;
use crate::error::Result;
use crate::random_access::RandomAccessData;
use crate::sequential::Writable;
use crate::wire::{self, Tag, WireType};

/// One field this schema didn't recognize, captured verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    /// The field number from the original tag.
    pub field_number: u32,
    /// The wire type from the original tag.
    pub wire_type: WireType,
    /// The raw payload bytes, not including the tag itself. For
    /// length-delimited fields this is the varint length prefix followed by
    /// the body, as a contiguous slice; for varint/fixed32/fixed64 fields it
    /// is exactly the scalar's bytes.
    pub payload: Bytes,
}

/// A registry of unknown fields encountered while parsing a single message,
/// preserved in encounter order and re-emitted sorted by field number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    fields: Vec<UnknownField>,
}

impl UnknownFieldSet {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        UnknownFieldSet::default()
    }

    /// Whether any fields have been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of captured fields, including repeats of the same field number.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Appends a captured field in encounter order.
    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    /// Iterates fields in their original encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter()
    }

    /// Fields ordered ascending by field number, stable within equal field
    /// numbers — the order they're written back out on reserialization.
    #[must_use]
    pub fn sorted_for_write(&self) -> Vec<&UnknownField> {
        let mut refs: Vec<&UnknownField> = self.fields.iter().collect();
        refs.sort_by_key(|f| f.field_number);
        refs
    }

    /// Reads one field's tag-identified payload into this registry, given a
    /// tag whose field number the caller's schema doesn't recognize.
    /// Advances `input` past the payload.
    pub fn capture(
        &mut self,
        input: &mut impl crate::sequential::Readable,
        tag: Tag,
        max_size: u64,
    ) -> Result<()> {
        let payload = match tag.wire_type {
            WireType::Varint => {
                let value = wire::read_varint_scalar(input)?;
                let mut buf = Vec::new();
                crate::varint::encode_u64(value, &mut buf);
                Bytes::wrap(buf)
            }
            WireType::Fixed32 => {
                let mut buf = [0u8; 4];
                input.read_bytes(&mut buf)?;
                Bytes::wrap(buf.to_vec())
            }
            WireType::Fixed64 => {
                let mut buf = [0u8; 8];
                input.read_bytes(&mut buf)?;
                Bytes::wrap(buf.to_vec())
            }
            WireType::LengthDelimited => {
                let len = wire::read_length_prefix(input, max_size)?;
                let mut buf = Vec::new();
                crate::varint::encode_u64(len as u64, &mut buf);
                let body_start = buf.len();
                buf.resize(body_start + len, 0);
                input.read_bytes(&mut buf[body_start..])?;
                Bytes::wrap(buf)
            }
        };
        self.fields.push(UnknownField {
            field_number: tag.field_number,
            wire_type: tag.wire_type,
            payload,
        });
        Ok(())
    }

    /// Writes every captured field back out, tag followed by the stored
    /// payload bytes verbatim (the length prefix is already part of
    /// `payload` for length-delimited fields), in the order given by
    /// [`UnknownFieldSet::sorted_for_write`].
    pub fn write_all(&self, out: &mut impl Writable) -> Result<()> {
        for field in self.sorted_for_write() {
            Tag::new(field.field_number, field.wire_type)?.write(out)?;
            out.write_bytes(field.payload.as_slice())?;
        }
        Ok(())
    }

    /// Total number of bytes [`UnknownFieldSet::write_all`] would emit.
    #[must_use]
    pub fn measure(&self) -> usize {
        self.fields
            .iter()
            .map(|f| {
                let tag_len = Tag {
                    field_number: f.field_number,
                    wire_type: f.wire_type,
                }
                .encoded_len();
                tag_len + f.payload.length()
            })
            .sum()
    }
}
