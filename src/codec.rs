// SPDX-License-Identifier: Apache-2.0

//! The schema-facing layer: [`Codec`], the trait a generated (or hand
//! written) message type implements to read and write itself, plus the
//! supporting field-classification types `FieldType`/`FieldDefinition`,
//! the `OneOf` convention, and `PbjMap`.

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::hash::Hash;

use crate::error::{CodecError, Result};
use crate::guards::ParseOptions;
use crate::pool;
use crate::sequential::{Readable, SequentialData, Writable};
use crate::wire::WireType;

/// The scalar and structural field kinds a schema can declare, each mapping
/// onto exactly one wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bool,
    Enum,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Float,
    Double,
    String,
    Bytes,
    Message,
}

impl FieldType {
    /// The wire type this field kind is always encoded with.
    #[must_use]
    pub fn wire_type(self) -> WireType {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum => WireType::Varint,
            FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => WireType::Fixed64,
            FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => WireType::Fixed32,
            FieldType::String | FieldType::Bytes | FieldType::Message => {
                WireType::LengthDelimited
            }
        }
    }

    /// Whether this field kind uses zig-zag varint encoding.
    #[must_use]
    pub fn is_zigzag(self) -> bool {
        matches!(self, FieldType::Sint32 | FieldType::Sint64)
    }

    /// Whether a `repeated` field of this kind is eligible for packed
    /// encoding (any scalar numeric type; strings/bytes/messages never are).
    #[must_use]
    pub fn is_packable(self) -> bool {
        !matches!(self, FieldType::String | FieldType::Bytes | FieldType::Message)
    }
}

/// Static metadata describing one declared field of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    /// The field number this definition matches on the wire.
    pub number: u32,
    /// The field's declared type.
    pub field_type: FieldType,
    /// Whether the field is `repeated`.
    pub repeated: bool,
    /// Whether a `repeated` scalar field should be written packed. Ignored
    /// for non-repeated or non-packable fields.
    pub packed: bool,
}

impl FieldDefinition {
    /// A singular (non-repeated) field.
    #[must_use]
    pub const fn singular(number: u32, field_type: FieldType) -> Self {
        FieldDefinition {
            number,
            field_type,
            repeated: false,
            packed: false,
        }
    }

    /// A `repeated` field, packed by default when its type allows it —
    /// proto3's own default for scalar numeric repeated fields.
    #[must_use]
    pub const fn repeated(number: u32, field_type: FieldType) -> Self {
        FieldDefinition {
            number,
            field_type,
            repeated: true,
            packed: true,
        }
    }

    /// A `repeated` field explicitly written unpacked (one tag per
    /// element) — the only representation available for strings, bytes,
    /// and messages, and occasionally chosen for scalars too.
    #[must_use]
    pub const fn repeated_unpacked(number: u32, field_type: FieldType) -> Self {
        FieldDefinition {
            number,
            field_type,
            repeated: true,
            packed: false,
        }
    }
}

/// The convention a `oneof` group's generated enum follows: exactly one
/// variant holds a value at a time, with a designated `Unset` case standing
/// in for "none of the group's fields were present."
///
/// Implementors are plain enums, not a `(field_number, value)` pair — the
/// match arms themselves carry the field identity, which is the idiomatic
/// rendition of a tagged union in Rust.
pub trait OneOf: Default {
    /// Whether no variant in the group is populated.
    fn is_unset(&self) -> bool;
}

/// An insertion-ordered `map<K, V>` field, matching proto3 map semantics
/// (keys are unique, iteration order is unspecified by the spec but this
/// implementation preserves insertion order for reproducible output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbjMap<K: Hash + Eq, V> {
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for PbjMap<K, V> {
    fn default() -> Self {
        PbjMap {
            entries: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> PbjMap<K, V> {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        PbjMap::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces the value for `key`. A replaced key keeps its
    /// original insertion position, matching `IndexMap::insert`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Looks up a value by key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for PbjMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        PbjMap {
            entries: IndexMap::from_iter(iter),
        }
    }
}

/// The trait a message type implements to read and write itself against the
/// wire format, independent of any particular buffer or stream
/// implementation.
pub trait Codec: Sized {
    /// Writes this value's fields (not including any enclosing tag/length
    /// prefix — callers embedding this as a submessage handle that) to
    /// `out` in field-number order.
    fn write<W: Writable>(&self, out: &mut W) -> Result<()>;

    /// Parses a value of this type from `input`, consuming exactly the
    /// bytes belonging to it (the caller is responsible for bounding
    /// `input`'s limit to this message's length when parsing a
    /// length-delimited submessage).
    fn parse<R: Readable>(input: &mut R, options: &ParseOptions) -> Result<Self>;

    /// The number of bytes [`Codec::write`] would emit for this value,
    /// without actually writing them. The default implementation measures
    /// by writing into a pooled scratch buffer and reading back its
    /// position, growing and retrying if the value doesn't fit; implementors
    /// with a cheaper closed-form size (e.g. a fixed-width record) should
    /// override this.
    fn measure_record(&self) -> Result<usize> {
        let mut capacity = 256;
        loop {
            let mut scratch = pool::checkout(capacity);
            match self.write(scratch.get_mut()) {
                Ok(()) => return Ok(scratch.get_mut().position()),
                Err(CodecError::Overflow { .. }) => capacity *= 2,
                Err(other) => return Err(other),
            }
        }
    }

    /// Serializes this value into a freshly allocated buffer.
    fn to_bytes(&self) -> Result<crate::bytes::Bytes> {
        let len = self.measure_record()?;
        let mut buffer = crate::buffer::BufferedData::allocate(len);
        self.write(&mut buffer)?;
        buffer.flip();
        buffer.read_bytes_owned(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_maps_to_expected_wire_type() {
        assert_eq!(FieldType::Int32.wire_type(), WireType::Varint);
        assert_eq!(FieldType::Sfixed64.wire_type(), WireType::Fixed64);
        assert_eq!(FieldType::Float.wire_type(), WireType::Fixed32);
        assert_eq!(FieldType::String.wire_type(), WireType::LengthDelimited);
    }

    #[test]
    fn only_sint_types_are_zigzag() {
        assert!(FieldType::Sint32.is_zigzag());
        assert!(FieldType::Sint64.is_zigzag());
        assert!(!FieldType::Int64.is_zigzag());
    }

    #[test]
    fn string_bytes_message_are_never_packable() {
        assert!(!FieldType::String.is_packable());
        assert!(!FieldType::Bytes.is_packable());
        assert!(!FieldType::Message.is_packable());
        assert!(FieldType::Int32.is_packable());
    }

    #[test]
    fn pbj_map_preserves_insertion_order() {
        let mut map: PbjMap<String, i32> = PbjMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        let keys: Vec<&String> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[derive(Default)]
    enum Choice {
        #[default]
        Unset,
        A(i32),
        B(String),
    }

    impl OneOf for Choice {
        fn is_unset(&self) -> bool {
            matches!(self, Choice::Unset)
        }
    }

    #[test]
    fn oneof_default_is_unset() {
        assert!(Choice::default().is_unset());
        assert!(!Choice::A(1).is_unset());
    }
}
