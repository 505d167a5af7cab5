// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! A zero-copy Protocol Buffers wire-format codec core.
//!
//! This crate is the runtime substrate a generated (or hand-written) message
//! type is built on:
//!
//! - [`bytes::Bytes`] — an immutable, shareable, zero-copy-sliceable byte
//!   sequence with structural equality and hashing.
//! - [`buffer::BufferedData`] — a cursor-bearing mutable buffer over heap or
//!   off-heap storage.
//! - [`wire`] — tags, wire types, scalar encodings, and packed-repeated
//!   framing.
//! - [`unknown`] — an unknown-field registry for forward-compatible
//!   round-tripping.
//! - [`guards`] — the recursion-depth and payload-size ceilings a parse
//!   call is bound by.
//! - [`codec::Codec`] — the trait a message type implements against
//!   whichever [`sequential::Readable`]/[`sequential::Writable`] cursor the
//!   caller provides.
//!
//! There is no `.proto` schema compiler here and no generated message
//! bodies; this crate only supplies what a generated type would be built
//! on top of.
//!
//! ```reference
//! message    := (tag value)*
//! tag        := (field << 3) bit-or wire_type;
//!                 encoded as uint32 varint
//! value      := varint      for wire_type == VARINT,
//!               fixed32/64  for wire_type == FIXED32/FIXED64,
//!               len-prefix  for wire_type == LEN,
//! varint     := int64 | uint64, 7 bits per byte, continuation bit high
//! len-prefix := size (message | string | bytes | packed);
//!                 size encoded as a varint
//! packed     := varint* | fixed32* | fixed64*
//! ```
//!
//! Length-delimited payloads are bounded by [`guards::ParseOptions::max_size`]
//! and nested messages by [`guards::ParseOptions::max_depth`], both
//! defaulting to generous but finite ceilings so a malformed or adversarial
//! input can't walk a parser into unbounded memory use or stack recursion.

pub mod buffer;
pub mod bytes;
pub mod codec;
pub mod error;
pub mod guards;
pub mod io;
pub mod pool;
pub mod random_access;
pub mod sequential;
pub mod unknown;
pub mod varint;
pub mod wire;

pub use buffer::BufferedData;
pub use bytes::Bytes;
pub use codec::{Codec, FieldDefinition, FieldType, OneOf, PbjMap};
pub use error::{CodecError, Result};
pub use guards::{DepthGuard, ParseOptions};
pub use random_access::{Endian, RandomAccessData};
pub use sequential::{Readable, SequentialData, Writable};
pub use unknown::{UnknownField, UnknownFieldSet};
pub use wire::{Tag, WireType};
