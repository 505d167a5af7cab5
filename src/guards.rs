// SPDX-License-Identifier: Apache-2.0

//! Parse-time policy and recursion tracking: how deep nested messages may
//! go, how large a length-delimited payload may declare itself, and whether
//! unrecognized fields are preserved or discarded.

use std::cell::Cell;

use crate::error::{CodecError, Result};

/// Nested-message recursion depth allowed by default before parsing fails.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Largest length-delimited payload size accepted by default, matching the
/// largest value a protobuf length prefix can represent without requiring a
/// 64-bit allocation budget.
pub const DEFAULT_MAX_SIZE: u64 = i32::MAX as u64;

/// Parse-time configuration threaded through every [`crate::codec::Codec`]
/// parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// When set, parsing rejects any behavior a lenient implementation might
    /// tolerate (currently: malformed bool varints are always rejected
    /// regardless of this flag; reserved for future strictness knobs).
    strict_mode: bool,
    /// Whether fields with no matching definition are captured into an
    /// [`crate::unknown::UnknownFieldSet`] (`true`) or silently skipped
    /// (`false`).
    parse_unknown_fields: bool,
    /// Maximum nested-message recursion depth.
    max_depth: u32,
    /// Maximum declared length for any length-delimited payload.
    max_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict_mode: false,
            parse_unknown_fields: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl ParseOptions {
    /// Starts from [`ParseOptions::default`].
    #[must_use]
    pub fn new() -> Self {
        ParseOptions::default()
    }

    /// Enables or disables strict mode.
    #[must_use]
    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    /// Enables or disables unknown-field capture.
    #[must_use]
    pub fn with_parse_unknown_fields(mut self, parse_unknown_fields: bool) -> Self {
        self.parse_unknown_fields = parse_unknown_fields;
        self
    }

    /// Sets the maximum nested-message recursion depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum declared length-delimited payload size.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    #[must_use]
    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    #[must_use]
    pub fn parse_unknown_fields(&self) -> bool {
        self.parse_unknown_fields
    }

    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.max_size
    }
}

/// Tracks nested-message recursion depth for one parse call tree, failing
/// as soon as [`ParseOptions::max_depth`] would be exceeded.
///
/// A `DepthGuard` is created once per top-level parse and handed down by
/// shared reference; each nested message parse calls [`DepthGuard::enter`]
/// before recursing and relies on the returned guard's `Drop` to decrement
/// on the way back out, so a guard is correct across early returns via `?`.
/// The counter uses interior mutability so the same guard can be held by
/// an ordinary shared reference across a recursive call rather than
/// requiring an exclusive borrow that the recursive call itself would then
/// be unable to take.
pub struct DepthGuard {
    max_depth: u32,
    current: Cell<u32>,
}

impl DepthGuard {
    /// Starts a fresh guard at depth 0 for the given ceiling.
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        DepthGuard {
            max_depth,
            current: Cell::new(0),
        }
    }

    /// Current recursion depth.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.current.get()
    }

    /// Enters one more level of nesting, failing if that would exceed
    /// `max_depth`. The returned [`DepthGuardScope`] restores the prior
    /// depth when dropped, so callers don't need to track it manually.
    pub fn enter(&self) -> Result<DepthGuardScope<'_>> {
        let depth = self.current.get();
        if depth >= self.max_depth {
            #[cfg(feature = "tracing")]
            tracing::debug!(max_depth = self.max_depth, "max nesting depth exceeded");
            return Err(CodecError::MaxDepthExceeded {
                max_depth: self.max_depth,
            });
        }
        self.current.set(depth + 1);
        Ok(DepthGuardScope { guard: self })
    }
}

/// RAII scope returned by [`DepthGuard::enter`]; decrements the depth on
/// drop regardless of how the enclosing parse call exits.
pub struct DepthGuardScope<'a> {
    guard: &'a DepthGuard,
}

impl Drop for DepthGuardScope<'_> {
    fn drop(&mut self) {
        self.guard.current.set(self.guard.current.get() - 1);
    }
}
