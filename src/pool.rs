// SPDX-License-Identifier: Apache-2.0

//! A thread-local pool of scratch [`BufferedData`] buffers, reused across
//! calls that need to measure a submessage's encoded length before writing
//! its length prefix, so each such call doesn't allocate a fresh buffer.

use std::cell::RefCell;

use crate::buffer::BufferedData;

/// Scratch buffers are reused up to this size before a checkout simply
/// allocates fresh rather than growing a pooled one, keeping the pool's
/// resident memory bounded.
const MAX_POOLED_CAPACITY: usize = 64 * 1024;

/// Maximum number of buffers retained per thread.
const MAX_POOL_SIZE: usize = 8;

thread_local! {
    static POOL: RefCell<Vec<BufferedData>> = const { RefCell::new(Vec::new()) };
}

/// A pooled scratch buffer, returned to the thread-local pool when dropped.
pub struct PooledBuffer {
    buffer: Option<BufferedData>,
}

impl PooledBuffer {
    /// Borrows the underlying buffer.
    pub fn get_mut(&mut self) -> &mut BufferedData {
        #[allow(clippy::expect_used)]
        self.buffer.as_mut().expect("buffer taken only on drop")
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            if buffer.capacity() <= MAX_POOLED_CAPACITY {
                buffer.reset();
                POOL.with(|pool| {
                    let mut pool = pool.borrow_mut();
                    if pool.len() < MAX_POOL_SIZE {
                        pool.push(buffer);
                    }
                });
            }
        }
    }
}

/// Checks out a scratch buffer with at least `min_capacity` bytes of room,
/// reusing a pooled one if available and large enough, otherwise allocating
/// fresh. The returned buffer is always reset to `position == 0`.
pub fn checkout(min_capacity: usize) -> PooledBuffer {
    let reused = POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if let Some(idx) = pool.iter().position(|b| b.capacity() >= min_capacity) {
            Some(pool.swap_remove(idx))
        } else {
            None
        }
    });
    let buffer = reused.unwrap_or_else(|| BufferedData::allocate(min_capacity));
    PooledBuffer {
        buffer: Some(buffer),
    }
}
