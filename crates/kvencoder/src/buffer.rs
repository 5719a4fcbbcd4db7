//! Working buffers and the pool they are drawn from.
//!
//! Every encode call appends into exactly one [`Buffer`]. Buffers are handed
//! out by a [`BufferPool`] wrapped in a [`PooledBuffer`] guard, which returns
//! the buffer to its pool exactly once when dropped, on every path.

use std::{
    fmt::{self, Debug, Write},
    mem,
    ops::{Deref, DerefMut},
    sync::{Arc, OnceLock},
};

use parking_lot::Mutex;

/// Capacity of a freshly allocated buffer.
const INITIAL_CAPACITY: usize = 1024;

/// Default number of idle buffers a [`SyncPool`] keeps around.
const DEFAULT_MAX_IDLE: usize = 64;

/// Default largest capacity a released buffer may have and still be retained.
const DEFAULT_MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Append-only, growable byte accumulator.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    /// Accumulated bytes.
    bytes: Vec<u8>,
}

impl Buffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append a single byte.
    pub fn append_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    /// Append raw bytes verbatim.
    pub fn append_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    /// Append a string verbatim.
    pub fn append_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Append `true` or `false`.
    pub fn append_bool(&mut self, v: bool) {
        self.append_str(if v { "true" } else { "false" });
    }

    /// Append a signed integer in decimal.
    pub fn append_int(&mut self, v: i64) {
        let _ignored = write!(self, "{v}");
    }

    /// Append an unsigned integer in decimal.
    pub fn append_uint(&mut self, v: u64) {
        let _ignored = write!(self, "{v}");
    }

    /// Append a float in its shortest round-tripping decimal form.
    ///
    /// Non-finite values render as `NaN`, `+Inf` and `-Inf`.
    pub fn append_float(&mut self, v: f64) {
        if v.is_nan() {
            self.append_str("NaN");
        } else if v.is_infinite() {
            self.append_str(if v > 0.0 { "+Inf" } else { "-Inf" });
        } else {
            let _ignored = write!(self, "{v}");
        }
    }

    /// Append the `Debug` rendering of a value.
    pub fn append_debug(&mut self, v: &dyn Debug) {
        let _ignored = write!(self, "{v:?}");
    }

    /// Accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of accumulated bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Discard the contents, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Copy the contents out into an owned vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Buffer")
            .field(&String::from_utf8_lossy(&self.bytes))
            .finish()
    }
}

/// Thread-safe source of reusable working buffers.
pub trait BufferPool: Send + Sync {
    /// Take an empty buffer from the pool, allocating if none is idle.
    fn acquire(&self) -> Buffer;

    /// Hand a buffer back once its contents have been consumed.
    fn release(&self, buf: Buffer);
}

/// Mutex-guarded free list of buffers.
pub struct SyncPool {
    /// Released buffers waiting to be reused.
    idle: Mutex<Vec<Buffer>>,
    /// Maximum number of idle buffers retained.
    max_idle: usize,
    /// Buffers that grew beyond this capacity are dropped on release.
    max_retained_capacity: usize,
}

impl Default for SyncPool {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_IDLE, DEFAULT_MAX_RETAINED_CAPACITY)
    }
}

impl SyncPool {
    /// Create a pool with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool retaining at most `max_idle` buffers, each no larger
    /// than `max_retained_capacity` bytes.
    pub fn with_limits(max_idle: usize, max_retained_capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            max_retained_capacity,
        }
    }

    /// Process-wide pool used when no pool is injected explicitly.
    pub fn shared() -> Arc<dyn BufferPool> {
        static SHARED: OnceLock<Arc<SyncPool>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::new())).clone()
    }

    /// Number of buffers currently idle in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

impl BufferPool for SyncPool {
    fn acquire(&self) -> Buffer {
        self.idle
            .lock()
            .pop()
            .unwrap_or_else(|| Buffer::with_capacity(INITIAL_CAPACITY))
    }

    fn release(&self, mut buf: Buffer) {
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }
}

/// A buffer on loan from a pool.
///
/// Dereferences to [`Buffer`]. Dropping the guard releases the buffer back to
/// the pool it came from.
pub struct PooledBuffer {
    /// The loaned buffer.
    buf: Buffer,
    /// Pool the buffer returns to.
    pool: Arc<dyn BufferPool>,
}

impl PooledBuffer {
    /// Acquire a buffer from `pool`.
    pub fn acquire(pool: Arc<dyn BufferPool>) -> Self {
        let buf = pool.acquire();
        Self { buf, pool }
    }

    /// Pool this buffer will be released to.
    pub fn pool(&self) -> &Arc<dyn BufferPool> {
        &self.pool
    }
}

impl Deref for PooledBuffer {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Buffer {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

impl Debug for PooledBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledBuffer").field(&self.buf).finish()
    }
}
