//! Bounded output cursor over the caller's buffer.
//!
//! Every byte the engine emits goes through [`OutputSink::put`]. The last
//! slot of the buffer is reserved for the terminator, so `written` can never
//! pass `buf.len() - 1`; writes past that point are dropped silently.

use crate::error::RenderError;

/// Write cursor for one top-level render call.
#[derive(Debug)]
pub struct OutputSink<'a> {
    buf: &'a mut [u8],
    capacity: usize,
    written: usize,
}

impl<'a> OutputSink<'a> {
    /// Wrap `buf`, reserving its final byte for the terminator.
    ///
    /// Fails with [`RenderError::BufferTooSmall`] for an empty buffer.
    pub fn new(buf: &'a mut [u8]) -> Result<Self, RenderError> {
        let Some(capacity) = buf.len().checked_sub(1) else {
            return Err(RenderError::BufferTooSmall);
        };
        Ok(Self {
            buf,
            capacity,
            written: 0,
        })
    }

    /// The single bounds-checked write primitive. Returns false once full.
    #[inline]
    pub fn put(&mut self, byte: u8) -> bool {
        if self.written < self.capacity {
            self.buf[self.written] = byte;
            self.written += 1;
            true
        } else {
            false
        }
    }

    /// Write `bytes` in order, stopping at the bound.
    pub fn put_slice(&mut self, bytes: &[u8]) -> bool {
        for &b in bytes {
            if !self.put(b) {
                return false;
            }
        }
        true
    }

    /// Write `count` copies of `byte`, stopping at the bound.
    pub fn pad(&mut self, byte: u8, count: usize) -> bool {
        for _ in 0..count {
            if !self.put(byte) {
                return false;
            }
        }
        true
    }

    /// Bytes emitted so far (excluding the terminator).
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Writable bytes (buffer length minus the terminator slot).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.written == self.capacity
    }

    /// Place the terminator and return the final count.
    pub fn finish(self) -> usize {
        self.buf[self.written] = 0;
        self.written
    }
}
