//! Error type for the rendering engine.
//!
//! The taxonomy is deliberately small. Truncation is not an error: it is
//! reported only through the returned byte count.

use thiserror::Error;

/// Failure modes of [`try_render`](crate::try_render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The caller supplied a zero-capacity buffer; nothing was written.
    #[error("output buffer has no room for the terminator")]
    BufferTooSmall,
    /// An unrecognised conversion character, rejected under
    /// [`RenderMode::Strict`](crate::RenderMode::Strict).
    #[error("unsupported conversion {:?} at template offset {offset}", conversion_char(.conversion))]
    UnsupportedDirective {
        /// Byte offset of the `%` that opened the directive.
        offset: usize,
        /// The byte that terminated the directive.
        conversion: u8,
    },
}

impl RenderError {
    /// The C-style sentinel returned by the integer entry points.
    pub const SENTINEL: i32 = -1;
}

fn conversion_char(byte: &u8) -> char {
    char::from(*byte)
}
