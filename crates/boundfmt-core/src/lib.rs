//! # boundfmt-core
//!
//! Bounded, allocation-free printf-style rendering.
//!
//! A template and a sequence of typed arguments are rendered into a
//! caller-supplied byte buffer. The engine never writes past the buffer,
//! always leaves a NUL terminator, and needs neither a platform C library nor
//! a floating-point math library: integer and float text are produced by the
//! crate's own numeric core.
//!
//! ```
//! use boundfmt_core::{Arg, render_into};
//!
//! let mut buf = [0u8; 32];
//! let n = render_into(&mut buf, b"%-6s|%5.1f|%#x", &[
//!     Arg::from("temp"),
//!     Arg::from(21.75),
//!     Arg::from(255u32),
//! ]);
//! assert_eq!(&buf[..n as usize], b"temp  | 21.8|0xff");
//! ```
//!
//! No `unsafe` code is permitted at the crate level.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

pub mod args;
pub mod config;
pub mod convert;
pub mod directive;
pub mod error;
pub mod numeric;
pub mod render;
pub mod sink;

pub use args::{Arg, ArgumentCursor, SliceCursor};
pub use config::{RenderMode, render_mode, set_render_mode};
pub use directive::{FormatSegment, FormatSpec, LengthMod, parse_format_string};
pub use error::RenderError;
pub use render::{render_into, render_into_with_cursor, try_render};
pub use sink::OutputSink;
