//! Template scanner and public entry points.
//!
//! Reference: ISO C11 7.21.6.1 for conversion semantics; deviations are
//! documented on the individual converters.
//!
//! Design invariant: the returned count `r` never exceeds `buf.len() - 1`
//! and `buf[r]` is always the terminator. Truncation is silent.

use crate::args::{Arg, ArgumentCursor, SliceCursor};
use crate::config::{RenderMode, render_mode};
use crate::convert;
use crate::directive::{
    Alignment, FormatSegment, FormatSpec, LengthMod, Precision, Width, parse_format_string,
};
use crate::error::RenderError;
use crate::sink::OutputSink;

/// Render `template` into `buf`, returning the byte count (terminator not
/// counted).
///
/// Scanning stops when the buffer is full, when the template ends (at its
/// first NUL or the end of the slice), or inside an unfinished directive.
/// An unrecognised conversion is skipped under [`RenderMode::Compat`] and
/// aborts with [`RenderError::UnsupportedDirective`] under
/// [`RenderMode::Strict`]; in that case the bytes already rendered stay in
/// `buf`, terminated.
pub fn try_render<'a, C>(
    buf: &mut [u8],
    template: &[u8],
    cursor: &mut C,
    mode: RenderMode,
) -> Result<usize, RenderError>
where
    C: ArgumentCursor<'a> + ?Sized,
{
    let mut sink = OutputSink::new(buf)?;

    for segment in parse_format_string(template) {
        if sink.is_full() {
            break;
        }
        let room_left = match segment {
            FormatSegment::Literal(bytes) => sink.put_slice(bytes),
            FormatSegment::Percent => sink.put(b'%'),
            FormatSegment::Spec(mut spec) => {
                resolve_star_args(&mut spec, cursor);
                convert_one(&spec, cursor, &mut sink)
            }
            FormatSegment::Unsupported { offset, conversion } => {
                if mode.rejects_unknown() {
                    sink.finish();
                    return Err(RenderError::UnsupportedDirective { offset, conversion });
                }
                true
            }
            FormatSegment::Incomplete => break,
        };
        if !room_left {
            break;
        }
    }

    Ok(sink.finish())
}

/// Render with arguments from a slice. Returns the byte count, or `-1` for
/// an empty buffer (or a rejected directive in strict mode).
///
/// The mode comes from [`render_mode`].
pub fn render_into(buf: &mut [u8], template: &[u8], args: &[Arg<'_>]) -> i32 {
    let mut cursor = SliceCursor::new(args);
    render_into_with_cursor(buf, template, &mut cursor)
}

/// [`render_into`] with a caller-built argument cursor.
pub fn render_into_with_cursor<'a, C>(buf: &mut [u8], template: &[u8], cursor: &mut C) -> i32
where
    C: ArgumentCursor<'a> + ?Sized,
{
    match try_render(buf, template, cursor, render_mode()) {
        Ok(written) => i32::try_from(written).unwrap_or(i32::MAX),
        Err(_) => RenderError::SENTINEL,
    }
}

/// Replace `*` width/precision with values read from the cursor, width
/// first. A negative width means left alignment; a negative precision means
/// none was given.
fn resolve_star_args<'a, C>(spec: &mut FormatSpec, cursor: &mut C)
where
    C: ArgumentCursor<'a> + ?Sized,
{
    if spec.width == Width::FromArg {
        let w = cursor.next_star();
        if w < 0 {
            spec.flags.align = Alignment::Left;
        }
        spec.width = Width::Fixed(usize::try_from(w.unsigned_abs()).unwrap_or(usize::MAX));
    }
    if spec.precision == Precision::FromArg {
        spec.precision = usize::try_from(cursor.next_star()).map_or(Precision::None, Precision::Fixed);
    }
}

/// Render one directive. Returns false once the sink is full.
fn convert_one<'a, C>(spec: &FormatSpec, cursor: &mut C, sink: &mut OutputSink<'_>) -> bool
where
    C: ArgumentCursor<'a> + ?Sized,
{
    match spec.conversion {
        b'd' | b'i' => convert::format_signed(cursor.next_signed(spec.length), spec, sink),
        b'u' | b'o' | b'x' | b'X' => {
            convert::format_unsigned(cursor.next_unsigned(spec.length), spec, sink)
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => {
            convert::format_float(cursor.next_double(), spec, sink)
        }
        b's' => convert::format_str(cursor.next_str(), spec, sink),
        // Narrowed to 8 bits, so the cast keeps every bit.
        b'c' => convert::format_char(cursor.next_unsigned(LengthMod::Hh) as u8, spec, sink),
        b'p' => convert::format_pointer(cursor.next_pointer(), spec, sink),
        b'n' => {
            if let Some(target) = cursor.next_count() {
                target.set(i32::try_from(sink.written()).unwrap_or(i32::MAX));
            }
            true
        }
        _ => true,
    }
}

/// Variadic form of [`render_into`]: every argument goes through
/// [`Arg::from`](crate::Arg).
///
/// ```
/// let mut buf = [0u8; 16];
/// let n = boundfmt_core::render!(&mut buf, "%s=%03d", "x", 7);
/// assert_eq!(&buf[..n as usize], b"x=007");
/// ```
#[macro_export]
macro_rules! render {
    ($buf:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::render_into(
            $buf,
            ::core::convert::AsRef::<[u8]>::as_ref(&$template),
            &[$($crate::Arg::from($arg)),*],
        )
    };
}
