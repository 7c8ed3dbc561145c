//! Converters: one finished field per directive, written to the sink.
//!
//! Field layout is `[spaces] [sign] [prefix] [zeros] body [spaces]`. Width
//! counts every byte of the field. Zero fill sits between prefix and body;
//! left alignment always pads on the right with spaces.
//!
//! Every function returns false once the sink is full.

use crate::directive::{FormatFlags, FormatSpec};
use crate::numeric::{self, INT_BUF_LEN, render_digits};
use crate::sink::OutputSink;

/// Default `%f`/`%e`/`%g` precision.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Everything around the body of a field.
struct Layout<'p> {
    sign: Option<u8>,
    prefix: &'p [u8],
    leading_zeros: usize,
    body_len: usize,
    zero_fill: bool,
}

fn emit_padded(
    spec: &FormatSpec,
    layout: &Layout<'_>,
    sink: &mut OutputSink<'_>,
    body: impl FnOnce(&mut OutputSink<'_>) -> bool,
) -> bool {
    let content = usize::from(layout.sign.is_some())
        .saturating_add(layout.prefix.len())
        .saturating_add(layout.leading_zeros)
        .saturating_add(layout.body_len);
    let pad_total = spec.width_value().saturating_sub(content);
    let left = spec.flags.left_justify();
    let zero_fill = layout.zero_fill && !left;

    if !left && !zero_fill && !sink.pad(b' ', pad_total) {
        return false;
    }
    if let Some(s) = layout.sign {
        if !sink.put(s) {
            return false;
        }
    }
    if !sink.put_slice(layout.prefix) {
        return false;
    }
    if zero_fill && !sink.pad(b'0', pad_total) {
        return false;
    }
    if !sink.pad(b'0', layout.leading_zeros) || !body(sink) {
        return false;
    }
    if left {
        return sink.pad(b' ', pad_total);
    }
    true
}

/// Sign byte for a signed conversion. Zero never gets one.
fn sign_byte(negative: bool, positive: bool, flags: &FormatFlags) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if positive && flags.force_sign() {
        Some(b'+')
    } else if positive && flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

fn int_base(conversion: u8) -> (u64, bool) {
    match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    }
}

/// Render a signed decimal (`%d`, `%i`).
pub fn format_signed(value: i64, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    let mut digits = [0u8; INT_BUF_LEN];
    let count = render_digits(value.unsigned_abs(), 10, false, &mut digits);
    let precision = spec.precision_value();

    let layout = Layout {
        sign: sign_byte(value < 0, value > 0, &spec.flags),
        prefix: b"",
        leading_zeros: precision.map_or(0, |p| p.saturating_sub(count)),
        body_len: count,
        zero_fill: spec.flags.zero_pad && precision.is_none(),
    };
    emit_padded(spec, &layout, sink, |sink| {
        sink.put_slice(&digits[INT_BUF_LEN - count..])
    })
}

/// Render an unsigned integer (`%u`, `%o`, `%x`, `%X`).
pub fn format_unsigned(value: u64, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    let (base, uppercase) = int_base(spec.conversion);
    let mut digits = [0u8; INT_BUF_LEN];
    let count = render_digits(value, base, uppercase, &mut digits);
    let precision = spec.precision_value();
    let leading_zeros = precision.map_or(0, |p| p.saturating_sub(count));

    let prefix: &[u8] = match spec.conversion {
        // The octal prefix is a leading zero; skip it when one is already there.
        b'o' if spec.flags.alt_form && value != 0 && leading_zeros == 0 => b"0",
        b'x' if spec.flags.alt_form && value != 0 => b"0x",
        b'X' if spec.flags.alt_form && value != 0 => b"0X",
        _ => b"",
    };

    let layout = Layout {
        sign: None,
        prefix,
        leading_zeros,
        body_len: count,
        zero_fill: spec.flags.zero_pad && precision.is_none(),
    };
    emit_padded(spec, &layout, sink, |sink| {
        sink.put_slice(&digits[INT_BUF_LEN - count..])
    })
}

/// Render a floating-point value (`%f`, `%F`, `%e`, `%E`, `%g`, `%G`).
///
/// Digits come from the numeric core; no library float formatting is used.
pub fn format_float(value: f64, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    let upper = spec.uppercase();
    if value.is_nan() {
        let body: &[u8] = if upper { b"NAN" } else { b"nan" };
        return format_text_field(body, None, spec, sink);
    }
    if value.is_infinite() {
        let body: &[u8] = if upper { b"INF" } else { b"inf" };
        let sign = sign_byte(value < 0.0, value > 0.0, &spec.flags);
        return format_text_field(body, sign, spec, sink);
    }

    let negative = value < 0.0;
    let magnitude = if negative { -value } else { value };
    let alt = spec.flags.alt_form;
    let precision = spec
        .precision_value()
        .unwrap_or(DEFAULT_FLOAT_PRECISION);

    let text = match spec.conversion | 0x20 {
        b'e' => numeric::exponential_text(magnitude, precision, upper, alt),
        b'g' => numeric::general_text(magnitude, precision, upper, alt),
        _ => numeric::fixed_text(magnitude, precision, alt),
    };

    let layout = Layout {
        sign: sign_byte(negative, value > 0.0, &spec.flags),
        prefix: b"",
        leading_zeros: 0,
        body_len: text.len(),
        zero_fill: spec.flags.zero_pad,
    };
    emit_padded(spec, &layout, sink, |sink| text.emit(sink))
}

/// A fixed text field (`nan`, `inf`, `(nil)`), padded with spaces only.
fn format_text_field(
    body: &[u8],
    sign: Option<u8>,
    spec: &FormatSpec,
    sink: &mut OutputSink<'_>,
) -> bool {
    let layout = Layout {
        sign,
        prefix: b"",
        leading_zeros: 0,
        body_len: body.len(),
        zero_fill: false,
    };
    emit_padded(spec, &layout, sink, |sink| sink.put_slice(body))
}

/// Render a string (`%s`). `None` is a null string and renders `(null)`.
/// Precision truncates.
pub fn format_str(s: Option<&[u8]>, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    let s = s.unwrap_or(b"(null)");
    let effective = match spec.precision_value() {
        Some(p) => &s[..s.len().min(p)],
        None => s,
    };
    let layout = Layout {
        sign: None,
        prefix: b"",
        leading_zeros: 0,
        body_len: effective.len(),
        zero_fill: false,
    };
    emit_padded(spec, &layout, sink, |sink| sink.put_slice(effective))
}

/// Render one byte (`%c`), honouring width and alignment.
pub fn format_char(c: u8, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    let layout = Layout {
        sign: None,
        prefix: b"",
        leading_zeros: 0,
        body_len: 1,
        zero_fill: false,
    };
    emit_padded(spec, &layout, sink, |sink| sink.put(c))
}

/// Render a pointer (`%p`) as `0x...` hex, or `(nil)` for null.
pub fn format_pointer(addr: usize, spec: &FormatSpec, sink: &mut OutputSink<'_>) -> bool {
    if addr == 0 {
        return format_text_field(b"(nil)", None, spec, sink);
    }
    let mut digits = [0u8; INT_BUF_LEN];
    let count = render_digits(addr as u64, 16, false, &mut digits);
    let layout = Layout {
        sign: None,
        prefix: b"0x",
        leading_zeros: 0,
        body_len: count,
        zero_fill: false,
    };
    emit_padded(spec, &layout, sink, |sink| {
        sink.put_slice(&digits[INT_BUF_LEN - count..])
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
