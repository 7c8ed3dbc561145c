//! Numeric core: number-to-text without a math library.
//!
//! Powers of ten are built by repeated multiplication, magnitudes are found
//! by repeated scaling, and decimal digits are peeled off one at a time from
//! the most significant place down. Every loop is bounded either by a
//! digit capacity below or by the exponent range of `f64`.
//!
//! All scratch storage is stack-local to the caller.

use crate::sink::OutputSink;

/// Integral digits kept for `%f`. Larger magnitudes saturate to all `9`s.
pub const MAX_INTEGRAL_DIGITS: usize = 99;
/// Fractional digits extracted; higher precisions are completed with `0`.
pub const MAX_FRACTION_DIGITS: usize = 29;
/// Scratch size for integer text: a u64 in octal is 22 digits.
pub const INT_BUF_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Integer text
// ---------------------------------------------------------------------------

/// Render `value` in the given `base` into the END of `buf`.
/// Returns the number of digits written. Digits are placed right-aligned.
pub fn render_digits(
    mut value: u64,
    base: u64,
    uppercase: bool,
    buf: &mut [u8; INT_BUF_LEN],
) -> usize {
    if value == 0 {
        buf[INT_BUF_LEN - 1] = b'0';
        return 1;
    }
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = INT_BUF_LEN;
    while value > 0 && pos > 0 {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
    }
    INT_BUF_LEN - pos
}

// ---------------------------------------------------------------------------
// Powers and magnitudes
// ---------------------------------------------------------------------------

/// `10^n` by repeated multiplication; negative `n` gives the reciprocal.
///
/// Stops early once the product overflows to infinity, so the loop runs at
/// most a few hundred times for any `n`.
#[must_use]
pub fn pow_10(n: i32) -> f64 {
    if n < 0 {
        return 1.0 / pow_10(n.saturating_neg());
    }
    let mut p = 1.0_f64;
    for _ in 0..n {
        p *= 10.0;
        if p.is_infinite() {
            break;
        }
    }
    p
}

/// The `k` with `10^k <= |r| < 10^(k+1)`, found by scaling.
///
/// Zero and non-finite inputs return 0. For `|r| >= 1` the result agrees
/// with [`pow_10`]: `pow_10(k) <= |r| < pow_10(k + 1)`.
#[must_use]
pub fn log_10(r: f64) -> i32 {
    let mut r = if r < 0.0 { -r } else { r };
    if r == 0.0 || !r.is_finite() {
        return 0;
    }

    let mut k = 0;
    if r >= 1.0 {
        let mut p = 1.0_f64;
        while p * 10.0 <= r {
            p *= 10.0;
            k += 1;
        }
    } else {
        while r < 1e-200 {
            r *= 1e200;
            k -= 200;
        }
        let mut p = 1.0_f64;
        while r * p < 1.0 {
            p *= 10.0;
            k -= 1;
        }
    }
    k
}

/// `value * 10^n` for `n >= 0`, in chunks so subnormal inputs do not
/// overflow the scale factor.
fn scale_up(mut value: f64, mut n: i32) -> f64 {
    while n > 200 {
        value *= 1e200;
        n -= 200;
    }
    value * pow_10(n)
}

/// 2^52: the smallest magnitude whose ulp is at least 1.
const NO_FRACTION_BITS: f64 = 4_503_599_627_370_496.0;

/// Add half a unit in the last requested place (round half away from zero
/// on a magnitude).
///
/// Magnitudes of 2^52 and above have no fractional bits and are returned
/// unchanged.
fn round_at(magnitude: f64, precision: usize) -> f64 {
    if magnitude >= NO_FRACTION_BITS {
        return magnitude;
    }
    let places = i32::try_from(precision).unwrap_or(i32::MAX).min(400);
    magnitude + 0.5 * pow_10(-places)
}

// ---------------------------------------------------------------------------
// Digit extraction
// ---------------------------------------------------------------------------

/// Integral part of a float as decimal digits, most significant first.
#[derive(Clone, Copy)]
pub struct IntegralDigits {
    digits: [u8; MAX_INTEGRAL_DIGITS],
    len: usize,
}

impl IntegralDigits {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            digits: [b'0'; MAX_INTEGRAL_DIGITS],
            len: 0,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.digits[..self.len]
    }

    /// True when the value did not fit and was replaced by the `9` fill.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.len == MAX_INTEGRAL_DIGITS && self.digits.iter().all(|&d| d == b'9')
    }
}

impl Default for IntegralDigits {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for IntegralDigits {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("IntegralDigits")
            .field(&core::str::from_utf8(self.as_bytes()).unwrap_or("?"))
            .finish()
    }
}

/// Split a non-negative finite magnitude into integral digits and the
/// fractional remainder, which is returned.
///
/// Digits are found by long division from the top power of ten down. A value
/// needing more than [`MAX_INTEGRAL_DIGITS`] digits fills `digits` with `9`
/// and returns a zero remainder.
pub fn integral(real: f64, digits: &mut IntegralDigits) -> f64 {
    digits.len = 0;
    if real < 1.0 || !real.is_finite() {
        digits.digits[0] = b'0';
        digits.len = 1;
        return if real > 0.0 && real < 1.0 { real } else { 0.0 };
    }

    // real >= 1, so the magnitude is non-negative.
    let top = log_10(real).unsigned_abs() as usize;
    if top >= MAX_INTEGRAL_DIGITS {
        digits.digits = [b'9'; MAX_INTEGRAL_DIGITS];
        digits.len = MAX_INTEGRAL_DIGITS;
        return 0.0;
    }

    let mut acc = 0.0_f64;
    for place in (0..=top).rev() {
        // place < MAX_INTEGRAL_DIGITS, so the cast is lossless.
        let p = pow_10(place as i32);
        // Divide the remainder, not the sum: past 2^53 `acc + p` can round
        // back to `acc`.
        let s = (real - acc) / p;
        let mut d = 0_u8;
        while d < 9 && f64::from(d + 1) <= s {
            d += 1;
        }
        acc += f64::from(d) * p;
        digits.digits[digits.len] = b'0' + d;
        digits.len += 1;
    }

    let frac = real - acc;
    if frac > 0.0 { frac } else { 0.0 }
}

/// Peel up to [`MAX_FRACTION_DIGITS`] decimal digits off a fraction in
/// `[0, 1)`. Returns the number of digits written to `out`.
fn fraction_digits(mut frac: f64, count: usize, out: &mut [u8; MAX_FRACTION_DIGITS]) -> usize {
    let count = count.min(MAX_FRACTION_DIGITS);
    for slot in out.iter_mut().take(count) {
        frac *= 10.0;
        let d = if frac >= 9.0 {
            9
        } else if frac > 0.0 {
            frac as u8
        } else {
            0
        };
        *slot = b'0' + d;
        frac -= f64::from(d);
    }
    count
}

// ---------------------------------------------------------------------------
// Float text
// ---------------------------------------------------------------------------

/// The unsigned body of a rendered float: digits, point, and exponent.
///
/// Built on the stack by [`fixed_text`], [`exponential_text`] and
/// [`general_text`], measured with [`len`](Self::len) for padding, then
/// written with [`emit`](Self::emit).
#[derive(Debug, Clone, Copy)]
pub struct FloatText {
    integral: IntegralDigits,
    fraction: [u8; MAX_FRACTION_DIGITS],
    fraction_len: usize,
    trailing_zeros: usize,
    point: bool,
    exponent: Option<(u8, i32)>,
}

impl FloatText {
    fn from_magnitude(magnitude: f64, precision: usize, alt_form: bool) -> Self {
        let mut integral_digits = IntegralDigits::new();
        let frac = integral(magnitude, &mut integral_digits);
        let mut fraction = [b'0'; MAX_FRACTION_DIGITS];
        let fraction_len = fraction_digits(frac, precision, &mut fraction);
        Self {
            integral: integral_digits,
            fraction,
            fraction_len,
            trailing_zeros: precision - fraction_len,
            point: precision > 0 || alt_form,
            exponent: None,
        }
    }

    /// Drop trailing fractional zeros; keep the point only under `#`.
    fn strip_trailing_zeros(&mut self, alt_form: bool) {
        self.trailing_zeros = 0;
        while self.fraction_len > 0 && self.fraction[self.fraction_len - 1] == b'0' {
            self.fraction_len -= 1;
        }
        self.point = self.fraction_len > 0 || alt_form;
    }

    /// Rendered length in bytes, saturating.
    #[must_use]
    pub fn len(&self) -> usize {
        let exponent_len = self.exponent.map_or(0, |(_, e)| {
            // |e| <= 324 for any f64.
            let digits = if e.unsigned_abs() < 100 { 2 } else { 3 };
            2 + digits
        });
        self.integral
            .len
            .saturating_add(usize::from(self.point))
            .saturating_add(self.fraction_len)
            .saturating_add(self.trailing_zeros)
            .saturating_add(exponent_len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the body to `sink`. Returns false once the sink is full.
    pub fn emit(&self, sink: &mut OutputSink<'_>) -> bool {
        if !sink.put_slice(self.integral.as_bytes()) {
            return false;
        }
        if self.point && !sink.put(b'.') {
            return false;
        }
        if !sink.put_slice(&self.fraction[..self.fraction_len]) {
            return false;
        }
        if !sink.pad(b'0', self.trailing_zeros) {
            return false;
        }
        let Some((marker, exponent)) = self.exponent else {
            return true;
        };
        let sign = if exponent < 0 { b'-' } else { b'+' };
        if !(sink.put(marker) && sink.put(sign)) {
            return false;
        }
        let abs = exponent.unsigned_abs();
        if abs < 10 && !sink.put(b'0') {
            return false;
        }
        let mut buf = [0u8; INT_BUF_LEN];
        let n = render_digits(u64::from(abs), 10, false, &mut buf);
        sink.put_slice(&buf[INT_BUF_LEN - n..])
    }
}

/// `%f`: fixed-point text for a non-negative finite magnitude.
#[must_use]
pub fn fixed_text(magnitude: f64, precision: usize, alt_form: bool) -> FloatText {
    FloatText::from_magnitude(round_at(magnitude, precision), precision, alt_form)
}

/// Normalise to a mantissa in `[1, 10)` and its decimal exponent, rounded
/// at `precision` fractional digits.
fn normalize(magnitude: f64, precision: usize) -> (f64, i32) {
    if magnitude == 0.0 {
        return (0.0, 0);
    }
    let mut exponent = log_10(magnitude);
    let mut mantissa = if exponent >= 0 {
        magnitude / pow_10(exponent)
    } else {
        scale_up(magnitude, exponent.saturating_neg())
    };
    for _ in 0..2 {
        if mantissa >= 10.0 {
            mantissa /= 10.0;
            exponent += 1;
        } else if mantissa < 1.0 {
            mantissa *= 10.0;
            exponent -= 1;
        }
    }

    mantissa = round_at(mantissa, precision);
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    (mantissa, exponent)
}

/// `%e`: exponential text for a non-negative finite magnitude.
#[must_use]
pub fn exponential_text(
    magnitude: f64,
    precision: usize,
    uppercase: bool,
    alt_form: bool,
) -> FloatText {
    let (mantissa, exponent) = normalize(magnitude, precision);
    let mut text = FloatText::from_magnitude(mantissa, precision, alt_form);
    text.exponent = Some((if uppercase { b'E' } else { b'e' }, exponent));
    text
}

/// `%g`: `precision` significant digits (0 means 1), in fixed style when
/// the rounded exponent `x` satisfies `-4 < x < precision`, otherwise in
/// exponential style. Trailing fractional zeros are always removed.
#[must_use]
pub fn general_text(
    magnitude: f64,
    precision: usize,
    uppercase: bool,
    alt_form: bool,
) -> FloatText {
    let significant = precision.max(1);
    let (_, x) = normalize(magnitude, significant - 1);

    let fixed_range = if x >= 0 {
        (x.unsigned_abs() as usize) < significant
    } else {
        x > -4
    };
    let mut text = if fixed_range {
        // x < significant here, so the subtraction cannot underflow.
        let decimals = if x >= 0 {
            significant - 1 - x.unsigned_abs() as usize
        } else {
            significant - 1 + x.unsigned_abs() as usize
        };
        fixed_text(magnitude, decimals, alt_form)
    } else {
        exponential_text(magnitude, significant - 1, uppercase, alt_form)
    };
    text.strip_trailing_zeros(alt_form);
    text
}
