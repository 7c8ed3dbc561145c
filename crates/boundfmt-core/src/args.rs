//! Typed arguments and the cursor that hands them to converters.
//!
//! The engine never sees a raw varargs list. Each converter asks the cursor
//! for the next value as the type its directive needs, and the cursor
//! reinterprets whatever was supplied through its 64-bit pattern, narrowed
//! to the directive's length class (LP64: `hh`=8, `h`=16, none=32, the
//! rest 64 bits).

use core::cell::Cell;
use core::ffi::CStr;

use crate::directive::LengthMod;

/// One argument value.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Double(f64),
    Ptr(usize),
    /// String bytes; a NUL inside the slice ends the string.
    Str(&'a [u8]),
    /// A null string (or pointer) argument.
    Null,
    /// `%n` target.
    Count(&'a Cell<i32>),
}

impl Arg<'_> {
    /// The argument as a raw 64-bit pattern.
    ///
    /// Doubles yield their IEEE-754 bits; strings and counters yield their
    /// address.
    #[must_use]
    pub fn raw_bits(&self) -> u64 {
        match *self {
            Arg::Int(v) => v as u64,
            Arg::Uint(v) => v,
            Arg::Double(v) => v.to_bits(),
            Arg::Ptr(p) => p as u64,
            Arg::Str(s) => s.as_ptr().addr() as u64,
            Arg::Null => 0,
            Arg::Count(c) => core::ptr::from_ref(c).addr() as u64,
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Arg<'_> {
                fn from(v: $t) -> Self {
                    Arg::$variant(v as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int as i64: i8, i16, i32, i64, i128, isize);
impl_from_int!(Uint as u64: u8, u16, u32, u64, u128, usize);

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Double(v)
    }
}

impl From<f32> for Arg<'_> {
    fn from(v: f32) -> Self {
        Arg::Double(f64::from(v))
    }
}

impl From<char> for Arg<'_> {
    fn from(c: char) -> Self {
        Arg::Uint(u64::from(u32::from(c)))
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(s: &'a str) -> Self {
        Arg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(s: &'a [u8]) -> Self {
        Arg::Str(s)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Arg<'a> {
    fn from(s: &'a [u8; N]) -> Self {
        Arg::Str(s)
    }
}

impl<'a> From<&'a CStr> for Arg<'a> {
    fn from(s: &'a CStr) -> Self {
        Arg::Str(s.to_bytes())
    }
}

impl<'a> From<Option<&'a str>> for Arg<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(Arg::Null, Arg::from)
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(p: *const T) -> Self {
        Arg::Ptr(p.addr())
    }
}

impl<T> From<*mut T> for Arg<'_> {
    fn from(p: *mut T) -> Self {
        Arg::Ptr(p.addr())
    }
}

impl<'a> From<&'a Cell<i32>> for Arg<'a> {
    fn from(c: &'a Cell<i32>) -> Self {
        Arg::Count(c)
    }
}

fn narrow_signed(bits: u64, length: LengthMod) -> i64 {
    match length.bits() {
        8 => i64::from(bits as i8),
        16 => i64::from(bits as i16),
        32 => i64::from(bits as i32),
        _ => bits as i64,
    }
}

fn narrow_unsigned(bits: u64, length: LengthMod) -> u64 {
    match length.bits() {
        8 => u64::from(bits as u8),
        16 => u64::from(bits as u16),
        32 => u64::from(bits as u32),
        _ => bits,
    }
}

/// Source of arguments for one render call.
///
/// Only [`next_arg`](Self::next_arg) is required; the typed accessors
/// reinterpret its result. An exhausted cursor yields zero values and null
/// strings.
pub trait ArgumentCursor<'a> {
    /// The next raw argument, or `None` when exhausted.
    fn next_arg(&mut self) -> Option<Arg<'a>>;

    /// Signed integer narrowed to `length` and sign-extended.
    fn next_signed(&mut self, length: LengthMod) -> i64 {
        self.next_arg()
            .map_or(0, |arg| narrow_signed(arg.raw_bits(), length))
    }

    /// Unsigned integer narrowed to `length` and zero-extended.
    fn next_unsigned(&mut self, length: LengthMod) -> u64 {
        self.next_arg()
            .map_or(0, |arg| narrow_unsigned(arg.raw_bits(), length))
    }

    fn next_double(&mut self) -> f64 {
        match self.next_arg() {
            Some(Arg::Double(v)) => v,
            Some(other) => f64::from_bits(other.raw_bits()),
            None => 0.0,
        }
    }

    fn next_pointer(&mut self) -> usize {
        self.next_arg().map_or(0, |arg| arg.raw_bits() as usize)
    }

    /// String bytes up to the first NUL, or `None` for a null string.
    ///
    /// Non-string arguments cannot be dereferenced and read as null.
    fn next_str(&mut self) -> Option<&'a [u8]> {
        match self.next_arg() {
            Some(Arg::Str(s)) => {
                let end = s.iter().position(|&b| b == 0).unwrap_or(s.len());
                Some(&s[..end])
            }
            _ => None,
        }
    }

    fn next_count(&mut self) -> Option<&'a Cell<i32>> {
        match self.next_arg() {
            Some(Arg::Count(c)) => Some(c),
            _ => None,
        }
    }

    /// A `*` width or precision argument (a C `int`).
    fn next_star(&mut self) -> i32 {
        i32::try_from(self.next_signed(LengthMod::None)).unwrap_or_default()
    }
}

/// Cursor over a slice of pre-built arguments.
#[derive(Debug, Clone)]
pub struct SliceCursor<'s, 'a> {
    args: &'s [Arg<'a>],
    next: usize,
}

impl<'s, 'a> SliceCursor<'s, 'a> {
    #[must_use]
    pub const fn new(args: &'s [Arg<'a>]) -> Self {
        Self { args, next: 0 }
    }

    /// Number of arguments handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.next
    }

    #[must_use]
    pub fn remaining(&self) -> &'s [Arg<'a>] {
        &self.args[self.next..]
    }
}

impl<'a> ArgumentCursor<'a> for SliceCursor<'_, 'a> {
    fn next_arg(&mut self) -> Option<Arg<'a>> {
        let arg = self.args.get(self.next).copied()?;
        self.next += 1;
        Some(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_narrowing_per_length_class() {
        let args = [Arg::from(-123i32); 5];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_signed(LengthMod::Hh), -123);
        assert_eq!(cursor.next_signed(LengthMod::H), -123);
        assert_eq!(cursor.next_signed(LengthMod::None), -123);
        assert_eq!(cursor.next_signed(LengthMod::L), -123);
        assert_eq!(cursor.next_signed(LengthMod::Ll), -123);
    }

    #[test]
    fn unsigned_reinterprets_twos_complement() {
        let args = [Arg::from(-123i32); 4];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_unsigned(LengthMod::Hh), 133);
        assert_eq!(cursor.next_unsigned(LengthMod::H), 65413);
        assert_eq!(cursor.next_unsigned(LengthMod::None), 4_294_967_173);
        assert_eq!(cursor.next_unsigned(LengthMod::L), u64::MAX - 122);
    }

    #[test]
    fn wide_values_truncate_to_the_class() {
        let args = [Arg::from(0x1_2345_6789u64), Arg::from(300u32)];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_unsigned(LengthMod::None), 0x2345_6789);
        assert_eq!(cursor.next_signed(LengthMod::Hh), 44);
    }

    #[test]
    fn exhausted_cursor_yields_defaults() {
        let mut cursor = SliceCursor::new(&[]);
        assert_eq!(cursor.next_signed(LengthMod::None), 0);
        assert_eq!(cursor.next_unsigned(LengthMod::L), 0);
        assert_eq!(cursor.next_double(), 0.0);
        assert_eq!(cursor.next_pointer(), 0);
        assert_eq!(cursor.next_str(), None);
        assert!(cursor.next_count().is_none());
        assert_eq!(cursor.next_star(), 0);
        assert_eq!(cursor.consumed(), 0);
    }

    #[test]
    fn double_and_integer_share_bit_patterns() {
        let args = [Arg::from(1.5f64), Arg::from(1.5f64.to_bits())];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_unsigned(LengthMod::Ll), 1.5f64.to_bits());
        assert_eq!(cursor.next_double(), 1.5);
    }

    #[test]
    fn strings_stop_at_nul_and_null_reads_none() {
        let args = [
            Arg::from(b"ab\0cd"),
            Arg::from(None::<&str>),
            Arg::from(7i32),
            Arg::from(c"hi"),
        ];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_str(), Some(&b"ab"[..]));
        assert_eq!(cursor.next_str(), None);
        assert_eq!(cursor.next_str(), None);
        assert_eq!(cursor.next_str(), Some(&b"hi"[..]));
        assert!(cursor.remaining().is_empty());
    }

    #[test]
    fn counters_round_trip() {
        let cell = Cell::new(0);
        let args = [Arg::from(&cell), Arg::from(1i32)];
        let mut cursor = SliceCursor::new(&args);
        let target = cursor.next_count().unwrap();
        target.set(9);
        assert_eq!(cell.get(), 9);
        assert!(cursor.next_count().is_none());
        assert_eq!(cursor.consumed(), 2);
    }

    #[test]
    fn pointers_and_chars() {
        let value = 5u8;
        let p: *const u8 = &value;
        let args = [Arg::from(p), Arg::from(core::ptr::null::<u8>()), Arg::from('!')];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_pointer(), p.addr());
        assert_eq!(cursor.next_pointer(), 0);
        assert_eq!(cursor.next_unsigned(LengthMod::None), u64::from(b'!'));
    }

    #[test]
    fn star_reads_a_c_int() {
        let args = [Arg::from(-7i64), Arg::from(16usize)];
        let mut cursor = SliceCursor::new(&args);
        assert_eq!(cursor.next_star(), -7);
        assert_eq!(cursor.next_star(), 16);
    }
}
