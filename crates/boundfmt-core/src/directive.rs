//! Directive parser and template segmentation.
//!
//! A directive is everything from a `%` up to and including its conversion
//! byte. Flags, digit runs, `*` and length modifiers may appear in any order
//! before the conversion; each byte updates the descriptor and the loop
//! continues until a conversion (or `%`) terminates it.
//!
//! Unknown bytes end the directive without output. Whether that is an error
//! is decided by the scanner, see [`RenderMode`](crate::RenderMode).

// ---------------------------------------------------------------------------
// Directive descriptor types
// ---------------------------------------------------------------------------

/// Field alignment selected by the `+` and `-` flags. The later flag wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// No alignment flag: right-aligned, no forced sign.
    #[default]
    Default,
    /// `+`: right-aligned with a forced sign on positive signed values.
    Right,
    /// `-`: left-aligned, padded on the right with spaces.
    Left,
}

/// Flags parsed from a directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub align: Alignment,
    pub space_sign: bool, // ' '
    pub alt_form: bool,   // '#'
    pub zero_pad: bool,   // '0'
}

impl FormatFlags {
    #[must_use]
    pub const fn left_justify(&self) -> bool {
        matches!(self.align, Alignment::Left)
    }

    #[must_use]
    pub const fn force_sign(&self) -> bool {
        matches!(self.align, Alignment::Right)
    }
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length class of an integer argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthMod {
    #[default]
    None,
    Hh, // 'hh'
    H,  // 'h'
    L,  // 'l'
    Ll, // 'll'
    Z,  // 'z'
    T,  // 't'
    J,  // 'j'
}

impl LengthMod {
    /// Bit width of the argument under an LP64 data model.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Hh => 8,
            Self::H => 16,
            Self::None => 32,
            Self::L | Self::Ll | Self::Z | Self::T | Self::J => 64,
        }
    }

    fn escalate_h(self) -> Self {
        match self {
            Self::H | Self::Hh => Self::Hh,
            _ => Self::H,
        }
    }

    fn escalate_l(self) -> Self {
        match self {
            Self::L | Self::Ll => Self::Ll,
            _ => Self::L,
        }
    }
}

/// A parsed directive, consumed by exactly one converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

impl FormatSpec {
    /// A bare `%<conversion>` descriptor.
    #[must_use]
    pub const fn new(conversion: u8) -> Self {
        Self {
            flags: FormatFlags {
                align: Alignment::Default,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
        }
    }

    /// Literal width, or 0 when absent or still pending a `*` argument.
    #[must_use]
    pub const fn width_value(&self) -> usize {
        match self.width {
            Width::Fixed(w) => w,
            _ => 0,
        }
    }

    /// Literal precision, if one was given.
    #[must_use]
    pub const fn precision_value(&self) -> Option<usize> {
        match self.precision {
            Precision::Fixed(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub const fn uppercase(&self) -> bool {
        self.conversion.is_ascii_uppercase()
    }
}

/// Outcome of parsing the bytes after one `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// A supported conversion.
    Spec(FormatSpec),
    /// `%%` (or a `%` reached mid-directive): emits one literal `%`.
    Percent,
    /// The directive ended on an unrecognised byte.
    Unsupported(u8),
    /// The template ended inside the directive.
    Incomplete,
}

/// A segment of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion requiring arguments.
    Spec(FormatSpec),
    /// A directive ended by an unrecognised byte.
    Unsupported {
        /// Offset of the opening `%` in the template.
        offset: usize,
        conversion: u8,
    },
    /// The template ran out inside a directive. Always the last segment.
    Incomplete,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse one directive. `fmt` starts at the byte AFTER '%'.
///
/// Returns the directive and the number of bytes consumed from `fmt`. A NUL
/// byte is treated as the end of the template.
#[must_use]
pub fn parse_directive(fmt: &[u8]) -> (Directive, usize) {
    let mut spec = FormatSpec::new(0);
    let mut dot = false;
    let mut pos = 0;
    let len = fmt.len();

    while pos < len {
        let byte = fmt[pos];
        pos += 1;
        match byte {
            0 => break,
            b'-' => spec.flags.align = Alignment::Left,
            b'+' => spec.flags.align = Alignment::Right,
            b' ' => spec.flags.space_sign = true,
            b'#' => spec.flags.alt_form = true,
            b'.' => {
                dot = true;
                spec.precision = Precision::Fixed(0);
            }
            b'*' => {
                if !dot && spec.width == Width::None {
                    spec.width = Width::FromArg;
                } else {
                    spec.precision = Precision::FromArg;
                }
            }
            b'0' if !dot && spec.width == Width::None => spec.flags.zero_pad = true,
            b'0'..=b'9' => {
                let start = pos - 1;
                while pos < len && fmt[pos].is_ascii_digit() {
                    pos += 1;
                }
                let value = parse_decimal(&fmt[start..pos]);
                if dot {
                    spec.precision = Precision::Fixed(value);
                } else {
                    spec.width = Width::Fixed(value);
                }
            }
            b'h' => spec.length = spec.length.escalate_h(),
            b'l' => spec.length = spec.length.escalate_l(),
            b'z' => spec.length = LengthMod::Z,
            b't' => spec.length = LengthMod::T,
            b'j' => spec.length = LengthMod::J,
            b'L' => {}
            b'%' => return (Directive::Percent, pos),
            b'd' | b'i' | b'u' | b'o' | b'x' | b'X' | b'f' | b'F' | b'e' | b'E' | b'g' | b'G'
            | b's' | b'c' | b'n' | b'p' => {
                spec.conversion = byte;
                return (Directive::Spec(spec), pos);
            }
            other => return (Directive::Unsupported(other), pos),
        }
    }
    (Directive::Incomplete, pos)
}

/// Iterate over the segments of a template without allocating.
///
/// The template ends at its first NUL byte.
#[must_use]
pub fn parse_format_string(fmt: &[u8]) -> Segments<'_> {
    let end = fmt.iter().position(|&b| b == 0).unwrap_or(fmt.len());
    Segments {
        fmt: &fmt[..end],
        pos: 0,
    }
}

/// Iterator returned by [`parse_format_string`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    fmt: &'a [u8],
    pos: usize,
}

impl<'a> Segments<'a> {
    /// Template bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.fmt[self.pos..]
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = FormatSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let fmt = self.fmt;
        let start = self.pos;
        if start >= fmt.len() {
            return None;
        }

        if fmt[start] != b'%' {
            let run = fmt[start..]
                .iter()
                .position(|&b| b == b'%')
                .unwrap_or(fmt.len() - start);
            self.pos = start + run;
            return Some(FormatSegment::Literal(&fmt[start..self.pos]));
        }

        let (directive, consumed) = parse_directive(&fmt[start + 1..]);
        self.pos = start + 1 + consumed;
        Some(match directive {
            Directive::Spec(spec) => FormatSegment::Spec(spec),
            Directive::Percent => FormatSegment::Percent,
            Directive::Unsupported(conversion) => FormatSegment::Unsupported {
                offset: start,
                conversion,
            },
            Directive::Incomplete => FormatSegment::Incomplete,
        })
    }
}

impl core::iter::FusedIterator for Segments<'_> {}

fn parse_decimal(digits: &[u8]) -> usize {
    let mut result = 0_usize;
    for &d in digits {
        result = result
            .saturating_mul(10)
            .saturating_add(usize::from(d - b'0'));
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
