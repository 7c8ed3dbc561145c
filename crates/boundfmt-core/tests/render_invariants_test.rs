//! Deterministic randomized sweeps over the rendering invariants.

use std::cell::Cell;

use boundfmt_core::{Arg, RenderMode, SliceCursor, try_render};

/// xorshift64*; fixed seeds keep failures reproducible.
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'t, T>(&mut self, items: &'t [T]) -> &'t T {
        &items[self.below(items.len())]
    }
}

const TOKENS: &[&str] = &[
    "abc", " ", "-", "%d", "%5d", "%-8.3x", "%#o", "%+.2f", "%e", "%G", "%s", "%.3s", "%c",
    "%p", "%*d", "%.*f", "%%", "%hhu", "%lld", "%n", "%q", "%", "%0*lx", "% i", "%#.0e",
    "%20.10g", "%-*s", "%X",
];

const STRINGS: &[&str] = &["", "x", "Hello", "a much longer string argument"];

fn random_template(rng: &mut Rng) -> String {
    let count = rng.below(8) + 1;
    (0..count).map(|_| *rng.pick(TOKENS)).collect()
}

fn random_arg<'a>(rng: &mut Rng, counter: &'a Cell<i32>) -> Arg<'a> {
    match rng.below(8) {
        0 => Arg::Int(rng.next_u64() as i64),
        1 => Arg::Int(rng.below(200) as i64 - 100),
        2 => Arg::Uint(rng.next_u64()),
        3 => Arg::Double(f64::from_bits(rng.next_u64())),
        4 => Arg::Double((rng.below(2_000_000) as f64 - 1_000_000.0) / 64.0),
        5 => Arg::from(*rng.pick(STRINGS)),
        6 => Arg::Null,
        _ => Arg::Count(counter),
    }
}

fn render(buf: &mut [u8], template: &str, args: &[Arg<'_>]) -> usize {
    try_render(
        buf,
        template.as_bytes(),
        &mut SliceCursor::new(args),
        RenderMode::Compat,
    )
    .expect("non-empty buffer renders")
}

#[test]
fn output_is_bounded_and_terminated() {
    let mut rng = Rng::new(0x5EED_0001);
    let counter = Cell::new(0);
    for _ in 0..2_000 {
        let template = random_template(&mut rng);
        let args: Vec<Arg<'_>> = (0..rng.below(10))
            .map(|_| random_arg(&mut rng, &counter))
            .collect();

        let mut full = vec![0u8; 4096];
        let full_len = render(&mut full, &template, &args);
        assert!(full_len < full.len());
        assert_eq!(full[full_len], 0);

        let capacity = rng.below(64) + 1;
        let mut buf = vec![0xAAu8; capacity + 8];
        let r = render(&mut buf[..capacity], &template, &args);
        assert!(r <= capacity - 1, "template {template:?}: {r} > {capacity} - 1");
        assert_eq!(buf[r], 0, "template {template:?}: missing terminator");
        assert!(
            buf[capacity..].iter().all(|&b| b == 0xAA),
            "template {template:?}: wrote past the buffer"
        );
        assert_eq!(
            &buf[..r],
            &full[..r],
            "template {template:?}: truncated output is not a prefix"
        );
        assert_eq!(r, full_len.min(capacity - 1));
    }
}

fn parse_back(text: &str, base: u32) -> i128 {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = i128::from_str_radix(digits, base).expect("digits parse");
    if negative { -magnitude } else { magnitude }
}

struct LengthClass {
    modifier: &'static str,
    bits: u32,
}

const CLASSES: &[LengthClass] = &[
    LengthClass { modifier: "hh", bits: 8 },
    LengthClass { modifier: "h", bits: 16 },
    LengthClass { modifier: "", bits: 32 },
    LengthClass { modifier: "l", bits: 64 },
    LengthClass { modifier: "ll", bits: 64 },
];

fn signed_in_class(raw: u64, bits: u32) -> i128 {
    let shift = 64 - bits;
    i128::from(((raw << shift) as i64) >> shift)
}

fn unsigned_in_class(raw: u64, bits: u32) -> i128 {
    if bits == 64 {
        i128::from(raw)
    } else {
        i128::from(raw & ((1u64 << bits) - 1))
    }
}

#[test]
fn integers_round_trip_per_base_and_class() {
    let mut rng = Rng::new(0x5EED_0002);
    let mut buf = [0u8; 96];
    for class in CLASSES {
        let mut values: Vec<u64> = (0..300).map(|_| rng.next_u64()).collect();
        // Extremes of the class, both signed and unsigned.
        let top = if class.bits == 64 { u64::MAX } else { (1u64 << class.bits) - 1 };
        values.extend([0, 1, top, top >> 1, (top >> 1) + 1, u64::MAX]);

        for &raw in &values {
            let template = format!("%{}d", class.modifier);
            let n = render(&mut buf, &template, &[Arg::Uint(raw)]);
            let text = std::str::from_utf8(&buf[..n]).unwrap();
            assert_eq!(
                parse_back(text, 10),
                signed_in_class(raw, class.bits),
                "{template} of {raw:#x}"
            );

            for (conversion, base) in [("u", 10), ("o", 8), ("x", 16), ("X", 16)] {
                let template = format!("%{}{conversion}", class.modifier);
                let n = render(&mut buf, &template, &[Arg::Uint(raw)]);
                let text = std::str::from_utf8(&buf[..n]).unwrap();
                assert_eq!(
                    parse_back(text, base),
                    unsigned_in_class(raw, class.bits),
                    "{template} of {raw:#x}"
                );
            }
        }
    }
}

#[test]
fn literal_templates_are_copied_verbatim() {
    let mut rng = Rng::new(0x5EED_0003);
    for _ in 0..500 {
        let len = rng.below(80);
        let template: Vec<u8> = (0..len)
            .map(|_| loop {
                let b = (rng.next_u64() & 0xFF) as u8;
                if b != b'%' && b != 0 {
                    break b;
                }
            })
            .collect();
        let capacity = rng.below(100) + 1;
        let mut buf = vec![0u8; capacity];
        let r = try_render(&mut buf, &template, &mut SliceCursor::new(&[]), RenderMode::Strict)
            .expect("literal templates never fail");
        let expected = &template[..template.len().min(capacity - 1)];
        assert_eq!(&buf[..r], expected);
        assert_eq!(buf[r], 0);
    }
}

#[test]
fn doubled_percent_renders_single_percents() {
    let mut buf = [0u8; 256];
    for n in 0..100 {
        let template = "%%".repeat(n);
        let r = render(&mut buf, &template, &[]);
        assert_eq!(r, n);
        assert!(buf[..r].iter().all(|&b| b == b'%'));
    }
}

#[test]
fn huge_widths_and_precisions_stay_bounded() {
    let mut buf = [0u8; 48];
    for template in ["%*d", "%.*d", "%*.*f", "%.*e", "%*g", "%*s", "%.*x"] {
        let args = [Arg::Int(i64::from(i32::MAX)), Arg::Int(7), Arg::Double(2.5)];
        let r = render(&mut buf, template, &args);
        assert_eq!(r, buf.len() - 1, "{template}");
        assert_eq!(buf[r], 0);
    }
}

#[test]
fn extreme_doubles_render_without_panicking() {
    let mut buf = [0u8; 160];
    let values = [
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        5e-324,
        -5e-324,
        1e99,
        1e100,
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        0.0,
        -0.0,
    ];
    for value in values {
        for template in ["%f", "%e", "%g", "%.40f", "%#.0E", "%.17g"] {
            let r = render(&mut buf, template, &[Arg::Double(value)]);
            assert!(r < buf.len());
            assert_eq!(buf[r], 0);
        }
    }

    let r = render(&mut buf, "%.0f", &[Arg::Double(1e120)]);
    assert_eq!(&buf[..r], "9".repeat(99).as_bytes());

    let r = render(&mut buf, "%e|%e", &[Arg::Double(f64::MAX), Arg::Double(5e-324)]);
    let text = std::str::from_utf8(&buf[..r]).unwrap();
    assert!(text.starts_with("1.797693e+308|"), "{text}");
    assert!(text.ends_with("e-324"), "{text}");
}
