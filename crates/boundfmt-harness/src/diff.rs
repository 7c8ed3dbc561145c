//! Diff rendering for fixture comparison.

use std::fmt::Write as _;

/// Render a byte-level diff between expected and actual output.
///
/// Rendered text is a single line, so the diff points at the first
/// differing column instead of comparing lines.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let at = expected
        .bytes()
        .zip(actual.bytes())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.len().min(actual.len()));

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");
    let _ = writeln!(out, "@@ byte {at} @@");
    let _ = writeln!(out, "-{expected:?} (len {})", expected.len());
    let _ = writeln!(out, "+{actual:?} (len {})", actual.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs() {
        assert_eq!(render_diff("abc", "abc"), "[identical]");
    }

    #[test]
    fn points_at_first_difference() {
        let diff = render_diff("1.233333e+02", "1.233333e+002");
        assert!(diff.contains("@@ byte 11 @@"), "{diff}");
        assert!(diff.contains("-\"1.233333e+02\" (len 12)"), "{diff}");
        assert!(diff.contains("+\"1.233333e+002\" (len 13)"), "{diff}");
    }

    #[test]
    fn prefix_difference_points_at_end() {
        let diff = render_diff("Hello", "Hel");
        assert!(diff.contains("@@ byte 3 @@"), "{diff}");
    }
}
