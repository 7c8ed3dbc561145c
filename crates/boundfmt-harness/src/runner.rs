//! Test execution engine.

use std::cell::Cell;
use std::collections::BTreeMap;

use boundfmt_core::{RenderError, RenderMode, SliceCursor, try_render};

use crate::diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet, engine_args};
use crate::verify::VerificationResult;

/// Fill byte for the output buffer, so stray writes past the terminator show.
const GUARD: u8 = 0xAA;

/// Expand a mode name (`compat`, `strict`, `both`) into the modes to run.
pub fn parse_modes(text: &str) -> Result<Vec<RenderMode>, HarnessError> {
    match text.to_ascii_lowercase().as_str() {
        "compat" => Ok(vec![RenderMode::Compat]),
        "strict" => Ok(vec![RenderMode::Strict]),
        "both" => Ok(vec![RenderMode::Compat, RenderMode::Strict]),
        _ => Err(HarnessError::Mode(text.to_string())),
    }
}

/// What one render of a fixture case produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRun {
    /// Bytes in front of the terminator.
    pub output: String,
    pub ret: i32,
    /// Final value of each labelled `%n` target.
    pub counts: BTreeMap<String, i32>,
    /// The engine's error, if it returned one.
    pub error: Option<String>,
    /// Buffer contract breaches (missing terminator, writes past it).
    pub violations: Vec<String>,
}

/// Render `case` once under `mode` into a guarded buffer of its capacity.
#[must_use]
pub fn execute_case(case: &FixtureCase, mode: RenderMode) -> CaseRun {
    let labels: Vec<&str> = case.args.iter().filter_map(|a| a.count_label()).collect();
    let cells = vec![Cell::new(-1); labels.len()];
    let args = engine_args(&case.args, &cells);
    let mut buf = vec![GUARD; case.capacity];

    let result = try_render(
        &mut buf,
        case.template.as_bytes(),
        &mut SliceCursor::new(&args),
        mode,
    );

    let mut error = None;
    let (ret, end) = match result {
        Ok(n) => (i32::try_from(n).unwrap_or(i32::MAX), Some(n)),
        Err(RenderError::BufferTooSmall) => (RenderError::SENTINEL, None),
        Err(err) => {
            error = Some(err.to_string());
            (RenderError::SENTINEL, buf.iter().position(|&b| b == 0))
        }
    };

    let mut violations = Vec::new();
    let output = match end {
        Some(n) => {
            if buf.get(n) != Some(&0) {
                violations.push(format!("no terminator at offset {n}"));
            }
            if buf.iter().skip(n + 1).any(|&b| b != GUARD) {
                violations.push(String::from("bytes past the terminator were modified"));
            }
            String::from_utf8_lossy(&buf[..n.min(buf.len())]).into_owned()
        }
        None => {
            if buf.iter().any(|&b| b != GUARD) {
                violations.push(String::from("failed render modified the buffer"));
            }
            String::new()
        }
    };

    let counts = labels
        .iter()
        .zip(&cells)
        .map(|(label, cell)| ((*label).to_string(), cell.get()))
        .collect();

    CaseRun {
        output,
        ret,
        counts,
        error,
        violations,
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    pub mode: RenderMode,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: RenderMode) -> Self {
        Self {
            campaign: campaign.into(),
            mode,
        }
    }

    /// Run every case whose mode matches this runner's.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| mode_matches(self.mode, &case.mode))
            .map(|case| self.verify_case(case))
            .collect()
    }

    fn verify_case(&self, case: &FixtureCase) -> VerificationResult {
        let run = execute_case(case, self.mode);

        let mut notes = Vec::new();
        if run.output != case.expected_output {
            notes.push(diff::render_diff(&case.expected_output, &run.output));
        }
        if run.ret != case.expected_return {
            notes.push(format!(
                "return value: expected {}, got {}",
                case.expected_return, run.ret
            ));
        }
        for (label, expected) in &case.expected_counts {
            let actual = run.counts.get(label).copied();
            if actual != Some(*expected) {
                notes.push(format!("count '{label}': expected {expected}, got {actual:?}"));
            }
        }
        notes.extend(run.violations.iter().cloned());
        let passed = notes.is_empty();
        if let Some(err) = &run.error {
            notes.push(format!("engine error: {err}"));
        }

        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode.as_str())
        } else {
            case.name.clone()
        };
        VerificationResult {
            case_name,
            campaign: self.campaign.clone(),
            section: case.section.clone(),
            mode: self.mode.as_str().to_string(),
            passed,
            expected: case.expected_output.clone(),
            actual: run.output,
            expected_return: case.expected_return,
            actual_return: run.ret,
            diff: (!notes.is_empty()).then(|| notes.join("\n")),
        }
    }
}

fn mode_matches(active: RenderMode, case_mode: &str) -> bool {
    case_mode.eq_ignore_ascii_case("both") || case_mode.eq_ignore_ascii_case(active.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(cases: &str) -> FixtureSet {
        FixtureSet::from_json(&format!(
            r#"{{
                "version":"v1",
                "family":"printf/core",
                "captured_at":"2026-10-01T00:00:00Z",
                "cases":[{cases}]
            }}"#
        ))
        .expect("valid fixture json")
    }

    #[test]
    fn both_mode_fixture_executes_under_active_mode() {
        let set = fixture(
            r#"{"name":"hex","section":"C11 7.21.6.1p8","template":"%#x","capacity":8,
                "args":[{"int":255}],"expected_output":"0xff","expected_return":4}"#,
        );
        let compat = TestRunner::new("smoke", RenderMode::Compat).run(&set);
        assert_eq!(compat.len(), 1);
        assert!(compat[0].passed, "{:?}", compat[0].diff);
        assert_eq!(compat[0].case_name, "hex [compat]");
        assert_eq!(compat[0].campaign, "smoke");

        let strict = TestRunner::new("smoke", RenderMode::Strict).run(&set);
        assert!(strict[0].passed);
        assert_eq!(strict[0].case_name, "hex [strict]");
    }

    #[test]
    fn mode_specific_cases_are_filtered() {
        let set = fixture(
            r#"{"name":"skip","section":"compat","template":"a%qb","capacity":8,
                "expected_output":"ab","expected_return":2,"mode":"compat"},
               {"name":"reject","section":"strict","template":"a%qb","capacity":8,
                "expected_output":"a","expected_return":-1,"mode":"strict"}"#,
        );
        let compat = TestRunner::new("modes", RenderMode::Compat).run(&set);
        assert_eq!(compat.len(), 1);
        assert_eq!(compat[0].case_name, "skip");
        assert!(compat[0].passed, "{:?}", compat[0].diff);

        let strict = TestRunner::new("modes", RenderMode::Strict).run(&set);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].case_name, "reject");
        assert!(strict[0].passed, "{:?}", strict[0].diff);
        assert!(strict[0].diff.as_deref().unwrap_or("").contains("engine error"));
    }

    #[test]
    fn counts_are_compared() {
        let set = fixture(
            r#"{"name":"count","section":"C11 7.21.6.1p8 n","template":"%s%n","capacity":16,
                "args":[{"str":"Hello"},{"count":"at"}],"expected_output":"Hello",
                "expected_return":5,"expected_counts":{"at":4}}"#,
        );
        let results = TestRunner::new("counts", RenderMode::Compat).run(&set);
        assert!(!results[0].passed);
        let diff = results[0].diff.as_deref().unwrap_or("");
        assert!(diff.contains("count 'at': expected 4, got Some(5)"), "{diff}");
    }

    #[test]
    fn mismatched_output_produces_diff() {
        let set = fixture(
            r#"{"name":"wrong","section":"demo","template":"%d","capacity":8,
                "args":[{"int":12}],"expected_output":"13","expected_return":2}"#,
        );
        let results = TestRunner::new("diff", RenderMode::Compat).run(&set);
        assert!(!results[0].passed);
        assert_eq!(results[0].actual, "12");
        assert!(results[0].diff.as_deref().unwrap_or("").contains("@@ byte 1 @@"));
    }

    #[test]
    fn zero_capacity_run_reports_sentinel() {
        let set = fixture(
            r#"{"name":"empty","section":"capacity","template":"%d","capacity":0,
                "args":[{"int":1}],"expected_output":"","expected_return":-1}"#,
        );
        let run = execute_case(&set.cases[0], RenderMode::Compat);
        assert_eq!(run.ret, -1);
        assert!(run.violations.is_empty());
        assert!(run.error.is_none());
    }

    #[test]
    fn parse_modes_accepts_known_names() {
        assert_eq!(parse_modes("both").unwrap().len(), 2);
        assert_eq!(parse_modes("STRICT").unwrap(), vec![RenderMode::Strict]);
        assert!(matches!(parse_modes("hardened"), Err(HarnessError::Mode(_))));
    }
}
