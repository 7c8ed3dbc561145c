//! Report generation for conformance results.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A fixture file that fed the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSource {
    pub path: String,
    pub family: String,
    pub sha256: String,
    pub cases: usize,
}

/// A conformance report over one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    /// Modes exercised, e.g. `compat+strict`.
    pub mode: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    #[serde(default)]
    pub sources: Vec<FixtureSource>,
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "- Mode: {}", self.mode);
        let _ = writeln!(out, "- Timestamp: {}", self.timestamp);
        let _ = writeln!(out, "- Total: {}", self.summary.total);
        let _ = writeln!(out, "- Passed: {}", self.summary.passed);
        let _ = writeln!(out, "- Failed: {}\n", self.summary.failed);

        if !self.sources.is_empty() {
            out.push_str("| Fixture | Family | Cases | SHA-256 |\n");
            out.push_str("|---------|--------|-------|---------|\n");
            for s in &self.sources {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | `{}` |",
                    s.path, s.family, s.cases, s.sha256
                );
            }
            out.push('\n');
        }

        out.push_str("| Case | Section | Status |\n");
        out.push_str("|------|---------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                escape_cell(&r.case_name),
                escape_cell(&r.section),
                status
            );
        }

        let failures: Vec<_> = self.summary.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                let _ = writeln!(out, "\n### {}\n", r.case_name);
                let _ = writeln!(out, "```\n{}\n```", r.diff.as_deref().unwrap_or(""));
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
