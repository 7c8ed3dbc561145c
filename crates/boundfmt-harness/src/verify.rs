//! Output comparison and verification.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Case name, suffixed with the mode for `both` fixtures.
    pub case_name: String,
    /// Campaign of the runner that produced this result.
    #[serde(default)]
    pub campaign: String,
    pub section: String,
    /// `compat` or `strict`.
    pub mode: String,
    pub passed: bool,
    pub expected: String,
    /// Bytes the engine left in front of the terminator.
    pub actual: String,
    pub expected_return: i32,
    pub actual_return: i32,
    /// Diff and notes if the case failed.
    pub diff: Option<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Results that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
