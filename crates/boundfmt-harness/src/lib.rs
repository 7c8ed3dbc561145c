//! Conformance harness for boundfmt.
//!
//! This crate provides:
//! - Fixtures: JSON cases pairing a template, arguments and a buffer size
//!   with the exact output, return value and `%n` counts expected
//! - Runner: renders each case into a guarded buffer and checks the
//!   buffer contract alongside the expected values
//! - Report generation: human-readable + machine-readable conformance reports
//! - Structured JSONL logs for verification runs

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureArg, FixtureCase, FixtureSet, LoadedFixture, load_fixtures};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
