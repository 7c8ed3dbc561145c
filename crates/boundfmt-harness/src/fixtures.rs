//! Fixture loading and management.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use boundfmt_core::Arg;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HarnessError;

/// One argument of a fixture case, externally tagged in JSON
/// (`{"int": -5}`, `{"str": "Hello"}`, `"null_str"`, `{"count": "first"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Double(f64),
    /// Raw IEEE-754 bits, for NaN and the infinities JSON cannot spell.
    DoubleBits(u64),
    Str(String),
    NullStr,
    Ptr(u64),
    /// A `%n` target; the label keys `expected_counts`.
    Count(String),
}

impl FixtureArg {
    /// Parse the CLI shorthand: `i:-5`, `u:7`, `f:2.5`, `s:text`, `p:4096`,
    /// `n:label` or `null`.
    pub fn parse_cli(spec: &str) -> Result<Self, HarnessError> {
        if spec == "null" {
            return Ok(Self::NullStr);
        }
        let bad = || HarnessError::ArgSpec(spec.to_string());
        let (tag, value) = spec.split_once(':').ok_or_else(bad)?;
        match tag {
            "i" => value.parse().map(Self::Int).map_err(|_| bad()),
            "u" => value.parse().map(Self::Uint).map_err(|_| bad()),
            "f" => value.parse().map(Self::Double).map_err(|_| bad()),
            "s" => Ok(Self::Str(value.to_string())),
            "p" => parse_address(value).map(Self::Ptr).ok_or_else(bad),
            "n" if !value.is_empty() => Ok(Self::Count(value.to_string())),
            _ => Err(bad()),
        }
    }

    /// Label of a `%n` target, if this is one.
    #[must_use]
    pub fn count_label(&self) -> Option<&str> {
        match self {
            Self::Count(label) => Some(label),
            _ => None,
        }
    }
}

fn parse_address(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Build engine arguments for `args`, handing the `%n` targets their cells
/// in order. `cells` must hold one entry per [`FixtureArg::Count`].
#[must_use]
pub fn engine_args<'a>(args: &'a [FixtureArg], cells: &'a [Cell<i32>]) -> Vec<Arg<'a>> {
    let mut targets = cells.iter();
    args.iter()
        .map(|arg| match arg {
            FixtureArg::Int(v) => Arg::Int(*v),
            FixtureArg::Uint(v) => Arg::Uint(*v),
            FixtureArg::Double(v) => Arg::Double(*v),
            FixtureArg::DoubleBits(bits) => Arg::Double(f64::from_bits(*bits)),
            FixtureArg::Str(s) => Arg::Str(s.as_bytes()),
            FixtureArg::NullStr => Arg::Null,
            FixtureArg::Ptr(addr) => Arg::Ptr(usize::try_from(*addr).unwrap_or(usize::MAX)),
            FixtureArg::Count(_) => targets.next().map_or(Arg::Null, Arg::Count),
        })
        .collect()
}

fn default_mode() -> String {
    String::from("both")
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Reference to the behaviour under test (C11 clause or contract name).
    pub section: String,
    pub template: String,
    /// Total buffer size including the terminator slot.
    pub capacity: usize,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    pub expected_output: String,
    pub expected_return: i32,
    /// Final value of each labelled `%n` target. Targets start at `-1`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expected_counts: BTreeMap<String, i32>,
    /// `compat`, `strict` or `both`.
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl FixtureCase {
    /// Check the case is self-consistent before running it.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let fail = |message: String| HarnessError::Fixture {
            case: self.name.clone(),
            message,
        };
        if !matches!(self.mode.as_str(), "compat" | "strict" | "both") {
            return Err(fail(format!("unknown mode '{}'", self.mode)));
        }
        for label in self.expected_counts.keys() {
            if !self.args.iter().any(|a| a.count_label() == Some(label)) {
                return Err(fail(format!("expected count '{label}' has no count argument")));
            }
        }
        if self.expected_return >= 0 && self.expected_output.len() != self.expected_return as usize
        {
            return Err(fail(format!(
                "expected_return {} disagrees with expected_output length {}",
                self.expected_return,
                self.expected_output.len()
            )));
        }
        Ok(())
    }
}

/// A collection of fixture cases for one behaviour family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        Ok(LoadedFixture::from_file(path)?.set)
    }

    /// Validate every case.
    pub fn validate(&self) -> Result<(), HarnessError> {
        self.cases.iter().try_for_each(FixtureCase::validate)
    }
}

/// A fixture set together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedFixture {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
    pub set: FixtureSet,
}

impl LoadedFixture {
    /// Read, hash, parse and validate one fixture file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        let set = FixtureSet::from_json(&content).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        set.validate()?;
        Ok(Self {
            path: path.to_path_buf(),
            sha256: sha256_hex(content.as_bytes()),
            set,
        })
    }
}

/// Load `path` if it is a file, or every `*.json` directly inside it
/// (sorted by name) if it is a directory.
pub fn load_fixtures(path: &Path) -> Result<Vec<LoadedFixture>, HarnessError> {
    if !path.is_dir() {
        return Ok(vec![LoadedFixture::from_file(path)?]);
    }
    let entries = std::fs::read_dir(path).map_err(|e| HarnessError::io(path, e))?;
    let mut fixture_paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    fixture_paths.sort();
    if fixture_paths.is_empty() {
        return Err(HarnessError::NoFixtures(path.to_path_buf()));
    }
    fixture_paths
        .iter()
        .map(|p| LoadedFixture::from_file(p))
        .collect()
}

#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
