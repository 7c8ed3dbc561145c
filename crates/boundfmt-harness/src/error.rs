//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading fixtures or driving the CLI.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A fixture parsed but its contents are unusable.
    #[error("fixture case '{case}': {message}")]
    Fixture { case: String, message: String },
    #[error("no fixture JSON files found in {}", .0.display())]
    NoFixtures(PathBuf),
    #[error("invalid argument '{0}', expected one of i:<n> u:<n> f:<x> s:<text> p:<n> n:<label> null")]
    ArgSpec(String),
    #[error("unknown mode '{0}', expected compat|strict|both")]
    Mode(String),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
