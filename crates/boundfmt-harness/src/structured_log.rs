//! Structured JSONL logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required and optional fields.
//! - [`LogEmitter`]: writes entries to a file or an arbitrary writer.
//! - [`validate_log_line`] / [`validate_log_file`]: schema checks.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

impl Outcome {
    #[must_use]
    pub fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    /// Render mode the event belongs to (`compat` or `strict`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            mode: None,
            case: None,
            section: None,
            outcome: None,
            duration_ms: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Set the fixture case name and its section reference.
    #[must_use]
    pub fn with_case(mut self, case: impl Into<String>, section: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes JSONL log entries, numbering trace ids `<scope>::<run_id>::<seq>`.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    seq: u64,
    scope: String,
    run_id: String,
}

impl LogEmitter {
    /// Create an emitter over any writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, scope: &str, run_id: &str) -> Self {
        Self {
            writer,
            seq: 0,
            scope: scope.to_string(),
            run_id: run_id.to_string(),
        }
    }

    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, scope: &str, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(
            Box::new(std::io::BufWriter::new(file)),
            scope,
            run_id,
        ))
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.scope, self.run_id, self.seq)
    }

    /// Start an entry with the next trace id; fill it in and pass it to
    /// [`emit_entry`](Self::emit_entry).
    pub fn entry(&mut self, level: LogLevel, event: &str) -> LogEntry {
        let trace_id = self.next_trace_id();
        LogEntry::new(trace_id, level, event)
    }

    /// Emit a bare entry with an auto-generated trace id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let entry = self.entry(level, event);
        self.write_line(&entry)?;
        Ok(entry)
    }

    /// Emit a fully-populated log entry.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        self.write_line(&entry)
    }

    fn write_line(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry.to_jsonl().map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

fn check_enum(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
    allowed: &[&str],
    line_number: usize,
    errors: &mut Vec<LogValidationError>,
) {
    if let Some(value) = obj.get(field).and_then(|v| v.as_str())
        && !allowed.contains(&value)
    {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message: format!("invalid {field}: '{value}'"),
        });
    }
}

/// Validate a single JSONL line and return the parsed entry.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            errors.push(LogValidationError {
                line_number,
                field: "<json>".to_string(),
                message: format!("invalid JSON: {e}"),
            });
            return Err(errors);
        }
    };

    let Some(obj) = value.as_object() else {
        errors.push(LogValidationError {
            line_number,
            field: "<root>".to_string(),
            message: "expected JSON object".to_string(),
        });
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(LogValidationError {
                line_number,
                field: field.to_string(),
                message: "required field missing".to_string(),
            });
        }
    }

    check_enum(
        obj,
        "level",
        &["trace", "debug", "info", "warn", "error"],
        line_number,
        &mut errors,
    );
    check_enum(obj, "mode", &["compat", "strict"], line_number, &mut errors);
    check_enum(
        obj,
        "outcome",
        &["pass", "fail", "skip", "error"],
        line_number,
        &mut errors,
    );

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && trace_id.split("::").count() != 3
    {
        errors.push(LogValidationError {
            line_number,
            field: "trace_id".to_string(),
            message: format!(
                "trace_id should follow <scope>::<run_id>::<seq> format, got: '{trace_id}'"
            ),
        });
    }

    if obj.contains_key("outcome") && !obj.contains_key("case") && !obj.contains_key("details") {
        errors.push(LogValidationError {
            line_number,
            field: "case".to_string(),
            message: "outcome events must name a case or carry details".to_string(),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError {
            line_number,
            field: "<deserialization>".to_string(),
            message: format!("failed to deserialize: {e}"),
        }]
    })
}

/// Validate an entire JSONL file.
///
/// Returns the non-blank line count and any validation errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let (year, month, day) = civil_from_days(secs / 86_400);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    // Shift the epoch to 0000-03-01 so leap days end each 400-year era.
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
