//! CLI entrypoint for the boundfmt conformance harness.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use boundfmt_core::{RenderError, SliceCursor, try_render};
use boundfmt_harness::fixtures::{FixtureArg, engine_args, load_fixtures};
use boundfmt_harness::report::{ConformanceReport, FixtureSource};
use boundfmt_harness::runner::{TestRunner, parse_modes};
use boundfmt_harness::structured_log::{LogEmitter, LogLevel, Outcome, now_utc};
use boundfmt_harness::verify::VerificationSummary;
use clap::{Parser, Subcommand};

/// Conformance tooling for boundfmt.
#[derive(Debug, Parser)]
#[command(name = "boundfmt-harness")]
#[command(about = "Conformance testing harness for boundfmt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the engine against fixture files.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Render mode to verify (`compat`, `strict`, or `both`).
        #[arg(long, default_value = "both")]
        mode: String,
    },
    /// Render one template and print the result.
    Render {
        #[arg(long)]
        template: String,
        /// Buffer size including the terminator slot.
        #[arg(long, default_value_t = 256)]
        capacity: usize,
        /// Argument: i:<n>, u:<n>, f:<x>, s:<text>, p:<n>, n:<label> or null.
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Render mode (`compat` or `strict`).
        #[arg(long, default_value = "compat")]
        mode: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
            mode,
        } => verify(&fixture, report.as_deref(), log.as_deref(), &mode),
        Command::Render {
            template,
            capacity,
            args,
            mode,
        } => render(&template, capacity, &args, &mode),
    }
}

fn verify(
    fixture: &Path,
    report: Option<&Path>,
    log: Option<&Path>,
    mode: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let modes = parse_modes(mode)?;
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let loaded = load_fixtures(fixture)?;

    let run_id = format!(
        "run-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    );
    let mut logger = match log {
        Some(path) => Some(LogEmitter::to_file(path, "conformance", &run_id)?),
        None => None,
    };
    if let Some(logger) = logger.as_mut() {
        let entry = logger
            .entry(LogLevel::Info, "verify_start")
            .with_details(serde_json::json!({
                "fixtures": loaded.iter().map(|f| f.path.display().to_string()).collect::<Vec<_>>(),
                "modes": modes.iter().map(|m| m.as_str()).collect::<Vec<_>>(),
            }));
        logger.emit_entry(entry)?;
    }

    let started = Instant::now();
    let mut results = Vec::new();
    for &active in &modes {
        let runner = TestRunner::new("fixture-verify", active);
        for fixture_file in &loaded {
            for result in runner.run(&fixture_file.set) {
                if let Some(logger) = logger.as_mut() {
                    let level = if result.passed {
                        LogLevel::Info
                    } else {
                        LogLevel::Error
                    };
                    let mut details = serde_json::json!({ "campaign": result.campaign });
                    if let Some(diff) = &result.diff {
                        details["diff"] = serde_json::json!(diff);
                    }
                    let entry = logger
                        .entry(level, "case_result")
                        .with_mode(active.as_str())
                        .with_case(&result.case_name, &result.section)
                        .with_outcome(Outcome::from_passed(result.passed))
                        .with_details(details);
                    logger.emit_entry(entry)?;
                }
                results.push(result);
            }
        }
    }

    let summary = VerificationSummary::from_results(results);
    let report_doc = ConformanceReport {
        title: String::from("boundfmt Conformance Report"),
        mode: modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("+"),
        timestamp: now_utc(),
        sources: loaded
            .iter()
            .map(|f| FixtureSource {
                path: f.path.display().to_string(),
                family: f.set.family.clone(),
                sha256: f.sha256.clone(),
                cases: f.set.cases.len(),
            })
            .collect(),
        summary,
    };

    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );
    for failure in report_doc.summary.failures() {
        eprintln!(
            "FAIL {}\n{}",
            failure.case_name,
            failure.diff.as_deref().unwrap_or("")
        );
    }

    if let Some(logger) = logger.as_mut() {
        let level = if report_doc.summary.all_passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let entry = logger
            .entry(level, "verify_summary")
            .with_outcome(Outcome::from_passed(report_doc.summary.all_passed()))
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_details(serde_json::json!({
                "total": report_doc.summary.total,
                "passed": report_doc.summary.passed,
                "failed": report_doc.summary.failed,
            }));
        logger.emit_entry(entry)?;
        logger.flush()?;
    }

    if let Some(report_path) = report {
        eprintln!("Writing report to {}", report_path.display());
        std::fs::write(report_path, report_doc.to_markdown())?;
        std::fs::write(report_path.with_extension("json"), report_doc.to_json())?;
    }

    if !report_doc.summary.all_passed() {
        return Err("Conformance verification failed".into());
    }
    Ok(())
}

fn render(
    template: &str,
    capacity: usize,
    arg_specs: &[String],
    mode: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = match parse_modes(mode)?.as_slice() {
        [single] => *single,
        _ => return Err("render takes a single mode (compat or strict)".into()),
    };
    let fixture_args = arg_specs
        .iter()
        .map(|spec| FixtureArg::parse_cli(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let labels: Vec<&str> = fixture_args
        .iter()
        .filter_map(FixtureArg::count_label)
        .collect();
    let cells = vec![Cell::new(-1); labels.len()];
    let args = engine_args(&fixture_args, &cells);

    let mut buf = vec![0u8; capacity];
    let result = try_render(
        &mut buf,
        template.as_bytes(),
        &mut SliceCursor::new(&args),
        mode,
    );
    let (ret, written) = match result {
        Ok(n) => (i64::try_from(n).unwrap_or(i64::MAX), n),
        Err(RenderError::BufferTooSmall) => (-1, 0),
        Err(err) => {
            eprintln!("error: {err}");
            (-1, buf.iter().position(|&b| b == 0).unwrap_or(0))
        }
    };

    println!("{}", String::from_utf8_lossy(&buf[..written]));
    eprintln!("ret={ret}");
    for (label, cell) in labels.iter().zip(&cells) {
        eprintln!("{label}={}", cell.get());
    }
    Ok(())
}
