// fixture_suite_test.rs
// Drives the engine over the checked-in conformance fixtures, in-process and
// through the harness binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use boundfmt_core::RenderMode;
use boundfmt_harness::structured_log::validate_log_file;
use boundfmt_harness::{LoadedFixture, TestRunner, VerificationSummary, load_fixtures};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_path() -> PathBuf {
    workspace_root().join("tests/conformance/fixtures/printf_core.v1.json")
}

fn load() -> LoadedFixture {
    LoadedFixture::from_file(&fixture_path())
        .unwrap_or_else(|e| panic!("failed to load {}: {e}", fixture_path().display()))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("boundfmt-harness-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn fixture_file_is_well_formed() {
    let loaded = load();
    assert_eq!(loaded.set.version, "v1");
    assert_eq!(loaded.set.family, "printf/core");
    assert!(loaded.set.cases.len() >= 50, "fixture set shrank");
    assert_eq!(loaded.sha256.len(), 64);

    let mut names: Vec<&str> = loaded.set.cases.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(names.len(), before, "duplicate case names");
}

#[test]
fn every_case_passes_in_both_modes() {
    let loaded = load();
    for mode in [RenderMode::Compat, RenderMode::Strict] {
        let results = TestRunner::new("fixture-suite", mode).run(&loaded.set);
        assert!(!results.is_empty());
        let summary = VerificationSummary::from_results(results);
        let report: Vec<String> = summary
            .failures()
            .map(|r| format!("{}\n{}", r.case_name, r.diff.as_deref().unwrap_or("")))
            .collect();
        assert!(summary.all_passed(), "{mode:?} failures:\n{}", report.join("\n\n"));
    }
}

#[test]
fn mode_specific_cases_only_run_in_their_mode() {
    let loaded = load();
    let compat = TestRunner::new("filter", RenderMode::Compat).run(&loaded.set);
    let strict = TestRunner::new("filter", RenderMode::Strict).run(&loaded.set);
    assert!(compat.iter().any(|r| r.case_name == "unknown_skipped"));
    assert!(!strict.iter().any(|r| r.case_name == "unknown_skipped"));
    assert!(strict.iter().any(|r| r.case_name == "unknown_rejected"));
    assert!(!compat.iter().any(|r| r.case_name == "unknown_rejected"));
}

#[test]
fn directory_loading_finds_the_fixture() {
    let dir = fixture_path().parent().unwrap().to_path_buf();
    let loaded = load_fixtures(&dir).expect("fixture directory loads");
    assert!(loaded.iter().any(|f| f.set.family == "printf/core"));
}

#[test]
fn harness_verify_writes_report_and_valid_log() {
    let dir = scratch_dir("verify");
    let report = dir.join("report.md");
    let log = dir.join("verify.jsonl");

    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .arg("verify")
        .arg("--fixture")
        .arg(fixture_path())
        .arg("--report")
        .arg(&report)
        .arg("--log")
        .arg(&log)
        .output()
        .expect("failed to execute harness");
    assert!(
        output.status.success(),
        "harness verify failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let md = std::fs::read_to_string(&report).unwrap();
    assert!(md.contains("- Mode: compat+strict"));
    assert!(md.contains("- Failed: 0"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report.with_extension("json")).unwrap())
            .unwrap();
    assert_eq!(json["summary"]["failed"], 0);
    assert_eq!(
        json["sources"][0]["sha256"].as_str(),
        Some(load().sha256.as_str())
    );

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert!(errors.is_empty(), "log errors: {errors:?}");
    // Start and summary entries around one entry per executed case.
    let executed = json["summary"]["total"].as_u64().unwrap() as usize;
    assert_eq!(lines, executed + 2);
    let log_text = std::fs::read_to_string(&log).unwrap();
    let case_line = log_text
        .lines()
        .find(|l| l.contains("\"case_result\""))
        .expect("a case_result entry");
    let entry: serde_json::Value = serde_json::from_str(case_line).unwrap();
    assert_eq!(entry["details"]["campaign"], "fixture-verify");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn harness_render_prints_output_and_return() {
    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .args([
            "render",
            "--template",
            "%s=%05.1f%n",
            "--capacity",
            "32",
            "--arg",
            "s:pi",
            "--arg",
            "f:3.14159",
            "--arg",
            "n:end",
        ])
        .output()
        .expect("failed to execute harness");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "pi=003.1\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ret=8"), "{stderr}");
    assert!(stderr.contains("end=8"), "{stderr}");
}

#[test]
fn harness_render_rejects_bad_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .args(["render", "--template", "%d", "--arg", "q:1"])
        .output()
        .expect("failed to execute harness");
    assert!(!output.status.success());
}
