//! CLI integration tests.
//!
//! Tests the command-line interface by running the binary as a subprocess.
#![cfg(feature = "biblatex")]

mod common;

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use common::{create_temp_file, misc_entry, settings_toml, SAMPLE_BIB};
use serde_json::Value;

/// Path to the compiled binary
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bibtex-publications"))
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

// ============================================
// Tests for CLI argument parsing
// ============================================

#[test]
fn test_cli_help() {
    // Given: The CLI binary
    let output = run(&["--help"]);

    // Then: Help is displayed with expected content
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("bibtex-publications") || stdout.contains("BibTeX"),
        "Help should mention the tool name or purpose: {}",
        stdout
    );
    assert!(output.status.success(), "Help should exit with success");
}

#[test]
fn test_cli_build_help() {
    let output = run(&["build", "--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--settings"), "got: {}", stdout);
    assert!(stdout.contains("--skip-invalid-index"), "got: {}", stdout);
    assert!(output.status.success());
}

#[test]
fn test_cli_styles() {
    let output = run(&["styles"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "plain");
    assert!(output.status.success());
}

// ============================================
// Tests for the build command
// ============================================

#[test]
fn test_cli_build_from_settings() {
    // Given: a settings file pointing at a bibliography
    let bib = create_temp_file(SAMPLE_BIB, ".bib");
    let settings = create_temp_file(&settings_toml(bib.path()), ".toml");

    // When: we build
    let output = run(&["build", "--settings", settings.path().to_str().unwrap()]);

    // Then: the context holds the sorted publications
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let context = stdout_json(&output);
    let keys: Vec<&str> = context["publications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["roe2018", "lee2021", "smith2019"]);
}

#[test]
fn test_cli_build_src_overrides_settings() {
    let bib = create_temp_file(&misc_entry("override", "1"), ".bib");
    let settings = create_temp_file("PUBLICATIONS_SRC = \"/nonexistent/other.bib\"\n", ".toml");

    let output = run(&[
        "build",
        "--settings",
        settings.path().to_str().unwrap(),
        "--src",
        bib.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["publications"][0]["key"], "override");
}

#[test]
fn test_cli_build_without_source() {
    // Given: no settings and no --src
    let output = run(&["build"]);

    // Then: an empty context, successful exit
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::json!({}));
}

#[test]
fn test_cli_build_missing_bib_warns() {
    // Given: a source that does not exist
    let output = run(&["build", "--src", "/nonexistent/refs.bib"]);

    // Then: the build succeeds without publications and warns on stderr
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), serde_json::json!({}));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to parse bibliography file"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_cli_build_quiet_hides_warning() {
    let output = run(&["build", "-q", "--src", "/nonexistent/refs.bib"]);

    assert!(output.status.success());
    assert!(output.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_cli_build_logs_in_build_span() {
    let bib = create_temp_file(&misc_entry("one", "1"), ".bib");
    let src = bib.path().to_str().unwrap();

    let output = run(&["build", "-v", "--src", src]);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("collected publications"), "stderr: {}", stderr);
    assert!(
        stderr.contains(&format!("build{{src={:?}}}", src)),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_cli_build_output_file() {
    let bib = create_temp_file(&misc_entry("out", "1"), ".bib");
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("context.json");

    let output = run(&[
        "build",
        "--src",
        bib.path().to_str().unwrap(),
        "-o",
        out_path.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written: Value = serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["publications"][0]["key"], "out");
}

#[test]
fn test_cli_build_skip_invalid_index() {
    let bib = create_temp_file(
        &format!("{}{}", misc_entry("ok", "1"), misc_entry("bad", "x")),
        ".bib",
    );

    let output = run(&[
        "build",
        "--src",
        bib.path().to_str().unwrap(),
        "--skip-invalid-index",
    ]);

    assert!(output.status.success());
    let publications = stdout_json(&output)["publications"].clone();
    assert_eq!(publications.as_array().unwrap().len(), 1);
    assert_eq!(publications[0]["key"], "ok");
}

// ============================================
// Tests for exit codes
// ============================================

#[test]
fn test_exit_code_10_settings_not_found() {
    let output = run(&["build", "--settings", "/nonexistent/site.toml"]);

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("site.toml"), "stderr: {}", stderr);
}

#[test]
fn test_exit_code_10_unknown_style() {
    let output = run(&["build", "--style", "fancy"]);

    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fancy"), "stderr: {}", stderr);
    assert!(stderr.contains("plain"), "stderr: {}", stderr);
}

#[test]
fn test_exit_code_11_missing_index() {
    // Given: an entry without an index
    let bib = create_temp_file("@misc{noindex,\n    title = {No index}\n}\n", ".bib");

    // When: we build
    let output = run(&["build", "--src", bib.path().to_str().unwrap()]);

    // Then: the build fails naming the entry, nothing on stdout
    assert_eq!(output.status.code(), Some(11));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("noindex"), "stderr: {}", stderr);
}

#[test]
fn test_exit_code_15_output_dir_not_writable() {
    let bib = create_temp_file(&misc_entry("one", "1"), ".bib");

    let output = run(&[
        "build",
        "--src",
        bib.path().to_str().unwrap(),
        "-o",
        "/nonexistent/dir/context.json",
    ]);

    assert_eq!(output.status.code(), Some(15));
}
