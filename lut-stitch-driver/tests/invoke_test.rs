// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};
use test_case::test_case;

const TWO_LUTS: &str = r#"{
  "top": "top",
  "modules": {
    "top": {
      "cells": {
        "buf": {
          "type": "GTP_LUT1",
          "parameters": { "INIT": "10" },
          "connections": { "I0": "x", "Z": "bx" }
        },
        "inv": {
          "type": "GTP_LUT1",
          "parameters": { "INIT": "01" },
          "connections": { "I0": "y", "Z": "ny" }
        }
      }
    }
  }
}"#;

fn run_driver(args: &[&str], cwd: &Path) -> Output {
    let command_path = env!("CARGO_BIN_EXE_lut-stitch-driver");
    Command::new(command_path)
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run lut-stitch-driver")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn stitch_writes_fused_design_and_verifies() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("in.json");
    let output_path = temp_dir.path().join("out.json");
    let dump = temp_dir.path().join("luts.txt");
    std::fs::write(&input, TWO_LUTS).unwrap();

    let output = run_driver(
        &[
            "stitch",
            input.to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
            "--dump",
            dump.to_str().unwrap(),
            "--verify",
        ],
        temp_dir.path(),
    );
    assert_success(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("merged pairs:     1"), "stderr: {}", stderr);
    assert!(stderr.contains("equivalence: 2 signals match"), "stderr: {}", stderr);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let cells = written["modules"]["top"]["cells"].as_object().unwrap();
    assert_eq!(cells.len(), 1);
    let fused = &cells["buf_inv_merged"];
    assert_eq!(fused["type"], "GTP_LUT6D");
    assert_eq!(fused["connections"]["Z5"], "bx");
    assert_eq!(fused["connections"]["Z"], "ny");
    assert_eq!(fused["connections"]["I5"], "1'b1");

    let report = std::fs::read_to_string(&dump).unwrap();
    assert!(report.starts_with("--- Dump of all collected LUTs (2 total) ---"));
}

#[test]
fn stitch_to_stdout() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("in.json");
    std::fs::write(&input, TWO_LUTS).unwrap();
    let output = run_driver(&["stitch", input.to_str().unwrap()], temp_dir.path());
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"buf_inv_merged\""), "stdout: {}", stdout);
}

#[test]
fn missing_top_module_is_fatal() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("in.json");
    std::fs::write(&input, r#"{"modules": {"a": {}, "b": {}}}"#).unwrap();
    let output = run_driver(&["stitch", input.to_str().unwrap()], temp_dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no top module found"), "stderr: {}", stderr);
}

#[test]
fn dump_luts_to_stdout() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("in.json");
    std::fs::write(&input, TWO_LUTS).unwrap();
    let output = run_driver(&["dump-luts", input.to_str().unwrap()], temp_dir.path());
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("  - Cell: buf (Type: GTP_LUT1, Size: 1)"));
    assert!(stdout.contains("      .I0: y"));
    assert!(stdout.ends_with("--- End of LUT dump ---\n"));
}

#[test_case("b0010", "AB", "BA", "shuffled (BA): b0100"; "swap two inputs")]
#[test_case("hD9", "ABC", "ABC", "shuffled (ABC): hd9"; "identity keeps the table")]
fn tt_shuffle_prints_result(table: &str, from: &str, to: &str, want_line: &str) {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = run_driver(
        &["tt-shuffle", "--from", from, "--table", table, "--to", to],
        temp_dir.path(),
    );
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == want_line), "stdout: {}", stdout);
}

#[test]
fn config_file_in_working_directory_is_used() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("in.json");
    std::fs::write(&input, TWO_LUTS).unwrap();
    std::fs::write(
        temp_dir.path().join("lut-stitch.toml"),
        "[stitch]\nfused_cell_type = \"LUT6_2\"\nfused_low_output_port = \"O5\"\n",
    )
    .unwrap();
    let output = run_driver(&["stitch", input.to_str().unwrap()], temp_dir.path());
    assert_success(&output);
    let written: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fused = &written["modules"]["top"]["cells"]["buf_inv_merged"];
    assert_eq!(fused["type"], "LUT6_2");
    assert_eq!(fused["connections"]["O5"], "bx");
}

#[test]
fn bad_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("bad.toml");
    std::fs::write(&config, "[stitch]\nno_such_knob = 1\n").unwrap();
    let output = run_driver(
        &["--config", config.to_str().unwrap(), "tt-shuffle", "--from", "A", "--table", "b10", "--to", "A"],
        temp_dir.path(),
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("in config file"), "stderr: {}", stderr);
    assert!(stderr.contains("  caused by: "), "stderr: {}", stderr);
    assert!(stderr.contains("no_such_knob"), "stderr: {}", stderr);
}
