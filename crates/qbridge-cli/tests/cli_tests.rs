//! End-to-end tests that run the `qbridge` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BELL_QASM2: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n";

/// Run the binary with an isolated config directory.
fn qbridge(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qbridge"))
        .args(args)
        .env_remove("QBRIDGE_CONFIG")
        .env_remove("QBRIDGE_MAX_PATH_ATTEMPTS")
        .env_remove("QBRIDGE_MAX_PATH_DEPTH")
        .env("XDG_CONFIG_HOME", config_home)
        .output()
        .expect("failed to run qbridge")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let out = qbridge(dir.path(), &["version"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("qbridge-transpiler"));
}

#[test]
fn test_transpile_qasm2_to_ionq() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bell.qasm");
    fs::write(&input, BELL_QASM2).unwrap();

    let out = qbridge(dir.path(), &["transpile", input.to_str().unwrap(), "-t", "ionq"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["qubits"], 2);
    assert_eq!(json["circuit"][0]["gate"], "h");
    assert_eq!(json["circuit"][1]["gate"], "cnot");
}

#[test]
fn test_transpile_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bell.qasm");
    let output = dir.path().join("bell3.qasm");
    fs::write(&input, BELL_QASM2).unwrap();

    let out = qbridge(
        dir.path(),
        &[
            "transpile",
            input.to_str().unwrap(),
            "-t",
            "qasm3",
            "-o",
            output.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(fs::read_to_string(&output).unwrap().starts_with("OPENQASM 3.0;"));
}

#[test]
fn test_config_depth_limit() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bell.qasm");
    let config = dir.path().join("qbridge.yaml");
    fs::write(&input, BELL_QASM2).unwrap();
    fs::write(&config, "scheme:\n  max_path_depth: 1\n").unwrap();

    let out = qbridge(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "transpile",
            input.to_str().unwrap(),
            "-t",
            "ionq",
        ],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Error:"));
}

#[test]
fn test_rebase_outside_basis_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("crx.qasm");
    fs::write(&input, "OPENQASM 3.0;\nqubit[2] q;\ncrx(0.5) q[0], q[1];\n").unwrap();

    let strict = qbridge(dir.path(), &["rebase", input.to_str().unwrap(), "-b", "h"]);
    assert!(!strict.status.success());

    let lenient = qbridge(
        dir.path(),
        &["rebase", input.to_str().unwrap(), "-b", "h", "--no-verify"],
    );
    assert!(lenient.status.success());
    assert!(stdout(&lenient).contains("crx(0.5)"));
}

#[test]
fn test_compat_rename_to_vendor() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bell.qasm");
    let output = dir.path().join("vendor.qasm");
    fs::write(&input, BELL_QASM2).unwrap();

    let out = qbridge(
        dir.path(),
        &[
            "compat",
            input.to_str().unwrap(),
            "--rename",
            "vendor",
            "-o",
            output.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("cnot q[0], q[1];"));
    assert!(!text.contains("cx q[0]"));
}

#[test]
fn test_path_listing() {
    let dir = tempfile::tempdir().unwrap();
    let out = qbridge(dir.path(), &["path", "qasm2", "ionq"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("qasm2 -> qasm3 -> ionq"));

    let missing = qbridge(dir.path(), &["path", "ionq", "qasm2"]);
    assert!(!missing.status.success());
}

#[test]
fn test_graph_experiment_types() {
    let dir = tempfile::tempdir().unwrap();
    let out = qbridge(dir.path(), &["graph", "--format", "types"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("gate_model"));

    let dot = qbridge(dir.path(), &["graph"]);
    assert!(stdout(&dot).starts_with("digraph"));
}

#[test]
fn test_conversions_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = qbridge(dir.path(), &["conversions", "--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().any(|e| e["function"] == "qasm3_to_ionq"));
}
