use std::fs;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::Value;

const SNAPSHOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/snapshot");

fn publish() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ygocatalog-publish"));
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("YGOCATALOG_") {
            cmd.env_remove(&key);
        }
    }
    cmd
}

#[test]
fn cli_publishes_snapshot_to_directory() {
    let out = tempfile::tempdir().unwrap();
    let manifest = out.path().join("manifest.jsonl");
    let output = publish()
        .args(["--snapshot-dir", SNAPSHOT, "--store", "fs", "--output-dir"])
        .arg(out.path().join("catalog"))
        .args(["--max-chunk-bytes", "4000", "--log-level", "warn", "--manifest"])
        .arg(&manifest)
        .output()
        .expect("run CLI");

    assert!(
        output.status.success(),
        "cli exited with {}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Published 4 cards (4 translated)"));

    let metadata: Value =
        serde_json::from_slice(&fs::read(out.path().join("catalog/metadata.json")).unwrap()).unwrap();
    let chunks = metadata["totalChunks"].as_u64().unwrap() as usize;
    assert!(chunks >= 2);

    let lines = fs::read_to_string(&manifest).unwrap();
    let keys: Vec<String> = lines
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["key"].as_str().unwrap().to_string())
        .collect();
    let expected: Vec<String> = (1..=chunks).map(|n| format!("chunk_{n:03}")).collect();
    assert_eq!(keys, expected);
    for key in &keys {
        assert!(out.path().join("catalog/chunks").join(format!("{key}.json")).exists());
    }
}

#[test]
fn cli_dry_run_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let output = publish()
        .args(["--snapshot-dir", SNAPSHOT, "--dry-run", "--output-dir"])
        .arg(out.path().join("catalog"))
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Dry run: 4 cards"));
    assert!(!out.path().join("catalog").exists());
}

#[test]
fn cli_fails_on_missing_snapshot() {
    let out = tempfile::tempdir().unwrap();
    let output = publish()
        .arg("--snapshot-dir")
        .arg(out.path().join("missing"))
        .arg("--output-dir")
        .arg(out.path().join("catalog"))
        .output()
        .expect("run CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cardinfo.json"));
    assert!(!out.path().join("catalog/metadata.json").exists());
}

#[test]
fn cli_rejects_base_language_as_translation() {
    let output = publish()
        .args(["--snapshot-dir", SNAPSHOT, "--translated", "it,en", "--store", "memory"])
        .output()
        .expect("run CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("base language"));
}
