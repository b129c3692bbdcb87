#![forbid(unsafe_code)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::Path, process::Command};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn benchcmp() -> Command {
    let mut cmd = Command::cargo_bin("benchcmp").unwrap();
    cmd.env_remove("BENCHCMP_CONFIG")
        .env_remove("BENCHCMP_LOG_LEVEL")
        .env_remove("BENCHCMP_CONCURRENT")
        .env_remove("BENCHCMP_TICKS_PER_SECOND")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_shows_name() {
    benchcmp().arg("--help").assert().success().stdout(predicate::str::contains("benchcmp"));
}

#[test]
fn writes_comparison_document() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("output");
    write(&input, "fulltest_a/benchmark/summary.json", r#"{"model":"qwen","avg_ttft_ms":100,"token_throughput":40,"rps":2,"success_rate":1}"#);
    write(&input, "fulltest_b/benchmark/summary.json", r#"{"model":"llama","avg_ttft_ms":200,"token_throughput":20,"rps":1,"success_rate":0.5}"#);
    write(&input, "other/benchmark/summary.json", r#"{"model":"x"}"#);
    let out = dir.path().join("reports/cmp.json");

    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(&out)
        .args(["--pattern", "fulltest_"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fulltest_a"))
        .stdout(predicate::str::contains("llama"));

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let records = doc["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "fulltest_a");
    assert_eq!(doc["scores"][0]["throughput"], 100.0);
    assert_eq!(doc["scores"][1]["success_rate"], 50.0);
    assert!(doc["style"]["palette"].as_array().is_some());
}

#[test]
fn lists_discovered_candidates_before_parsing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("output");
    write(&input, "fulltest_b/benchmark/summary.json", r#"{"model":"llama"}"#);
    write(&input, "fulltest_a/benchmark/summary.json", "{broken");
    write(&input, "notes/readme.md", "not a run");

    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(dir.path().join("cmp.json"))
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 benchmark results:\n   - fulltest_a\n   - fulltest_b\n"))
        .stdout(predicate::str::contains("skipped fulltest_a"));
}

#[test]
fn prints_category_score_table() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("output");
    write(&input, "fast/benchmark/summary.json", r#"{"avg_latency_ms":100,"token_throughput":50}"#);
    write(&input, "slow/benchmark/summary.json", r#"{"avg_latency_ms":400,"token_throughput":25}"#);

    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(dir.path().join("cmp.json"))
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("responsiveness"))
        .stdout(predicate::str::contains("generation_speed"))
        .stdout(predicate::str::contains("summarization_rate"))
        .stdout(predicate::str::contains("75.0"));
}

#[test]
fn rust_log_overrides_configured_level() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("output");
    write(&input, "run/benchmark/summary.json", r#"{"model":"m"}"#);
    fs::create_dir_all(input.join("scratch")).unwrap();
    let out = dir.path().join("cmp.json");

    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(&out)
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not a candidate").not());

    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(&out)
        .env("RUST_LOG", "debug")
        .current_dir(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not a candidate"));
}

#[test]
fn concurrent_flag_produces_same_records() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("runs");
    write(&input, "r1/benchmark/summary.json", r#"{"model":"a","rps":1}"#);
    write(&input, "r2/benchmark/summary.json", "not json");
    let out = dir.path().join("cmp.json");

    benchcmp()
        .arg("-i").arg(&input)
        .arg("-o").arg(&out)
        .arg("--concurrent")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped r2"));

    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["records"].as_array().unwrap().len(), 1);
    assert_eq!(doc["skipped"][0]["name"], "r2");
}

#[test]
fn missing_root_fails() {
    let dir = tempdir().unwrap();
    benchcmp()
        .arg("--input").arg(dir.path().join("absent"))
        .arg("--output").arg(dir.path().join("cmp.json"))
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("scan root not found"));
}

#[test]
fn empty_batch_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("output");
    fs::create_dir_all(input.join("half_run/summary")).unwrap();
    let out = dir.path().join("cmp.json");
    benchcmp()
        .arg("--input").arg(&input)
        .arg("--output").arg(&out)
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no benchmark results"));
    assert!(!out.exists());
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("benchcmp.toml");
    fs::write(&cfg, "log_level = 'shout'\n").unwrap();
    benchcmp()
        .arg("--config").arg(&cfg)
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log_level"));
}
