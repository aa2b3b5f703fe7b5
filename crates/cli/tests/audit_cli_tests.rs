// End-to-end tests for the `fieldaudit` binary.
// Run with: cargo test -p fieldaudit-cli --test audit_cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fieldaudit() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fieldaudit"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../recon/tests/fixtures").join(name)
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        )
    })
}

// -------------------------------------------------------------------------
// normalize
// -------------------------------------------------------------------------

#[test]
fn normalize_route_json() {
    let out = fieldaudit()
        .args(["normalize", "--kind", "route", "--json"])
        .arg(fixture("route-w44.csv"))
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = stdout_json(&out);
    assert_eq!(v["batch"]["kind"], "route");
    assert_eq!(v["batch"]["records"].as_array().unwrap().len(), 12);
    assert_eq!(v["stats"]["malformed"], 1);
    assert_eq!(v["stats"]["missing_key"], 1);
}

#[test]
fn normalize_roster_human() {
    let out = fieldaudit()
        .args(["normalize", "-k", "roster"])
        .arg(fixture("missing-w44.csv"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 11);
    assert!(stdout.lines().next().unwrap().starts_with("A-1001\t"));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("kept 11 of 11 rows"));
}

#[test]
fn normalize_rejects_unknown_kind() {
    let out = fieldaudit()
        .args(["normalize", "--kind", "missing"])
        .arg(fixture("missing-w44.csv"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("invalid record kind"));
    assert!(stderr.contains("hint:"));
}

// -------------------------------------------------------------------------
// run / validate
// -------------------------------------------------------------------------

#[test]
fn run_config_json() {
    let out = fieldaudit()
        .args(["run", "--json"])
        .arg(fixture("week44.audit.toml"))
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let v = stdout_json(&out);
    assert_eq!(v["meta"]["name"], "Week 44");
    assert_eq!(v["ingest"].as_array().unwrap().len(), 3);
    assert_eq!(v["metrics"]["total_visits"], 12);
    assert_eq!(v["metrics"]["compliance_rate_percent"], 92);
    assert_eq!(v["metrics"]["fraud_alerts"][0]["kind"], "UNREPORTED_COVERAGE");
    assert_eq!(v["metrics"]["fraud_alerts"][12]["kind"], "DUAL_REPORTING_RISK");
    assert_eq!(v["insights"]["unique_shops"], 10);
    assert_eq!(v["insights"]["visits_by_date"][0]["date"], "2025-10-25");
    assert_eq!(v["insights"]["visits_by_date"].as_array().unwrap().len(), 5);

    // Upload reports travel with each ingested file.
    assert_eq!(v["ingest"][0]["kind"], "route");
    assert_eq!(v["ingest"][0]["upload"]["written"], 12);
    assert_eq!(v["meta"]["revision"], 25);
    assert!(v.get("uploads").is_none());
}

#[test]
fn run_fail_on_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    let out = fieldaudit()
        .args(["run", "--fail-on-alerts", "--output"])
        .arg(&report)
        .arg(fixture("week44.audit.toml"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(63));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(written["metrics"]["fraud_alerts"].as_array().unwrap().len(), 13);
}

#[test]
fn run_resolves_paths_and_output_from_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("route.csv"),
        "Code,Name,Governorate,District,Shop Name,Check\nE1,Amr,Cairo,Maadi,Raya,True\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("roster.csv"), "EMPLOYEE CODE,EMPLOYEE NAME\nE1,Amr\n").unwrap();
    let config = dir.path().join("clean.audit.toml");
    std::fs::write(
        &config,
        r#"
name = "Clean"
[inputs]
route = ["route.csv"]
roster = ["roster.csv"]
[output]
json = "out.json"
"#,
    )
    .unwrap();

    let out = fieldaudit().arg("run").arg(&config).output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out.json")).unwrap()).unwrap();
    assert_eq!(written["metrics"]["compliance_rate_percent"], 100);
    // E1 is on both lists: one consolidated dual-reporting alert.
    assert_eq!(written["metrics"]["fraud_alerts"].as_array().unwrap().len(), 1);
    assert_eq!(written["metrics"]["fraud_alerts"][0]["employee_id"], "Multiple");
}

#[test]
fn run_missing_input_is_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.audit.toml");
    std::fs::write(&config, "name = \"Bad\"\n[inputs]\nroute = [\"nope.csv\"]\n").unwrap();

    let out = fieldaudit().arg("run").arg(&config).output().unwrap();
    assert_eq!(out.status.code(), Some(61));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.csv"));
}

#[test]
fn validate_reports_config() {
    let out = fieldaudit()
        .arg("validate")
        .arg(fixture("week44.audit.toml"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("valid: audit 'Week 44' with 1 route file(s), 2 roster file(s)"));
}

#[test]
fn validate_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("empty.audit.toml");
    std::fs::write(&config, "name = \"Empty\"\n[inputs]\n").unwrap();

    let out = fieldaudit().arg("validate").arg(&config).output().unwrap();
    assert_eq!(out.status.code(), Some(60));
}

// -------------------------------------------------------------------------
// reconcile
// -------------------------------------------------------------------------

#[test]
fn reconcile_flags_only() {
    let out = fieldaudit()
        .args(["reconcile", "--json", "--route"])
        .arg(fixture("route-w44.csv"))
        .arg("--roster")
        .arg(fixture("missing-w44.csv"))
        .output()
        .unwrap();
    assert!(out.status.success());

    let v = stdout_json(&out);
    assert_eq!(v["meta"]["name"], "ad hoc");
    assert_eq!(v["metrics"]["unreported_coverage_count"], 11);
    assert_eq!(v["metrics"]["fraud_alerts"].as_array().unwrap().len(), 12);
    assert_eq!(v["metrics"]["regions"][0]["name"], "Cairo");
}

#[test]
fn reconcile_requires_inputs() {
    let out = fieldaudit().arg("reconcile").output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn verbose_logs_skipped_rows() {
    let out = fieldaudit()
        .args(["--verbose", "normalize", "--kind", "route"])
        .arg(fixture("route-w44.csv"))
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("skipped"));
}
