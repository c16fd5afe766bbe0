//! E2E tests for the sunny-scrape binary.
//!
//! Covers:
//! - history download into an output directory
//! - current values as JSON
//! - exit codes for login and config failures
//! - conflicting flags
//! - secrets staying out of logs

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

mod common;

use common::logger::TestLogger;
use common::portal::{MockPortal, PASSWORD, SAMPLE_CSV, USERNAME};

const SUNNY_VARS: &[&str] = &[
    "SUNNY_CONFIG",
    "SUNNY_USERNAME",
    "SUNNY_PASSWORD",
    "SUNNY_TIMEOUT",
    "SUNNY_RENEWAL_THRESHOLD",
    "SUNNY_NO_COLOR",
    "SUNNY_LOG",
    "SUNNY_LOG_FORMAT",
    "SUNNY_LOG_FILE",
];

/// A command isolated from the caller's environment and working directory.
#[allow(deprecated)]
fn sunny(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sunny-scrape").unwrap();
    for var in SUNNY_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1").current_dir(dir);
    cmd
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().expect("spawn sunny-scrape"))
        .await
        .expect("join")
}

#[tokio::test(flavor = "multi_thread")]
async fn history_day_writes_csv() {
    let log = TestLogger::new("history_day_writes_csv");
    log.phase("setup");
    let portal = MockPortal::start().await;
    portal.mount_login().await;
    portal.mount_chart(SAMPLE_CSV).await;
    let tmp = tempfile::tempdir().unwrap();
    let config = portal.write_config(tmp.path());

    log.phase("execute");
    log.command(&["history", "--day", "2023-01-01", "-o", "out"]);
    let mut cmd = sunny(tmp.path());
    cmd.arg("--config")
        .arg(&config)
        .args(["history", "--day", "2023-01-01", "-o", "out"]);
    let output = run(cmd).await;

    log.phase("verify");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 day(s) written"), "{stdout}");
    let file = tmp.path().join("out").join("sma_energy_data_2023-01-01.csv");
    assert_eq!(std::fs::read(file).unwrap(), SAMPLE_CSV.as_bytes());
    log.finish_ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn history_json_reports_days() {
    let portal = MockPortal::start().await;
    portal.mount_login().await;
    portal.mount_chart(SAMPLE_CSV).await;
    let tmp = tempfile::tempdir().unwrap();
    let config = portal.write_config(tmp.path());

    let mut cmd = sunny(tmp.path());
    cmd.arg("--config")
        .arg(&config)
        .args(["--json", "history", "-d", "2023-01-02", "-o", "out"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["schemaVersion"], "sunny-scrape.v1");
    assert_eq!(json["command"], "history");
    assert_eq!(json["data"]["complete"], true);
    assert_eq!(json["data"]["days"].as_array().map(Vec::len), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn current_json_has_live_values() {
    let portal = MockPortal::start().await;
    portal.mount_login().await;
    portal
        .mount_dashboard(r#"{"PV":3120,"TotalConsumption":540.5,"GridConsumption":0}"#)
        .await;
    let tmp = tempfile::tempdir().unwrap();
    let config = portal.write_config(tmp.path());

    let mut cmd = sunny(tmp.path());
    cmd.arg("--config").arg(&config).args(["current", "--json"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{output:?}");
    let json: Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["command"], "current");
    assert_eq!(json["data"]["available"], true);
    assert_eq!(json["data"]["pvWatts"], 3120.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn local_config_file_is_picked_up() {
    let portal = MockPortal::start().await;
    portal.mount_login().await;
    portal.mount_dashboard("null").await;
    let tmp = tempfile::tempdir().unwrap();
    portal.write_config(tmp.path());

    let output = run(sunny(tmp.path())).await;

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No live data available"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_exits_with_auth_code() {
    let portal = MockPortal::start().await;
    portal.mount_login_rejected().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = portal.write_config(tmp.path());

    let mut cmd = sunny(tmp.path());
    cmd.arg("--config")
        .arg(&config)
        .args(["history", "-d", "2023-01-01"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SUNNY-A003"), "{stderr}");
    assert!(!tmp.path().join("sma_energy_data_2023-01-01.csv").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_day_keeps_partial_output() {
    let portal = MockPortal::start().await;
    portal.mount_login().await;
    portal.mount_chart(SAMPLE_CSV).await;
    portal
        .fail_ranged_chart_on(common::portal::day("2023-01-02"), 500)
        .await;
    let tmp = tempfile::tempdir().unwrap();
    let config = portal.write_config(tmp.path());

    // The batch stops on the second day of the year.
    let mut cmd = sunny(tmp.path());
    cmd.arg("--config").arg(&config).args(["history", "-f", "2023"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(5));
    assert!(tmp.path().join("sma_energy_data_2023-01-01.csv").is_file());
    assert!(!tmp.path().join("sma_energy_data_2023-01-02.csv").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stopped at 2023-01-02"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2023-01-02"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn credentials_never_reach_the_logs() {
    for level in ["debug", "trace"] {
        let portal = MockPortal::start().await;
        portal.mount_login().await;
        portal.mount_chart(SAMPLE_CSV).await;
        let tmp = tempfile::tempdir().unwrap();
        let config = portal.write_config(tmp.path());

        let mut cmd = sunny(tmp.path());
        cmd.arg("--config")
            .arg(&config)
            .args(["--log-level", level, "history", "-d", "2023-01-01"]);
        let output = run(cmd).await;

        assert!(output.status.success(), "{output:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("Configuration resolved"),
            "{level} logging missed the config event: {stderr}"
        );
        assert!(!stderr.contains(PASSWORD), "password in {level} logs: {stderr}");
        assert!(!stderr.contains(USERNAME), "username in {level} logs: {stderr}");
    }
}

#[test]
fn explicit_missing_config_exits_with_config_code() {
    let tmp = tempfile::tempdir().unwrap();

    sunny(tmp.path())
        .args(["--config", "does-not-exist.json", "current"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SUNNY-C001"));
}

#[test]
fn missing_credentials_exit_with_config_code() {
    let tmp = tempfile::tempdir().unwrap();

    sunny(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path())
        .arg("current")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SUNNY-C003"));
}

#[test]
fn day_and_full_year_conflict() {
    let tmp = tempfile::tempdir().unwrap();

    sunny(tmp.path())
        .args(["history", "--day", "2023-01-01", "--full-year", "2023"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn malformed_config_reports_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join(".config.json"), "{\n  \"username\": \n").unwrap();

    sunny(tmp.path())
        .arg("current")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("SUNNY-C002"));
}

#[test]
fn help_lists_commands() {
    let tmp = tempfile::tempdir().unwrap();

    sunny(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("history").and(predicate::str::contains("current")));
}
