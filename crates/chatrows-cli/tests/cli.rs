use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from any real user configuration.
fn chatrows(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chatrows").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home).env("HOME", config_home);
    cmd
}

const WEBHOOK: &str = r#"{
    "destination": "Ubot",
    "events": [
        {"type": "message", "timestamp": 1700000000000,
         "source": {"type": "group", "groupId": "C7"},
         "message": {"type": "text", "id": "1", "text": "GG1001\nFB: Cod 150,000 ກີບ ລູທີນ 2\n\nDD2002\n01/02/24"}},
        {"type": "follow", "source": {"type": "user", "userId": "U1"}},
        {"type": "message",
         "source": {"type": "user", "userId": "U2"},
         "message": {"type": "text", "id": "2", "text": "hello there"}}
    ]
}"#;

#[test]
fn parse_stdin_as_json() {
    let home = TempDir::new().unwrap();
    let output = chatrows(home.path())
        .args(["parse", "-", "--date", "15/03/24"])
        .write_stdin("GG1001\nFB: Cod 150,000 ກີບ ລູທີນ 2")
        .output()
        .unwrap();

    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["date"], "15/03/24");
    assert_eq!(records[0]["order_code"], "GG1001");
    assert_eq!(records[0]["payment"], "Cod 150,000 ກີບ");
    assert_eq!(records[0]["quantity"], "ລູທີນ 2");
}

#[test]
fn parse_grouped_csv() {
    let home = TempDir::new().unwrap();
    chatrows(home.path())
        .args(["parse", "-", "--grouped", "-f", "csv", "--date", "15/03/24"])
        .write_stdin("DD2002\n01/02/24\nFB: Cod 80,000 ກີບ")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "destination,date,order_code,product,note_block,payment,quantity",
        ))
        .stdout(predicate::str::contains("DD,01/02/24,DD2002,-,\"FB: Cod 80,000 ກີບ\""));
}

#[test]
fn parse_non_utf8_yields_no_records() {
    let home = TempDir::new().unwrap();
    let output = chatrows(home.path())
        .args(["parse", "-"])
        .write_stdin(vec![0x47u8, 0x47, 0xff, 0xfe])
        .output()
        .unwrap();

    assert!(output.status.success());
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records, serde_json::json!([]));
}

#[test]
fn parse_rejects_bad_date() {
    let home = TempDir::new().unwrap();
    chatrows(home.path())
        .args(["parse", "-", "--date", "2024-03-15"])
        .write_stdin("GG1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected dd/mm/yy"));
}

#[test]
fn ingest_writes_destination_files() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let body = work.path().join("webhook.json");
    fs::write(&body, WEBHOOK).unwrap();
    let sink_dir = work.path().join("rows");

    chatrows(home.path())
        .arg("ingest")
        .arg(&body)
        .arg("--sink-dir")
        .arg(&sink_dir)
        .args(["--date", "15/03/24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rows from 2 messages"));

    let gg = fs::read_to_string(sink_dir.join("GG.csv")).unwrap();
    assert_eq!(gg.lines().count(), 2);
    assert!(gg.contains("15/03/24,GG1001"));

    let dd = fs::read_to_string(sink_dir.join("DD.csv")).unwrap();
    assert!(dd.contains("01/02/24,DD2002"));

    let other = fs::read_to_string(sink_dir.join("Other.csv")).unwrap();
    assert!(other.contains("UNKNOWN,hello there"));
}

#[test]
fn ingest_dry_run_prints_rows() {
    let home = TempDir::new().unwrap();
    chatrows(home.path())
        .args(["ingest", "-", "--dry-run", "--date", "15/03/24"])
        .write_stdin(WEBHOOK)
        .assert()
        .success()
        .stdout(predicate::str::contains("GG,15/03/24,GG1001"))
        .stdout(predicate::str::contains("Other,15/03/24,UNKNOWN,hello there"));
}

#[test]
fn ingest_rejects_malformed_body() {
    let home = TempDir::new().unwrap();
    chatrows(home.path())
        .args(["ingest", "-", "--dry-run"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid webhook body"));
}

#[test]
fn batch_writes_summary() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    fs::write(work.path().join("a.txt"), "GG1\nFB: Cod 150,000 ກີບ\nGG2").unwrap();
    fs::write(work.path().join("b.txt"), "DD1\nCod 80,000 ກີບ").unwrap();
    let out = work.path().join("out");
    let pattern = work.path().join("*.txt");

    chatrows(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("-o")
        .arg(&out)
        .args(["-f", "csv", "--summary", "--date", "15/03/24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 0 failed"));

    assert!(out.join("a.csv").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,2,150000,"));
    assert!(summary.contains("b.txt,success,1,80000,"));
}

#[test]
fn config_set_validates_patterns() {
    let home = TempDir::new().unwrap();

    chatrows(home.path())
        .args(["config", "set", "parser.note_marker", "NOTE:"])
        .assert()
        .success();

    chatrows(home.path())
        .args(["config", "get", "parser.note_marker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"NOTE:\""));

    chatrows(home.path())
        .args(["config", "set", "parser.quantity_keyword", "\"\""])
        .assert()
        .failure();

    chatrows(home.path())
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 order types"));
}

#[test]
fn explicit_config_file_is_used_by_config_commands() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let config = work.path().join("shop.json");
    fs::write(&config, r#"{ "parser": { "placeholder": "n/a" } }"#).unwrap();

    chatrows(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "parser.placeholder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"n/a\""));

    chatrows(home.path())
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "parser.note_marker", "NOTE:"])
        .assert()
        .success();

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("\"NOTE:\""));
    assert!(saved.contains("\"n/a\""));
    assert!(!home.path().join("chatrows").join("config.json").exists());

    chatrows(home.path())
        .arg("-c")
        .arg(&config)
        .args(["parse", "-", "-f", "csv", "--date", "15/03/24"])
        .write_stdin("DD1\nNOTE: Cod 5,000 ກີບ")
        .assert()
        .success()
        .stdout(predicate::str::contains("15/03/24,DD1,n/a,\"NOTE: Cod 5,000 ກີບ\""));
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    chatrows(home.path())
        .arg("-c")
        .arg(work.path().join("absent.json"))
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();

    chatrows(home.path())
        .args(["config", "set", "parser.no_such_field", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}
