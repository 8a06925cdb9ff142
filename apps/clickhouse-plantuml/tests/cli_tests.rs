use assert_cmd::prelude::*; // Add methods on commands
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const BINARY: &str = "clickhouse-plantuml";

#[test]
fn help_lists_parameter_groups() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(BINARY)?;

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ClickHouse parameters"))
        .stdout(predicate::str::contains("PlantUML parameters"))
        .stdout(predicate::str::contains("Diagram parameters"));

    Ok(())
}

#[test]
fn rejects_unknown_format() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin(BINARY)?;

    cmd.arg("-F").arg("bogus");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'bogus'"));

    Ok(())
}

#[test]
fn rejects_bad_connection_url() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let mut cmd = Command::cargo_bin(BINARY)?;

    cmd.current_dir(temp.path())
        .arg("--url")
        .arg("ftp://localhost/db");
    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Config"));

    Ok(())
}

#[test]
fn fails_when_clickhouse_is_unreachable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    let mut cmd = Command::cargo_bin(BINARY)?;

    cmd.current_dir(temp.path())
        .arg("--host")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("1")
        .arg("-o")
        .arg("schema.puml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Loading"));

    temp.child("schema.puml").assert(predicate::path::missing());

    Ok(())
}

#[test]
fn fails_on_broken_settings_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = assert_fs::TempDir::new()?;
    temp.child("clickhouse-plantuml.toml")
        .write_str("[clickhouse\nhost = ")?;
    let mut cmd = Command::cargo_bin(BINARY)?;

    cmd.current_dir(temp.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read settings"));

    Ok(())
}
