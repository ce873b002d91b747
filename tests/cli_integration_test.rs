mod common;

use std::process::{Command, Output};

use common::TestFixtures;
use tempfile::TempDir;

fn run_cli(args: &[&str]) -> Output {
    let fixtures = TestFixtures::new();
    Command::new(env!("CARGO_BIN_EXE_fiscal-xml-validator"))
        .env_remove("FISCAL_XML_SCHEMA_DIR")
        .env_remove("FISCAL_XML_LANGUAGE")
        .env_remove("FISCAL_XML_FORMAT")
        .env_remove("FISCAL_XML_VERBOSE")
        .env_remove("FISCAL_XML_QUIET")
        .env_remove("FISCAL_XML_CACHE_CAPACITY")
        .arg("--schema-dir")
        .arg(fixtures.schemas_dir())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn path_arg(path: std::path::PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_fiscal-xml-validator"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.contains("--schema-dir"));
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("--language"));
    assert!(stdout.contains("--verbose"));
    assert!(stdout.contains("--quiet"));
    assert!(stdout.contains("--config"));
}

#[test]
fn test_cli_version_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_fiscal-xml-validator"))
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(concat!("fiscal-xml-validator ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_cli_all_valid() {
    let fixtures = TestFixtures::new();
    let output = run_cli(&[
        &path_arg(fixtures.cte_valid()),
        &path_arg(fixtures.nfe_valid()),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("cte-valid.xml (CT-e"));
    assert!(stdout.contains("nfe-valid.xml (NF-e"));
    assert!(stdout.contains("Total files: 2"));
}

#[test]
fn test_cli_mixed_batch_reports_each_file() {
    let fixtures = TestFixtures::new();
    let output = run_cli(&[
        &path_arg(fixtures.cte_valid()),
        &path_arg(fixtures.cte_missing_nct()),
        &path_arg(fixtures.malformed()),
        &path_arg(fixtures.unknown_namespace()),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.contains("VALID  "));
    assert!(stdout.contains("cte-missing-nct.xml (CT-e"));
    assert!(stdout.contains("field 'dhEmi' with value '2024-03-15T10:30:00-03:00' is invalid."));
    assert!(stdout.contains("malformed.xml"));
    assert!(stdout.contains("XML syntax error"));
    assert!(stdout.contains("http://www.portalfiscal.inf.br/mdfe"));
    assert!(stdout.contains("Total files: 4"));
}

#[test]
fn test_cli_json_output() {
    let fixtures = TestFixtures::new();
    let output = run_cli(&[
        "--format",
        "json",
        "--language",
        "portuguese",
        &path_arg(fixtures.cte_missing_nct()),
        &path_arg(fixtures.blank()),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["status"], "invalid");
    assert_eq!(reports[0]["document_type"], "CT-e");
    assert_eq!(reports[0]["errors"][0]["field_name"], "dhEmi");
    assert!(
        reports[0]["errors"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Linha 7")
    );
    assert_eq!(reports[1]["status"], "rejected");
    assert_eq!(reports[1]["reason"], "empty_content");
}

#[test]
fn test_cli_missing_file_does_not_stop_batch() {
    let fixtures = TestFixtures::new();
    let output = run_cli(&[
        "/nonexistent/file.xml",
        &path_arg(fixtures.cte_valid()),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("/nonexistent/file.xml"));
    assert!(stdout.contains("cte-valid.xml (CT-e"));
}

#[test]
fn test_cli_missing_schemas_is_startup_failure() {
    let temp_dir = TempDir::new().unwrap();
    let fixtures = TestFixtures::new();

    let output = Command::new(env!("CARGO_BIN_EXE_fiscal-xml-validator"))
        .env_remove("FISCAL_XML_SCHEMA_DIR")
        .arg("--schema-dir")
        .arg(temp_dir.path())
        .arg(fixtures.cte_valid())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to load schemas"));
    assert!(stderr.contains("Schema not found"));
}

#[test]
fn test_cli_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let fixtures = TestFixtures::new();
    let config_path = temp_dir.path().join("fiscal-xml.toml");
    std::fs::write(
        &config_path,
        format!(
            "[schemas]\nbase_dir = {:?}\n\n[output]\nformat = \"json\"\n",
            fixtures.schemas_dir().to_string_lossy()
        ),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_fiscal-xml-validator"))
        .env_remove("FISCAL_XML_SCHEMA_DIR")
        .env_remove("FISCAL_XML_FORMAT")
        .arg("--config")
        .arg(&config_path)
        .arg(fixtures.nfe_valid())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["status"], "valid");
    assert_eq!(reports[0]["document_type"], "NF-e");
}

#[test]
fn test_cli_conflicting_options() {
    let fixtures = TestFixtures::new();
    let output = run_cli(&["--verbose", "--quiet", &path_arg(fixtures.cte_valid())]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cannot be used with"));
}
