//! End-to-end tests of the `jsoncgen` binary.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SOURCE: &str = r#"package settings

// Settings of the demo service.
type Settings struct {
	// Listen address.
	Addr    string `json:"addr"`
	Workers int    `json:"workers"`
}

func SettingsDefaults() *Settings {
	return &Settings{Addr: ":8080", Workers: 4}
}
"#;

const WITH_TYPES: &str = "{\n\t// string - Listen address.\n\t\"addr\": \":8080\",\n\n\t// int\n\t\"workers\": 4\n}";
const WITHOUT_TYPES: &str = "{\n\t// Listen address.\n\t\"addr\": \":8080\",\n\n\t\"workers\": 4\n}";

/// A module with the package in `settings/`.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("go.mod"), "module example.com/demo\n\ngo 1.22\n").unwrap();
    let package = temp.path().join("settings");
    fs::create_dir(&package).unwrap();
    fs::write(package.join("settings.go"), SOURCE).unwrap();
    temp
}

fn jsoncgen(temp: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("jsoncgen");
    cmd.current_dir(temp.path())
        .env_remove("JSONCGEN_TYPE")
        .env_remove("JSONCGEN_DOC_TYPES")
        .env_remove("JSONCGEN_DIR")
        .env_remove("JSONCGEN_OUT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn writes_document_to_stdout() {
    let temp = project();
    jsoncgen(&temp)
        .args(["-t", "Settings", "settings"])
        .assert()
        .success()
        .stdout(WITH_TYPES);
}

#[test]
fn writes_document_to_file() {
    let temp = project();
    jsoncgen(&temp)
        .args(["--type", "Settings", "--doc-types", "NotFields", "-o", "settings.jsonc", "settings"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(contains("Wrote settings.jsonc"));

    let written = fs::read_to_string(temp.path().join("settings.jsonc")).unwrap();
    assert_eq!(written, WITHOUT_TYPES);
}

#[test]
fn defaults_to_working_directory() {
    let temp = project();
    let mut cmd = jsoncgen(&temp);
    cmd.current_dir(temp.path().join("settings"));
    cmd.args(["-t", "Settings"])
        .assert()
        .success()
        .stdout(WITH_TYPES)
        .stderr(contains("using current working dir"));
}

#[test]
fn requires_a_type_name() {
    let temp = project();
    jsoncgen(&temp)
        .arg("settings")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(contains("Missing required field: type"));
}

#[test]
fn rejects_unknown_doc_types() {
    let temp = project();
    jsoncgen(&temp)
        .args(["-t", "Settings", "--doc-types", "NotStructFields|NoTypes", "settings"])
        .assert()
        .code(2)
        .stderr(contains("unknown doc type 'NoTypes'"));
}

#[test]
fn reports_missing_struct() {
    let temp = project();
    jsoncgen(&temp)
        .args(["-t", "Missing", "settings"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(contains("Missing"));
}

#[test]
fn reads_config_file() {
    let temp = project();
    fs::write(
        temp.path().join("jsoncgen.toml"),
        "dir = \"settings\"\ntype = \"Settings\"\ndoc_types = \"NotFields\"\n",
    )
    .unwrap();

    jsoncgen(&temp).assert().success().stdout(WITHOUT_TYPES);
}

#[test]
fn environment_overrides_file_and_flags_override_environment() {
    let temp = project();
    fs::write(
        temp.path().join("jsoncgen.toml"),
        "dir = \"settings\"\ntype = \"Missing\"\ndoc_types = \"NotFields\"\n",
    )
    .unwrap();

    jsoncgen(&temp)
        .env("JSONCGEN_TYPE", "Settings")
        .assert()
        .success()
        .stdout(WITHOUT_TYPES);

    jsoncgen(&temp)
        .env("JSONCGEN_TYPE", "Settings")
        .env("JSONCGEN_DOC_TYPES", "NotFields")
        .args(["--doc-types", "AllFields"])
        .assert()
        .success()
        .stdout(WITH_TYPES);
}

#[test]
fn explicit_config_file_must_exist() {
    let temp = project();
    jsoncgen(&temp)
        .args(["-t", "Settings", "--config", "nowhere.toml", "settings"])
        .assert()
        .failure()
        .stderr(contains("Config file not found"));
}
