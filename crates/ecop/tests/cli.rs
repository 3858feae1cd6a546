use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;

const CATALOG_JSON: &str = r#"
{
  "parts": {
    "resistor_0603": {
      "pins": ["1", "2"],
      "set_value": true,
      "fusion_add": "ADD RESISTOR_0603@rcl R",
      "kind": "resistor"
    },
    "can_transceiver_soic8": {
      "pins": ["TXD", "RXD", "CANH", "CANL", "VDD", "VSS"],
      "set_value": false,
      "fusion_add": "ADD TCAN1042@interface U",
      "kind": "ic"
    },
    "testpoint": {
      "fusion_add": "ADD TP@testpoint TP"
    }
  }
}
"#;

const COMMANDS_JSON: &str = r#"
{
  "commands": [
    {"op": "add_component", "args": {"part_id": "resistor_0603", "refdes": "R1"}},
    {"op": "add_component", "args": {"part_id": "can_transceiver_soic8", "refdes": "U1"}},
    {"op": "set_value", "args": {"refdes": "R1", "value": "120"}},
    {"op": "connect", "args": {"refdes": "U1", "pin": "CANH", "net_name": "CANH"}},
    {"op": "connect", "args": {"refdes": "U1", "pin": "CANL", "net_name": "CANL"}}
  ]
}
"#;

const BAD_COMMANDS_JSON: &str = r#"
{
  "commands": [
    {"op": "add_component", "args": {"part_id": "can_transceiver_soic8", "refdes": "U1"}},
    {"op": "set_value", "args": {"refdes": "U1", "value": "TCAN1044"}}
  ]
}
"#;

fn sandbox() -> TempDir {
    let dir = TempDir::new().unwrap();
    dir.child("catalog.json").write_str(CATALOG_JSON).unwrap();
    dir.child("commands.json").write_str(COMMANDS_JSON).unwrap();
    dir.child("bad.json").write_str(BAD_COMMANDS_JSON).unwrap();
    dir
}

fn ecop(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ecop").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn compile_writes_actions_file() {
    let dir = sandbox();

    let output = ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "commands.json",
            "--out",
            "out/actions.json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Compiled 5 commands into 7 actions"), "{stderr}");
    assert!(stderr.contains("ADD 2, SET_VALUE 1, PLACE 2, CONNECT 2"), "{stderr}");

    let written = std::fs::read_to_string(dir.child("out/actions.json").path()).unwrap();
    let actions: serde_json::Value = serde_json::from_str(&written).unwrap();
    let tags: Vec<&str> = actions["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(
        tags,
        ["ADD", "ADD", "SET_VALUE", "PLACE", "PLACE", "CONNECT", "CONNECT"]
    );
    assert_eq!(actions["actions"][0]["cmd"], "ADD RESISTOR_0603@rcl R");
}

#[test]
fn compile_uses_placement_config() {
    let dir = sandbox();
    dir.child("ecop.toml")
        .write_str("[placement]\ncolumn_gap_cells = 2\n")
        .unwrap();

    ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "commands.json",
            "--config",
            "ecop.toml",
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.child("actions.json").path()).unwrap();
    let actions: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(actions["actions"][3]["refdes"], "R1");
    assert_eq!(actions["actions"][3]["x"], 20.0);
}

#[test]
fn compile_rejects_invalid_commands() {
    let dir = sandbox();

    let output = ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "bad.json",
        ])
        .assert()
        .code(1)
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Commands validation failed"), "{stderr}");
    assert!(
        stderr.contains("Command[1]: set_value not allowed for part 'can_transceiver_soic8'"),
        "{stderr}"
    );
    assert!(!dir.child("actions.json").path().exists());
}

#[test]
fn compile_grounding_allow_list() {
    let dir = sandbox();

    ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "commands.json",
            "--allow",
            "resistor_0603",
        ])
        .assert()
        .code(1);

    ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "commands.json",
            "--allow",
            "resistor_0603,can_transceiver_soic8",
        ])
        .assert()
        .success();
}

#[test]
fn validate_reports_and_sets_exit_code() {
    let dir = sandbox();

    let output = ecop(&dir)
        .args([
            "validate",
            "--catalog",
            "catalog.json",
            "--commands",
            "commands.json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("✓ Validation PASSED"), "{stdout}");

    let output = ecop(&dir)
        .args(["validate", "--catalog", "catalog.json", "--commands", "bad.json"])
        .assert()
        .code(1)
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("✗ Validation FAILED"), "{stdout}");
}

#[test]
fn missing_input_file_is_a_user_error() {
    let dir = sandbox();

    let output = ecop(&dir)
        .args([
            "compile",
            "--catalog",
            "catalog.json",
            "--commands",
            "nope.json",
        ])
        .assert()
        .code(1)
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.json"), "{stderr}");
}

#[test]
fn catalog_lists_parts_and_warnings() {
    let dir = sandbox();

    let output = ecop(&dir)
        .args(["catalog", "catalog.json", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .clone();
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let ids: Vec<&str> = listing["parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["can_transceiver_soic8", "resistor_0603", "testpoint"]);
    assert_eq!(
        listing["warnings"],
        serde_json::json!(["Part 'testpoint' missing pins, defaulting to []"])
    );
}
