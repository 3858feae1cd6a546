use ecop_compile::{CompileError, compile, format_validation, validate};
use ecop_sch::{ActionsDoc, Catalog, CommandsDoc, Snapshot};
use serde_json::json;

const CAN_CATALOG_JSON: &str = r#"
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
    }
  }
}
"#;

const CAN_COMMANDS_JSON: &str = r#"
{
  "commands": [
    {"op": "comment", "args": {"text": "CAN bus interface with 120R termination"}},
    {"op": "add_component", "args": {"part_id": "resistor_0603", "refdes": "R1"}},
    {"op": "add_component", "args": {"part_id": "can_transceiver_soic8", "refdes": "U1"}},
    {"op": "set_value", "args": {"refdes": "R1", "value": "120"}},
    {"op": "connect", "args": {"refdes": "U1", "pin": "CANH", "net_name": "CANH"}},
    {"op": "connect", "args": {"refdes": "U1", "pin": "CANL", "net_name": "CANL"}}
  ]
}
"#;

const POWER_SNAPSHOT_JSON: &str = r#"
{
  "components": [
    {
      "refdes": "U1",
      "part_id": "can_transceiver_soic8",
      "pins": ["TXD", "RXD", "CANH", "CANL", "VDD", "VSS"],
      "placement": {"x": 0.0, "y": 0.0, "rotation": 0.0, "layer": "Top"},
      "kind": "ic"
    }
  ],
  "nets": [
    {"net_name": "VDD", "connections": []}
  ],
  "source": "board-export"
}
"#;

fn can_catalog() -> Catalog {
    Catalog::from_json_str(CAN_CATALOG_JSON).unwrap()
}

fn commands(value: serde_json::Value) -> CommandsDoc {
    serde_json::from_value(value).unwrap()
}

fn rendered(actions: &ActionsDoc) -> String {
    actions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn can_interface_from_empty_sheet() {
    let catalog = can_catalog();
    let commands: CommandsDoc = serde_json::from_str(CAN_COMMANDS_JSON).unwrap();

    let compiled = compile(&commands, &catalog, None).unwrap();

    assert_eq!(
        compiled.actions.tags(),
        ["ADD", "ADD", "SET_VALUE", "PLACE", "PLACE", "CONNECT", "CONNECT"]
    );
    // R1 is 3x1 cells in the default column; U1 is pushed right past R1's
    // padded footprint.
    insta::assert_snapshot!(rendered(&compiled.actions), @r"
    ADD R1 <- ADD RESISTOR_0603@rcl R
    ADD U1 <- ADD TCAN1042@interface U
    SET_VALUE R1 = 120
    PLACE R1 at (60, 0) rot=0 Top
    PLACE U1 at (100, 0) rot=0 Top
    CONNECT U1.CANH -> CANH
    CONNECT U1.CANL -> CANL
    ");
    assert_eq!(
        compiled.warnings,
        [
            "Command[4]: connect net 'CANH' will be auto-created",
            "Command[5]: connect net 'CANL' will be auto-created",
        ]
    );

    let wire = serde_json::to_value(&compiled.actions).unwrap();
    assert_eq!(
        wire["actions"][0],
        json!({"type": "ADD", "cmd": "ADD RESISTOR_0603@rcl R", "refdes": "R1"})
    );
    assert_eq!(
        wire["actions"][3],
        json!({"type": "PLACE", "refdes": "R1", "x": 60.0, "y": 0.0, "rotation": 0.0, "layer": "Top"})
    );
}

#[test]
fn rename_is_applied_to_later_connects() {
    let catalog = can_catalog();
    let snapshot = Snapshot::from_json_str(POWER_SNAPSHOT_JSON).unwrap();
    let commands = commands(json!({
        "commands": [
            {"op": "rename_net", "args": {"from": "VDD", "to": "VCC"}},
            {"op": "connect", "args": {"refdes": "U1", "pin": "VDD", "net_name": "VDD"}}
        ]
    }));

    let compiled = compile(&commands, &catalog, Some(&snapshot)).unwrap();

    insta::assert_snapshot!(rendered(&compiled.actions), @r"
    RENAME_NET VDD -> VCC
    CONNECT U1.VDD -> VCC
    ");
    assert!(compiled.warnings.is_empty(), "{:?}", compiled.warnings);
    let wire = serde_json::to_value(&compiled.actions).unwrap();
    assert_eq!(
        wire["actions"][0],
        json!({"type": "RENAME_NET", "from": "VDD", "to": "VCC"})
    );
}

#[test]
fn rejected_edit_reports_every_problem() {
    let catalog = can_catalog();
    let snapshot = Snapshot::from_json_str(POWER_SNAPSHOT_JSON).unwrap();
    let commands = commands(json!({
        "commands": [
            {"op": "add_component", "args": {"part_id": "resistor_0603", "refdes": "U1"}},
            {"op": "add_component", "args": {"part_id": "ferrite_0402", "refdes": "FB1"}},
            {"op": "add_component", "args": {"part_id": "resistor_0603", "refdes": "R1"}},
            {"op": "add_component", "args": {"part_id": "resistor_0603", "refdes": "R1"}},
            {"op": "connect", "args": {"refdes": "U1", "pin": "STB", "net_name": "STANDBY"}},
            {"op": "set_value", "args": {"refdes": "U1", "value": "TCAN1044"}}
        ]
    }));

    let report = validate(&commands, &catalog, Some(&snapshot));
    insta::assert_snapshot!(format_validation(&report), @r#"
    ✗ Validation FAILED

    Errors (5):
      - Command[0]: add_component refdes 'U1' already exists in snapshot
      - Command[1]: add_component part_id 'ferrite_0402' not found in catalog
      - Command[3]: add_component refdes 'R1' duplicates earlier add
      - Command[4]: connect pin 'STB' not in snapshot pins for 'U1': ["TXD", "RXD", "CANH", "CANL", "VDD", "VSS"]
      - Command[5]: set_value not allowed for part 'can_transceiver_soic8' (catalog.set_value != true)

    Warnings (1):
      - Command[4]: connect net 'STANDBY' will be auto-created
    "#);

    let err = compile(&commands, &catalog, Some(&snapshot)).unwrap_err();
    let CompileError::Validation(compile_report) = err else {
        panic!("expected a validation failure");
    };
    assert_eq!(compile_report, report);
}

#[test]
fn snapshot_extras_survive_round_trip() {
    let snapshot = Snapshot::from_json_str(POWER_SNAPSHOT_JSON).unwrap();
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["source"], "board-export");
    assert_eq!(value["components"][0]["kind"], "ic");
}
