//! Grounding checks for machine-generated commands.
//!
//! A producer is handed an allow-list of part ids it may use. The grounding
//! pass rejects any add outside that list and any pin on a newly added
//! component that its catalog part does not declare.

use std::collections::{BTreeMap, BTreeSet};

use ecop_sch::{Catalog, Command, CommandsDoc, Snapshot};

use crate::validate::{ValidationReport, validate};

/// Run the grounding checks alone.
///
/// Refdes existence and collisions are left to [`validate`]; an add that
/// collides with the snapshot or an earlier add is not treated as new here.
pub fn enforce_grounding(
    commands: &CommandsDoc,
    allowed_part_ids: &BTreeSet<String>,
    catalog: &Catalog,
    snapshot: Option<&Snapshot>,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let existing: BTreeSet<&str> = snapshot
        .map(|s| s.components.iter().map(|c| c.refdes.as_str()).collect())
        .unwrap_or_default();
    let mut added: BTreeMap<&str, &str> = BTreeMap::new();

    for (index, command) in commands.iter().enumerate() {
        match command {
            Command::AddComponent(args) => {
                if !allowed_part_ids.contains(&args.part_id) {
                    report.error(
                        index,
                        command,
                        format!(
                            "part_id '{}' not in allowed parts (grounding violation)",
                            args.part_id
                        ),
                    );
                }
                if !existing.contains(args.refdes.as_str()) {
                    added
                        .entry(args.refdes.as_str())
                        .or_insert(args.part_id.as_str());
                }
            }
            Command::Connect(args) | Command::Disconnect(args) => {
                let Some(&part_id) = added.get(args.refdes.as_str()) else {
                    continue;
                };
                if !allowed_part_ids.contains(part_id) {
                    continue;
                }
                if let Some(part) = catalog.lookup(part_id) {
                    if !part.has_pin(&args.pin) {
                        report.error(
                            index,
                            command,
                            format!(
                                "pin '{}' not valid for part '{part_id}' (valid pins: {:?}) - grounding violation",
                                args.pin, part.pins
                            ),
                        );
                    }
                }
            }
            _ => {}
        }
    }

    report
}

/// Standard validation followed by the grounding pass.
///
/// A connect or disconnect that already failed standard validation does not
/// get a second pin error from grounding. Allow-list violations on adds are
/// always reported, since standard validation never checks the allow-list.
pub fn validate_grounded(
    commands: &CommandsDoc,
    allowed_part_ids: &BTreeSet<String>,
    catalog: &Catalog,
    snapshot: Option<&Snapshot>,
) -> ValidationReport {
    let mut report = validate(commands, catalog, snapshot);
    let mut grounding = enforce_grounding(commands, allowed_part_ids, catalog, snapshot);

    let failed: BTreeSet<usize> = report.errors.iter().map(|e| e.index).collect();
    grounding.errors.retain(|e| {
        let is_pin_check = matches!(
            commands.iter().nth(e.index),
            Some(Command::Connect(_) | Command::Disconnect(_))
        );
        !(is_pin_check && failed.contains(&e.index))
    });

    report.merge(grounding);
    report.errors.sort_by_key(|diagnostic| diagnostic.index);
    report
}
