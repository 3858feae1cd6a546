//! Commands validation against the catalog and the snapshot.
//!
//! Validation never fails by itself: it returns a [`ValidationReport`] and the
//! caller decides whether errors are fatal. Commands are checked in document
//! order against a running view of what exists so far, so a command may refer
//! to anything an earlier command added, created or renamed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ecop_sch::commands::PinNetArgs;
use ecop_sch::{Catalog, Command, CommandsDoc, Snapshot, SnapshotComponent};

use crate::nets::normalize_net_name;

/// One finding, tied to the command that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub index: usize,
    pub op: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command[{}]: {} {}", self.index, self.op, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Append another report's findings after this one's.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn error(&mut self, index: usize, command: &Command, message: String) {
        self.errors.push(Diagnostic {
            index,
            op: command.op(),
            message,
        });
    }

    pub(crate) fn warning(&mut self, index: usize, command: &Command, message: String) {
        self.warnings.push(Diagnostic {
            index,
            op: command.op(),
            message,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_validation(self))
    }
}

/// Human-readable multi-line summary of a report.
pub fn format_validation(report: &ValidationReport) -> String {
    let mut lines = Vec::new();

    if report.ok() {
        lines.push("✓ Validation PASSED".to_string());
    } else {
        lines.push("✗ Validation FAILED".to_string());
    }

    if !report.errors.is_empty() {
        lines.push(format!("\nErrors ({}):", report.errors.len()));
        lines.extend(report.errors.iter().map(|e| format!("  - {e}")));
    }

    if !report.warnings.is_empty() {
        lines.push(format!("\nWarnings ({}):", report.warnings.len()));
        lines.extend(report.warnings.iter().map(|w| format!("  - {w}")));
    }

    if report.errors.is_empty() && report.warnings.is_empty() {
        lines.push("  No issues found".to_string());
    }

    lines.join("\n")
}

/// Where a refdes known to the validator comes from.
#[derive(Debug, Clone, Copy)]
enum Origin<'a> {
    Snapshot(&'a SnapshotComponent),
    Added { part_id: &'a str },
}

/// Running view of the schematic while walking the command list.
struct Arena<'a> {
    refdes: BTreeMap<&'a str, Origin<'a>>,
    nets: BTreeSet<&'a str>,
    aliases: BTreeMap<&'a str, &'a str>,
}

impl<'a> Arena<'a> {
    fn new(snapshot: Option<&'a Snapshot>) -> Self {
        let mut arena = Arena {
            refdes: BTreeMap::new(),
            nets: BTreeSet::new(),
            aliases: BTreeMap::new(),
        };
        if let Some(snapshot) = snapshot {
            for component in &snapshot.components {
                arena
                    .refdes
                    .insert(component.refdes.as_str(), Origin::Snapshot(component));
            }
            arena.nets = snapshot.net_names();
        }
        arena
    }

    fn is_known(&self, refdes: &str) -> bool {
        self.refdes.contains_key(refdes)
    }
}

/// Validate `commands` against `catalog` and the optional `snapshot`.
pub fn validate(
    commands: &CommandsDoc,
    catalog: &Catalog,
    snapshot: Option<&Snapshot>,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut arena = Arena::new(snapshot);

    for (index, command) in commands.iter().enumerate() {
        match command {
            Command::AddComponent(args) => {
                if !catalog.contains(&args.part_id) {
                    report.error(
                        index,
                        command,
                        format!("part_id '{}' not found in catalog", args.part_id),
                    );
                }
                let prior = arena.refdes.get(args.refdes.as_str()).copied();
                match prior {
                    Some(Origin::Added { .. }) => report.error(
                        index,
                        command,
                        format!("refdes '{}' duplicates earlier add", args.refdes),
                    ),
                    Some(Origin::Snapshot(_)) => report.error(
                        index,
                        command,
                        format!("refdes '{}' already exists in snapshot", args.refdes),
                    ),
                    None => {
                        arena.refdes.insert(
                            args.refdes.as_str(),
                            Origin::Added {
                                part_id: args.part_id.as_str(),
                            },
                        );
                    }
                }
            }

            Command::RemoveComponent(args) => {
                if !arena.is_known(&args.refdes) {
                    report.error(
                        index,
                        command,
                        format!("refdes '{}' does not exist", args.refdes),
                    );
                }
            }

            Command::CreateNet(args) => {
                if !arena.nets.insert(args.net_name.as_str()) {
                    report.warning(
                        index,
                        command,
                        format!("'{}' already exists", args.net_name),
                    );
                }
            }

            Command::RenameNet(args) => {
                let from_known = arena.nets.contains(args.from.as_str());
                if !from_known {
                    report.error(
                        index,
                        command,
                        format!("'from' net '{}' does not exist", args.from),
                    );
                }
                if args.to != args.from && arena.nets.contains(args.to.as_str()) {
                    report.error(
                        index,
                        command,
                        format!("'to' net '{}' already exists", args.to),
                    );
                }
                if from_known {
                    arena.nets.remove(args.from.as_str());
                    arena.nets.insert(args.to.as_str());
                    arena.aliases.insert(args.from.as_str(), args.to.as_str());
                }
            }

            Command::Connect(args) => {
                check_pin(&mut report, &arena, catalog, index, command, args);
                let net = normalize_net_name(args.net_name.as_str(), &arena.aliases);
                if arena.nets.insert(net) {
                    report.warning(index, command, format!("net '{net}' will be auto-created"));
                }
            }

            Command::Disconnect(args) => {
                check_pin(&mut report, &arena, catalog, index, command, args);
                if let (Some(snapshot), Some(Origin::Snapshot(_))) =
                    (snapshot, arena.refdes.get(args.refdes.as_str()))
                {
                    let target = normalize_net_name(args.net_name.as_str(), &arena.aliases);
                    let connected = snapshot.nets.iter().any(|net| {
                        normalize_net_name(net.net_name.as_str(), &arena.aliases) == target
                            && net.is_connected(&args.refdes, &args.pin)
                    });
                    if !connected {
                        report.warning(
                            index,
                            command,
                            format!(
                                "connection '{}.{}' -> '{}' does not exist in snapshot",
                                args.refdes, args.pin, args.net_name
                            ),
                        );
                    }
                }
            }

            Command::SetValue(args) => match arena.refdes.get(args.refdes.as_str()) {
                None => report.error(
                    index,
                    command,
                    format!("refdes '{}' does not exist", args.refdes),
                ),
                // Unknown parts were already reported by their add_component.
                Some(Origin::Added { part_id }) => {
                    if let Some(part) = catalog.lookup(part_id) {
                        if !part.allows_value {
                            report.error(
                                index,
                                command,
                                format!(
                                    "not allowed for part '{part_id}' (catalog.set_value != true)"
                                ),
                            );
                        }
                    }
                }
                Some(Origin::Snapshot(component)) => match component.part_id.as_deref() {
                    None => report.warning(
                        index,
                        command,
                        format!(
                            "cannot be checked - snapshot has no part_id for '{}'",
                            args.refdes
                        ),
                    ),
                    Some(part_id) => match catalog.lookup(part_id) {
                        None => report.warning(
                            index,
                            command,
                            format!(
                                "cannot be checked - part '{part_id}' of '{}' is not in catalog",
                                args.refdes
                            ),
                        ),
                        Some(part) if !part.allows_value => report.error(
                            index,
                            command,
                            format!("not allowed for part '{part_id}' (catalog.set_value != true)"),
                        ),
                        Some(_) => {}
                    },
                },
            },

            Command::PlaceComponent(args) => {
                if !arena.is_known(&args.refdes) {
                    report.error(
                        index,
                        command,
                        format!("refdes '{}' does not exist", args.refdes),
                    );
                }
            }

            Command::PlaceNear(args) => {
                if !arena.is_known(&args.refdes) {
                    report.error(
                        index,
                        command,
                        format!("refdes '{}' does not exist", args.refdes),
                    );
                }
                if !arena.is_known(&args.anchor_refdes) {
                    report.error(
                        index,
                        command,
                        format!("anchor_refdes '{}' does not exist", args.anchor_refdes),
                    );
                }
            }

            Command::Comment(_) => {}
        }
    }

    report
}

/// Pin check shared by connect and disconnect.
fn check_pin(
    report: &mut ValidationReport,
    arena: &Arena<'_>,
    catalog: &Catalog,
    index: usize,
    command: &Command,
    args: &PinNetArgs,
) {
    match arena.refdes.get(args.refdes.as_str()) {
        None => report.error(
            index,
            command,
            format!("refdes '{}' does not exist", args.refdes),
        ),
        Some(Origin::Added { part_id }) => {
            if let Some(part) = catalog.lookup(part_id) {
                if !part.has_pin(&args.pin) {
                    report.error(
                        index,
                        command,
                        format!(
                            "pin '{}' not in catalog pins for part '{part_id}': {:?}",
                            args.pin, part.pins
                        ),
                    );
                }
            }
        }
        Some(Origin::Snapshot(component)) => {
            if !component.has_pin_info() {
                report.warning(
                    index,
                    command,
                    format!(
                        "pin '{}' cannot be validated - snapshot has no pin info for '{}'",
                        args.pin, args.refdes
                    ),
                );
            } else if !component.has_pin(&args.pin) {
                report.error(
                    index,
                    command,
                    format!(
                        "pin '{}' not in snapshot pins for '{}': {:?}",
                        args.pin, args.refdes, component.pins
                    ),
                );
            }
        }
    }
}
