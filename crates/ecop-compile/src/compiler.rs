//! Commands → Actions compilation.
//!
//! Compilation is all-or-nothing: validation runs first and any error aborts
//! before a single action is produced. A successful compile then makes two
//! passes over the commands. The first collects state (new components, the
//! rename alias map, explicit placements). The second emits actions in a
//! fixed phase order that an executor can replay literally:
//!
//! 1. `RENAME_NET`
//! 2. `ADD`
//! 3. `SET_VALUE`
//! 4. `PLACE` (explicit placements, then auto-placement of new components)
//! 5. `CONNECT` / `DISCONNECT`, in their original relative order
//! 6. `REMOVE`

use std::collections::{BTreeMap, BTreeSet};

use ecop_autoplace::{GridPlacer, PlacerConfig, PlacerConfigError, place_near};
use ecop_sch::{Action, ActionsDoc, Catalog, Command, CommandsDoc, Placement, Snapshot};
use log::debug;
use thiserror::Error;

use crate::guardrails::validate_grounded;
use crate::nets::normalize_net_name;
use crate::placement::{auto_place, sheet_obstacles};
use crate::validate::{ValidationReport, validate};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Commands validation failed:\n{0}")]
    Validation(ValidationReport),

    #[error("Invalid placement configuration: {0}")]
    Placement(#[from] PlacerConfigError),
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub placement: PlacerConfig,
    /// When set, commands are validated in grounding mode against this
    /// allow-list of part ids.
    pub allowed_parts: Option<BTreeSet<String>>,
}

/// A successful compile: the actions plus every non-fatal warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub actions: ActionsDoc,
    pub warnings: Vec<String>,
}

/// Explicit placements keyed by refdes, kept in order of the first command
/// that placed each component. A later command for the same refdes replaces
/// the position but keeps the slot.
#[derive(Debug, Default)]
struct ExplicitPlacements<'a> {
    entries: Vec<(&'a str, Placement)>,
}

impl<'a> ExplicitPlacements<'a> {
    fn set(&mut self, refdes: &'a str, placement: Placement) {
        match self.entries.iter_mut().find(|(r, _)| *r == refdes) {
            Some(slot) => slot.1 = placement,
            None => self.entries.push((refdes, placement)),
        }
    }

    fn get(&self, refdes: &str) -> Option<Placement> {
        self.entries
            .iter()
            .find(|(r, _)| *r == refdes)
            .map(|(_, placement)| *placement)
    }
}

/// Everything the first pass learns about the edit.
#[derive(Debug, Default)]
struct EditState<'a> {
    /// `(refdes, part_id)` of new components, in add order.
    added: Vec<(&'a str, &'a str)>,
    part_ids: BTreeMap<&'a str, &'a str>,
    aliases: BTreeMap<&'a str, &'a str>,
    explicit: ExplicitPlacements<'a>,
}

pub struct Compiler<'c> {
    catalog: &'c Catalog,
    options: CompileOptions,
}

impl<'c> Compiler<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_options(catalog, CompileOptions::default())
    }

    pub fn with_options(catalog: &'c Catalog, options: CompileOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile(
        &self,
        commands: &CommandsDoc,
        snapshot: Option<&Snapshot>,
    ) -> Result<Compiled, CompileError> {
        self.options.placement.validate()?;

        let report = match &self.options.allowed_parts {
            Some(allowed) => validate_grounded(commands, allowed, self.catalog, snapshot),
            None => validate(commands, self.catalog, snapshot),
        };
        if !report.ok() {
            return Err(CompileError::Validation(report));
        }

        let mut warnings = report.warning_messages();
        debug!(
            "Validated {} commands with {} warnings",
            commands.len(),
            warnings.len()
        );

        let state = collect_state(commands, snapshot, &mut warnings);
        let actions = self.emit(commands, snapshot, &state, &mut warnings);
        debug!("Compiled {} actions", actions.len());

        Ok(Compiled {
            actions: ActionsDoc::new(actions),
            warnings,
        })
    }

    fn emit(
        &self,
        commands: &CommandsDoc,
        snapshot: Option<&Snapshot>,
        state: &EditState<'_>,
        warnings: &mut Vec<String>,
    ) -> Vec<Action> {
        let mut actions = Vec::new();

        for command in commands.iter() {
            if let Command::RenameNet(args) = command {
                actions.push(Action::RenameNet {
                    from: args.from.clone(),
                    to: args.to.clone(),
                });
            }
        }

        for command in commands.iter() {
            if let Command::AddComponent(args) = command {
                match self.catalog.lookup(&args.part_id) {
                    Some(part) => actions.push(Action::Add {
                        directive: part.add_directive.clone(),
                        refdes: args.refdes.clone(),
                    }),
                    None => warnings.push(format!(
                        "Part '{}' not found in catalog during compilation",
                        args.part_id
                    )),
                }
            }
        }

        for command in commands.iter() {
            if let Command::SetValue(args) = command {
                actions.push(Action::SetValue {
                    refdes: args.refdes.clone(),
                    value: args.value.clone(),
                });
            }
        }

        self.emit_placements(snapshot, state, &mut actions);

        for command in commands.iter() {
            match command {
                Command::Connect(args) => actions.push(Action::Connect {
                    refdes: args.refdes.clone(),
                    pin: args.pin.clone(),
                    net_name: normalize_net_name(&args.net_name, &state.aliases).to_string(),
                }),
                Command::Disconnect(args) => actions.push(Action::Disconnect {
                    refdes: args.refdes.clone(),
                    pin: args.pin.clone(),
                    net_name: normalize_net_name(&args.net_name, &state.aliases).to_string(),
                }),
                _ => {}
            }
        }

        for command in commands.iter() {
            if let Command::RemoveComponent(args) = command {
                actions.push(Action::Remove {
                    refdes: args.refdes.clone(),
                });
            }
        }

        actions
    }

    fn emit_placements(
        &self,
        snapshot: Option<&Snapshot>,
        state: &EditState<'_>,
        actions: &mut Vec<Action>,
    ) {
        for (refdes, placement) in &state.explicit.entries {
            actions.push(Action::place(*refdes, *placement));
        }

        let pending: Vec<(&str, &str)> = state
            .added
            .iter()
            .copied()
            .filter(|(refdes, _)| state.explicit.get(refdes).is_none())
            .collect();
        if pending.is_empty() {
            return;
        }

        let obstacles = sheet_obstacles(
            self.catalog,
            snapshot,
            &state.explicit.entries,
            &state.part_ids,
        );
        debug!(
            "Auto-placing {} components around {} obstacles",
            pending.len(),
            obstacles.len()
        );
        let placer = GridPlacer::new(self.options.placement.clone());
        let placed = auto_place(&placer, self.catalog, &pending, &obstacles);
        for (refdes, _) in &pending {
            if let Some(placement) = placed.get(*refdes) {
                actions.push(Action::place(*refdes, *placement));
            }
        }
    }
}

/// First pass: record adds, renames and explicit placements.
fn collect_state<'a>(
    commands: &'a CommandsDoc,
    snapshot: Option<&'a Snapshot>,
    warnings: &mut Vec<String>,
) -> EditState<'a> {
    let mut state = EditState::default();

    for command in commands.iter() {
        match command {
            Command::AddComponent(args) => {
                state.added.push((args.refdes.as_str(), args.part_id.as_str()));
                state.part_ids.insert(args.refdes.as_str(), args.part_id.as_str());
            }
            Command::RenameNet(args) => {
                state.aliases.insert(args.from.as_str(), args.to.as_str());
            }
            Command::PlaceComponent(args) => {
                let placement = Placement {
                    x: args.x,
                    y: args.y,
                    rotation: args.rotation,
                    layer: args.layer,
                };
                state.explicit.set(&args.refdes, placement.normalized());
            }
            Command::PlaceNear(args) => {
                let anchor = state.explicit.get(&args.anchor_refdes).or_else(|| {
                    snapshot
                        .and_then(|s| s.component(&args.anchor_refdes))
                        .and_then(|c| c.placement)
                });
                match anchor {
                    Some(anchor) => {
                        let placement =
                            place_near(&anchor, args.dx, args.dy, args.rotation, args.layer);
                        state.explicit.set(&args.refdes, placement.normalized());
                    }
                    None => warnings.push(format!(
                        "place_near: anchor '{}' has no placement, skipping relative placement for '{}'",
                        args.anchor_refdes, args.refdes
                    )),
                }
            }
            _ => {}
        }
    }

    state
}

/// Compile with default options.
pub fn compile(
    commands: &CommandsDoc,
    catalog: &Catalog,
    snapshot: Option<&Snapshot>,
) -> Result<Compiled, CompileError> {
    Compiler::new(catalog).compile(commands, snapshot)
}
