//! Input loading shared by `compile` and `validate`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ecop_sch::io::load_json;
use ecop_sch::{Catalog, CommandsDoc, Snapshot};
use log::debug;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Part catalog JSON file
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub catalog: PathBuf,

    /// Commands JSON file
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub commands: PathBuf,

    /// Snapshot of the current schematic (omit when creating from scratch)
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    /// Restrict added parts to these part ids (grounding mode)
    #[arg(long = "allow", value_name = "PART_ID", value_delimiter = ',')]
    pub allow: Vec<String>,
}

pub struct Inputs {
    pub catalog: Catalog,
    pub commands: CommandsDoc,
    pub snapshot: Option<Snapshot>,
    pub allowed_parts: Option<BTreeSet<String>>,
}

impl InputArgs {
    pub fn load(&self) -> Result<Inputs> {
        let catalog = Catalog::load(&self.catalog)
            .with_context(|| format!("Failed to load catalog {}", self.catalog.display()))?;
        debug!("Loaded {} parts from {}", catalog.len(), self.catalog.display());

        let commands: CommandsDoc = load_json(&self.commands)?;
        debug!(
            "Loaded {} commands from {}",
            commands.len(),
            self.commands.display()
        );

        let snapshot = self
            .snapshot
            .as_deref()
            .map(load_snapshot)
            .transpose()?;

        let allowed_parts = if self.allow.is_empty() {
            None
        } else {
            Some(self.allow.iter().map(|id| id.trim().to_string()).collect())
        };

        Ok(Inputs {
            catalog,
            commands,
            snapshot,
            allowed_parts,
        })
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let snapshot: Snapshot = load_json(path)?;
    snapshot
        .check()
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    debug!(
        "Loaded snapshot with {} components and {} nets",
        snapshot.components.len(),
        snapshot.nets.len()
    );
    Ok(snapshot)
}
