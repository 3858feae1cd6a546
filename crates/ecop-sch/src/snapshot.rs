//! Read-only view of the schematic as it exists now.
//!
//! The snapshot format is produced by an external exporter that grows new
//! fields over time. Unknown fields are kept in `extra` so they survive a
//! load/save cycle instead of being silently dropped.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::position::Placement;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot contains duplicate refdes '{0}'")]
    DuplicateRefdes(String),

    #[error("Snapshot contains duplicate net '{0}'")]
    DuplicateNet(String),
}

/// Pin-to-net connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConnection {
    pub refdes: String,
    pub pin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotComponent {
    pub refdes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub pins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    /// Exporter fields this model does not know about.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SnapshotComponent {
    pub fn new(refdes: impl Into<String>) -> Self {
        Self {
            refdes: refdes.into(),
            part_id: None,
            value: None,
            pins: Vec::new(),
            placement: None,
            extra: BTreeMap::new(),
        }
    }

    /// `false` when the exporter reported no pins for this component.
    pub fn has_pin_info(&self) -> bool {
        !self.pins.is_empty()
    }

    pub fn has_pin(&self, pin: &str) -> bool {
        self.pins.iter().any(|p| p == pin)
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNet {
    pub net_name: String,
    #[serde(default)]
    pub connections: Vec<NetConnection>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SnapshotNet {
    pub fn new(net_name: impl Into<String>) -> Self {
        Self {
            net_name: net_name.into(),
            connections: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn is_connected(&self, refdes: &str, pin: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.refdes == refdes && c.pin == pin)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub components: Vec<SnapshotComponent>,
    #[serde(default)]
    pub nets: Vec<SnapshotNet>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Parse a snapshot and check its uniqueness invariants.
    pub fn from_json_str(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// Check that refdes and net names are unique.
    pub fn check(&self) -> Result<(), SnapshotError> {
        let mut seen = BTreeSet::new();
        for component in &self.components {
            if !seen.insert(component.refdes.as_str()) {
                return Err(SnapshotError::DuplicateRefdes(component.refdes.clone()));
            }
        }
        let mut seen = BTreeSet::new();
        for net in &self.nets {
            if !seen.insert(net.net_name.as_str()) {
                return Err(SnapshotError::DuplicateNet(net.net_name.clone()));
            }
        }
        Ok(())
    }

    pub fn component(&self, refdes: &str) -> Option<&SnapshotComponent> {
        self.components.iter().find(|c| c.refdes == refdes)
    }

    pub fn net_names(&self) -> BTreeSet<&str> {
        self.nets.iter().map(|n| n.net_name.as_str()).collect()
    }
}
