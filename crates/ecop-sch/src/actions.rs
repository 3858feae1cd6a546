//! Actions IR: flat, executor-ready operations.
//!
//! Wire shape: `{"actions": [{"type": "ADD", "cmd": "...", "refdes": "R1"}, ...]}`.
//! Action tags are upper-case and distinct from the lower-case command ops;
//! downstream tooling switches on them literally. The list order is the
//! execution order.

use serde::{Deserialize, Serialize};

use crate::position::{Layer, Placement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Add {
        /// Catalog `fusion_add` directive, passed through verbatim.
        #[serde(rename = "cmd")]
        directive: String,
        refdes: String,
    },
    SetValue {
        refdes: String,
        value: String,
    },
    Place {
        refdes: String,
        x: f64,
        y: f64,
        rotation: f64,
        layer: Layer,
    },
    Connect {
        refdes: String,
        pin: String,
        net_name: String,
    },
    Disconnect {
        refdes: String,
        pin: String,
        net_name: String,
    },
    RenameNet {
        from: String,
        to: String,
    },
    Remove {
        refdes: String,
    },
}

impl Action {
    /// The wire `type` tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Add { .. } => "ADD",
            Action::SetValue { .. } => "SET_VALUE",
            Action::Place { .. } => "PLACE",
            Action::Connect { .. } => "CONNECT",
            Action::Disconnect { .. } => "DISCONNECT",
            Action::RenameNet { .. } => "RENAME_NET",
            Action::Remove { .. } => "REMOVE",
        }
    }

    pub fn place(refdes: impl Into<String>, placement: Placement) -> Self {
        Action::Place {
            refdes: refdes.into(),
            x: placement.x,
            y: placement.y,
            rotation: placement.rotation,
            layer: placement.layer,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Add { directive, refdes } => write!(f, "ADD {refdes} <- {directive}"),
            Action::SetValue { refdes, value } => write!(f, "SET_VALUE {refdes} = {value}"),
            Action::Place {
                refdes,
                x,
                y,
                rotation,
                layer,
            } => write!(f, "PLACE {refdes} at ({x}, {y}) rot={rotation} {layer}"),
            Action::Connect {
                refdes,
                pin,
                net_name,
            } => write!(f, "CONNECT {refdes}.{pin} -> {net_name}"),
            Action::Disconnect {
                refdes,
                pin,
                net_name,
            } => write!(f, "DISCONNECT {refdes}.{pin} -x {net_name}"),
            Action::RenameNet { from, to } => write!(f, "RENAME_NET {from} -> {to}"),
            Action::Remove { refdes } => write!(f, "REMOVE {refdes}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsDoc {
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ActionsDoc {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Wire tags in execution order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.actions.iter().map(Action::tag).collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
