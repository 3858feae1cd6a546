//! Commands IR: the requested edit, as produced upstream.
//!
//! Wire shape: `{"commands": [{"op": "connect", "args": {...}}, ...]}`.
//! Document order is meaningful input but is not assumed to respect
//! dependencies; the compiler re-orders.

use serde::{Deserialize, Serialize};

use crate::position::Layer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddComponentArgs {
    pub part_id: String,
    pub refdes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefdesArgs {
    pub refdes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNetArgs {
    pub net_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameNetArgs {
    pub from: String,
    pub to: String,
}

/// Shared by `connect` and `disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinNetArgs {
    pub refdes: String,
    pub pin: String,
    pub net_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetValueArgs {
    pub refdes: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceComponentArgs {
    pub refdes: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceNearArgs {
    pub refdes: String,
    pub anchor_refdes: String,
    pub dx: f64,
    pub dy: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentArgs {
    pub text: String,
}

/// One requested edit operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Command {
    AddComponent(AddComponentArgs),
    RemoveComponent(RefdesArgs),
    CreateNet(CreateNetArgs),
    RenameNet(RenameNetArgs),
    Connect(PinNetArgs),
    Disconnect(PinNetArgs),
    SetValue(SetValueArgs),
    PlaceComponent(PlaceComponentArgs),
    PlaceNear(PlaceNearArgs),
    Comment(CommentArgs),
}

impl Command {
    /// The wire `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            Command::AddComponent(_) => "add_component",
            Command::RemoveComponent(_) => "remove_component",
            Command::CreateNet(_) => "create_net",
            Command::RenameNet(_) => "rename_net",
            Command::Connect(_) => "connect",
            Command::Disconnect(_) => "disconnect",
            Command::SetValue(_) => "set_value",
            Command::PlaceComponent(_) => "place_component",
            Command::PlaceNear(_) => "place_near",
            Command::Comment(_) => "comment",
        }
    }

    pub fn add_component(part_id: impl Into<String>, refdes: impl Into<String>) -> Self {
        Command::AddComponent(AddComponentArgs {
            part_id: part_id.into(),
            refdes: refdes.into(),
        })
    }

    pub fn remove_component(refdes: impl Into<String>) -> Self {
        Command::RemoveComponent(RefdesArgs {
            refdes: refdes.into(),
        })
    }

    pub fn create_net(net_name: impl Into<String>) -> Self {
        Command::CreateNet(CreateNetArgs {
            net_name: net_name.into(),
        })
    }

    pub fn rename_net(from: impl Into<String>, to: impl Into<String>) -> Self {
        Command::RenameNet(RenameNetArgs {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn connect(
        refdes: impl Into<String>,
        pin: impl Into<String>,
        net_name: impl Into<String>,
    ) -> Self {
        Command::Connect(PinNetArgs {
            refdes: refdes.into(),
            pin: pin.into(),
            net_name: net_name.into(),
        })
    }

    pub fn disconnect(
        refdes: impl Into<String>,
        pin: impl Into<String>,
        net_name: impl Into<String>,
    ) -> Self {
        Command::Disconnect(PinNetArgs {
            refdes: refdes.into(),
            pin: pin.into(),
            net_name: net_name.into(),
        })
    }

    pub fn set_value(refdes: impl Into<String>, value: impl Into<String>) -> Self {
        Command::SetValue(SetValueArgs {
            refdes: refdes.into(),
            value: value.into(),
        })
    }

    pub fn place_component(refdes: impl Into<String>, x: f64, y: f64) -> Self {
        Command::PlaceComponent(PlaceComponentArgs {
            refdes: refdes.into(),
            x,
            y,
            rotation: 0.0,
            layer: Layer::Top,
        })
    }

    pub fn place_near(
        refdes: impl Into<String>,
        anchor_refdes: impl Into<String>,
        dx: f64,
        dy: f64,
    ) -> Self {
        Command::PlaceNear(PlaceNearArgs {
            refdes: refdes.into(),
            anchor_refdes: anchor_refdes.into(),
            dx,
            dy,
            rotation: 0.0,
            layer: Layer::Top,
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Command::Comment(CommentArgs { text: text.into() })
    }
}

/// Complete command list for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandsDoc {
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl CommandsDoc {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for CommandsDoc {
    fn from_iter<T: IntoIterator<Item = Command>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
