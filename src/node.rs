//! Specification model — the public, serialized shape of every documented symbol.
//!
//! Nodes carry only their own documentation plus the four children
//! containers. Identity and nesting bookkeeping lives in
//! [`crate::collect::Bookkeeping`] and never reaches the output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Children container keyed by local name.
pub type Children = BTreeMap<String, Node>;

/// Category of a specification node or of a value's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Class,
    Interface,
    Namespace,
    Function,
    Event,
    #[default]
    Object,
    String,
    Number,
    Boolean,
    Array,
    Any,
    Union,
    /// A named type that is not a primitive; the name is in `type`.
    Ref,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Namespace => "namespace",
            NodeKind::Function => "function",
            NodeKind::Event => "event",
            NodeKind::Object => "object",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Array => "array",
            NodeKind::Any => "any",
            NodeKind::Union => "union",
            NodeKind::Ref => "ref",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which children container of a parent a node is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Container {
    Entries,
    StaticEntries,
    Events,
    Definitions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Availability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

/// A specification node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    /// Referenced type name when `kind` is `ref`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Union members or array element types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub variable: bool,
    #[serde(rename = "async", skip_serializing_if = "is_false")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub generator: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<Box<Node>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emits: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<String>,

    #[serde(skip_serializing_if = "Children::is_empty")]
    pub entries: Children,
    #[serde(skip_serializing_if = "Children::is_empty")]
    pub static_entries: Children,
    #[serde(skip_serializing_if = "Children::is_empty")]
    pub events: Children,
    #[serde(skip_serializing_if = "Children::is_empty")]
    pub definitions: Children,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            ..Default::default()
        }
    }

    pub fn children(&self, container: Container) -> &Children {
        match container {
            Container::Entries => &self.entries,
            Container::StaticEntries => &self.static_entries,
            Container::Events => &self.events,
            Container::Definitions => &self.definitions,
        }
    }

    pub fn children_mut(&mut self, container: Container) -> &mut Children {
        match container {
            Container::Entries => &mut self.entries,
            Container::StaticEntries => &mut self.static_entries,
            Container::Events => &mut self.events,
            Container::Definitions => &mut self.definitions,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
