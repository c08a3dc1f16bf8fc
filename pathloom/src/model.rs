//! The immutable graph document.
//!
//! A [`Graph`] is a named list of [`Node`]s; edges are implicit, carried as
//! integer [`EdgeId`]s on node ports. Whether an id names a control or a data
//! path is fixed by the port that owns it. The model performs no validation
//! beyond what execution requires; a validator in front of the catalog is
//! expected to reject cyclic data wiring and duplicate ids.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{MathOp, Value};

/// Identifies one path within a graph. Opaque; unique per graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EdgeId {
    fn from(raw: u32) -> Self {
        EdgeId(raw)
    }
}

/// A named, immutable dataflow document.
///
/// Shared read-only (`Arc<Graph>`) between concurrent scopes; names compare
/// case-insensitively at the catalog boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    name: String,
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            nodes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Outgoing control ids of every entry node, in document order.
    pub fn entries(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Entry { out } => Some(*out),
            _ => None,
        })
    }
}

/// The closed set of built-in node kinds.
///
/// Open extensibility is through the executor registry, not through new
/// variants: a custom executor may claim any kind ahead of the built-in one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    /// Graph entry point: one outgoing control id, no inputs.
    Entry { out: EdgeId },

    /// Eager dispatch. On control `input`: pull `key`, find the arm whose
    /// key equals the pulled value, invoke its control id; otherwise invoke
    /// `fallback`. Arm keys are unique by document invariant.
    Branch {
        input: EdgeId,
        key: EdgeId,
        arms: Vec<(Value, EdgeId)>,
        fallback: EdgeId,
    },

    /// Lazy dispatch. The producer on `out` pulls `key`, picks the matching
    /// data source (or `fallback`) and forwards its pull. No caching.
    Select {
        key: EdgeId,
        sources: Vec<(Value, EdgeId)>,
        fallback: EdgeId,
        out: EdgeId,
    },

    /// Map minus one key. The input map is observably unchanged.
    #[serde(rename = "Map.Remove")]
    MapRemove { map: EdgeId, key: EdgeId, out: EdgeId },

    /// Map with one key bound to a pulled value; same non-mutating
    /// discipline as `Map.Remove`.
    #[serde(rename = "Map.Put")]
    MapPut {
        map: EdgeId,
        key: EdgeId,
        value: EdgeId,
        out: EdgeId,
    },

    /// Binary arithmetic with numeric widening.
    Math {
        op: MathOp,
        lhs: EdgeId,
        rhs: EdgeId,
        out: EdgeId,
    },

    /// Constant data source.
    Literal { value: Value, out: EdgeId },

    /// Control-triggered sink: on `input`, pull `value` and record it on the
    /// scope's probe sink under `label`.
    Probe {
        input: EdgeId,
        value: EdgeId,
        label: String,
    },
}

/// Kind names handled by the built-in executor set, in discovery order.
pub const BUILTIN_KINDS: &[&str] = &[
    "Entry",
    "Branch",
    "Select",
    "Map.Remove",
    "Map.Put",
    "Math",
    "Literal",
    "Probe",
];

impl Node {
    /// Kind name used in diagnostics and the spec document.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Entry { .. } => "Entry",
            Node::Branch { .. } => "Branch",
            Node::Select { .. } => "Select",
            Node::MapRemove { .. } => "Map.Remove",
            Node::MapPut { .. } => "Map.Put",
            Node::Math { .. } => "Math",
            Node::Literal { .. } => "Literal",
            Node::Probe { .. } => "Probe",
        }
    }

    /// Control ids this node reads (declares bodies on).
    pub fn control_inputs(&self) -> Vec<EdgeId> {
        match self {
            Node::Branch { input, .. } | Node::Probe { input, .. } => vec![*input],
            _ => vec![],
        }
    }

    /// Control ids this node writes (invokes).
    pub fn control_outputs(&self) -> Vec<EdgeId> {
        match self {
            Node::Entry { out } => vec![*out],
            Node::Branch { arms, fallback, .. } => {
                let mut ids: Vec<EdgeId> = arms.iter().map(|(_, id)| *id).collect();
                ids.push(*fallback);
                ids
            }
            _ => vec![],
        }
    }

    /// Data ids this node pulls.
    pub fn data_inputs(&self) -> Vec<EdgeId> {
        match self {
            Node::Branch { key, .. } => vec![*key],
            Node::Select {
                key,
                sources,
                fallback,
                ..
            } => {
                let mut ids = vec![*key];
                ids.extend(sources.iter().map(|(_, id)| *id));
                ids.push(*fallback);
                ids
            }
            Node::MapRemove { map, key, .. } => vec![*map, *key],
            Node::MapPut {
                map, key, value, ..
            } => vec![*map, *key, *value],
            Node::Math { lhs, rhs, .. } => vec![*lhs, *rhs],
            Node::Probe { value, .. } => vec![*value],
            _ => vec![],
        }
    }

    /// Data ids this node binds producers on.
    pub fn data_outputs(&self) -> Vec<EdgeId> {
        match self {
            Node::Select { out, .. }
            | Node::MapRemove { out, .. }
            | Node::MapPut { out, .. }
            | Node::Math { out, .. }
            | Node::Literal { out, .. } => vec![*out],
            _ => vec![],
        }
    }
}
