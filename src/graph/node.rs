use std::fmt;

use serde::{Serialize, Serializer};

/// Node identifier. Positive, assigned from 1 on every relayout, rendered as
/// a decimal string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Input,
    Bias,
    Hidden,
    Output,
}

/// Position in layout space; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A drawn unit. Nodes are never draggable: the topology is computed, not
/// arranged by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub draggable: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, x: f64, y: f64) -> Self {
        Node {
            id,
            kind,
            position: Position { x, y },
            draggable: false,
        }
    }
}
