pub mod edge;
pub mod layout;
pub mod node;
pub mod spec;

pub use edge::{Edge, EdgeId};
pub use layout::{check_spec, compute_layout, GraphLayout, NodeIndexMatrix, SharedLayout};
pub use node::{Node, NodeId, NodeKind, Position};
pub use spec::LayerSpec;
