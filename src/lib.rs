pub mod color;
pub mod config;
pub mod error;
pub mod files;
pub mod graph;
pub mod math;
pub mod protocol;
pub mod session;
pub mod weights;
pub mod worker;

// Convenience re-exports
pub use color::{Gradient, Rgb};
pub use config::Hyperparams;
pub use error::{ConfigError, FileError, LayoutError, MapError, SessionError};
pub use graph::{compute_layout, Edge, GraphLayout, LayerSpec, Node, NodeIndexMatrix};
pub use protocol::{ErrorCode, InboundMessage, OutboundMessage};
pub use session::{Notice, Session, SessionState};
pub use weights::{map_weights_to_edges, WeightTensor};
