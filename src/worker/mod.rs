//! Reference training worker.
//!
//! Runs on its own thread and talks to the session only through the typed
//! message channels in [`crate::protocol`]; nothing is shared between the two
//! sides.

pub mod network;
pub mod runner;

pub use network::FeedForward;
pub use runner::{run, spawn, WorkerHandle};
