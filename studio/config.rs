use std::env;

use log::warn;
use netviz::{Hyperparams, LayerSpec};

pub const ADDR_VAR: &str = "NETVIZ_ADDR";
pub const DEFAULT_ADDR: &str = "127.0.0.1:7878";

/// Start-up settings for the studio binary.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub addr:        String,
    pub layers:      LayerSpec,
    pub hyperparams: Hyperparams,
}

impl StudioConfig {
    /// Reads the bind address from the environment; everything else starts
    /// at its defaults.
    pub fn from_env() -> Self {
        let addr = match env::var(ADDR_VAR) {
            Ok(addr) if !addr.trim().is_empty() => addr.trim().to_owned(),
            Ok(_) => DEFAULT_ADDR.to_owned(),
            Err(env::VarError::NotPresent) => DEFAULT_ADDR.to_owned(),
            Err(e) => {
                warn!("ignoring {ADDR_VAR}: {e}");
                DEFAULT_ADDR.to_owned()
            }
        };
        StudioConfig {
            addr,
            layers:      LayerSpec::default(),
            hyperparams: Hyperparams::default(),
        }
    }
}
