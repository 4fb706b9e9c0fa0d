use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const LEARNING_RATE_LIMITS: RangeInclusive<f64> = 0.01..=0.5;
pub const TRAINING_SPEED_LIMITS: RangeInclusive<u32> = 1..=100_000;

/// Training knobs pushed to the worker with every `ValuesUpdate`.
///
/// Kept apart from the `LayerSpec`: these may change while a run is in
/// progress, the topology may not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparams {
    pub learning_rate: f64,
    /// SGD steps the worker runs between two progress updates.
    pub training_speed: u32,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Hyperparams {
            learning_rate: 0.1,
            training_speed: 100_000,
        }
    }
}

/// Parses a learning rate typed by the user. Must be finite and inside
/// [`LEARNING_RATE_LIMITS`].
pub fn parse_learning_rate(text: &str) -> Result<f64, ConfigError> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && LEARNING_RATE_LIMITS.contains(&v) => Ok(v),
        _ => Err(ConfigError::LearningRate {
            value: text.to_owned(),
        }),
    }
}

/// Parses a training speed typed by the user. Integral floats (`"100.0"`)
/// are accepted; fractions are not.
pub fn parse_training_speed(text: &str) -> Result<u32, ConfigError> {
    let reject = || ConfigError::TrainingSpeed {
        value: text.to_owned(),
    };
    let v = text.trim().parse::<f64>().map_err(|_| reject())?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(reject());
    }
    let (lo, hi) = (*TRAINING_SPEED_LIMITS.start(), *TRAINING_SPEED_LIMITS.end());
    if v < lo as f64 || v > hi as f64 {
        return Err(reject());
    }
    Ok(v as u32)
}
