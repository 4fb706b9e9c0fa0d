use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Layer widths of a dense feed-forward network, input first, output last.
///
/// The first entry is the external input width; the bias unit is *not*
/// counted here, the layout engine adds it. A `LayerSpec` may hold zeros while
/// the user is still editing it, `compute_layout` is the one that refuses them.
///
/// Serializes as a bare JSON array (`[3, 2, 5, 3, 1]`), which is what the
/// worker expects in `LayersSet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSpec(Vec<usize>);

impl LayerSpec {
    pub fn new(widths: Vec<usize>) -> Self {
        LayerSpec(widths)
    }

    pub fn widths(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declared input width (without bias).
    pub fn inputs(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn outputs(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Widths as drawn: layer 0 gets one extra unit for the bias.
    pub fn with_bias(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, &w)| if i == 0 { w.saturating_add(1) } else { w })
            .collect()
    }

    /// Number of edges of the fully connected graph, bias edges included.
    pub fn dense_edge_count(&self) -> usize {
        self.with_bias()
            .windows(2)
            .map(|pair| pair[0].saturating_mul(pair[1]))
            .fold(0, usize::saturating_add)
    }

    /// Index of the first zero-width layer, if any.
    pub fn first_zero(&self) -> Option<usize> {
        self.0.iter().position(|&w| w == 0)
    }
}

impl Default for LayerSpec {
    fn default() -> Self {
        LayerSpec(vec![3, 2, 5, 3, 1])
    }
}

impl From<Vec<usize>> for LayerSpec {
    fn from(widths: Vec<usize>) -> Self {
        LayerSpec(widths)
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|w| w.to_string()).collect();
        f.write_str(&parts.join(", "))
    }
}

impl FromStr for LayerSpec {
    type Err = ConfigError;

    /// Parses `"3, 2, 5, 3, 1"`. Whitespace around entries is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let widths = s
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::Layers { value: s.to_owned() })?;
        Ok(LayerSpec(widths))
    }
}
