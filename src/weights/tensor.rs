use serde::{Deserialize, Serialize};

/// Weights of a whole network as the worker streams them.
///
/// `self.0[i][j][k]` is the weight from source unit `k` of layer `i` to
/// destination unit `j` of layer `i + 1`. Transition 0 has one extra source
/// column, the bias, as its last entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTensor(pub Vec<Vec<Vec<f64>>>);

impl WeightTensor {
    pub fn new(weights: Vec<Vec<Vec<f64>>>) -> Self {
        WeightTensor(weights)
    }

    pub fn transitions(&self) -> &[Vec<Vec<f64>>] {
        &self.0
    }

    /// All scalars in `(transition, destination, source)` order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().flatten().flatten().copied()
    }

    pub fn scalar_count(&self) -> usize {
        self.0.iter().flatten().map(Vec::len).sum()
    }

    /// Global `(min, max)` over every scalar, `None` for an empty tensor.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.iter().fold(None, |acc, w| match acc {
            None => Some((w, w)),
            Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
        })
    }
}

impl From<Vec<Vec<Vec<f64>>>> for WeightTensor {
    fn from(weights: Vec<Vec<Vec<f64>>>) -> Self {
        WeightTensor(weights)
    }
}
