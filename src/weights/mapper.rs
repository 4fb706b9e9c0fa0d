use crate::color::{Gradient, WEIGHT_SCALE};
use crate::error::MapError;
use crate::graph::edge::{Edge, EdgeId};
use crate::graph::layout::NodeIndexMatrix;
use crate::weights::tensor::WeightTensor;

/// Min-max normalization over one tensor.
///
/// When every weight is equal there is no range to divide by and every weight
/// sits at the midpoint of the scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub min: f64,
    pub max: f64,
}

impl Normalizer {
    pub fn new(min: f64, max: f64) -> Self {
        Normalizer { min, max }
    }

    pub fn from_tensor(weights: &WeightTensor) -> Option<Self> {
        weights.bounds().map(|(min, max)| Normalizer { min, max })
    }

    pub fn normalize(&self, w: f64) -> f64 {
        let range = self.max - self.min;
        if range == f64::INFINITY {
            // finite bounds whose span overflows f64
            (w / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
        } else if range > 0.0 {
            (w - self.min) / range
        } else {
            0.5
        }
    }
}

/// Checks that `weights` was built for the topology behind `matrix`.
///
/// Runs over the whole tensor before any edge is produced so a stale update
/// is refused as a unit.
pub fn check_shape(weights: &WeightTensor, matrix: &NodeIndexMatrix) -> Result<(), MapError> {
    let expected = matrix.layer_count().saturating_sub(1);
    let transitions = weights.transitions();
    if transitions.len() != expected {
        return Err(MapError::TransitionCount {
            expected,
            found: transitions.len(),
        });
    }

    for (i, transition) in transitions.iter().enumerate() {
        let sources = matrix.width(i).unwrap_or(0);
        let destinations = matrix.width(i + 1).unwrap_or(0);
        if transition.len() != destinations {
            return Err(MapError::DestinationCount {
                transition: i,
                expected: destinations,
                found: transition.len(),
            });
        }
        for (j, row) in transition.iter().enumerate() {
            if row.len() != sources {
                return Err(MapError::SourceCount {
                    transition: i,
                    unit: j,
                    expected: sources,
                    found: row.len(),
                });
            }
            if let Some(k) = row.iter().position(|w| !w.is_finite()) {
                return Err(MapError::NonFinite {
                    transition: i,
                    unit: j,
                    input: k,
                });
            }
        }
    }
    Ok(())
}

/// Colors every edge by its weight, normalized against the global range of
/// the tensor, with the default red-to-green scale.
pub fn map_weights_to_edges(
    weights: &WeightTensor,
    matrix: &NodeIndexMatrix,
    animate: bool,
) -> Result<Vec<Edge>, MapError> {
    map_weights_with(weights, matrix, animate, &WEIGHT_SCALE)
}

/// Same as [`map_weights_to_edges`] with an explicit gradient.
///
/// Edges are emitted per transition, destination-major, with ids from 0.
/// Zero weights still produce an edge.
pub fn map_weights_with(
    weights: &WeightTensor,
    matrix: &NodeIndexMatrix,
    animate: bool,
    scale: &Gradient,
) -> Result<Vec<Edge>, MapError> {
    check_shape(weights, matrix)?;

    let Some(norm) = Normalizer::from_tensor(weights) else {
        return Ok(Vec::new());
    };

    let mut edges = Vec::with_capacity(weights.scalar_count());
    for (i, transition) in weights.transitions().iter().enumerate() {
        for (j, row) in transition.iter().enumerate() {
            for (k, &w) in row.iter().enumerate() {
                let (Some(source), Some(target)) = (matrix.get(i, k), matrix.get(i + 1, j)) else {
                    // check_shape already rejects this; keep the error path anyway.
                    return Err(MapError::SourceCount {
                        transition: i,
                        unit: j,
                        expected: matrix.width(i).unwrap_or(0),
                        found: row.len(),
                    });
                };
                edges.push(Edge {
                    id: EdgeId(edges.len()),
                    source,
                    target,
                    stroke: scale.at(norm.normalize(w)),
                    animated: animate,
                });
            }
        }
    }
    Ok(edges)
}
