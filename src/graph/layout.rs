use std::sync::Arc;

use crate::color::Rgb;
use crate::error::LayoutError;
use crate::graph::edge::{Edge, EdgeId};
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::graph::spec::LayerSpec;

/// x coordinate of the input layer.
pub const LEFT_MARGIN: f64 = 100.0;
/// Horizontal room per unit of the widest layer, before clamping.
pub const X_PER_UNIT: usize = 40;
pub const MIN_LAYER_SPACING: usize = 250;
pub const MAX_LAYER_SPACING: usize = 600;
/// Vertical extent per unit of the widest layer.
pub const Y_PER_UNIT: usize = 100;
/// Widest layer the engine lays out, bias included.
pub const MAX_LAYER_WIDTH: usize = 1024;
pub const MAX_LAYERS: usize = 64;

/// Layer-major lookup from `(layer, unit)` to the node drawn for it.
///
/// Layer 0 includes the bias unit as its last entry. A matrix is never edited
/// after construction; a relayout builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIndexMatrix(Vec<Vec<NodeId>>);

impl NodeIndexMatrix {
    pub fn layer_count(&self) -> usize {
        self.0.len()
    }

    pub fn layer(&self, layer: usize) -> Option<&[NodeId]> {
        self.0.get(layer).map(Vec::as_slice)
    }

    pub fn width(&self, layer: usize) -> Option<usize> {
        self.0.get(layer).map(Vec::len)
    }

    pub fn get(&self, layer: usize, unit: usize) -> Option<NodeId> {
        self.0.get(layer)?.get(unit).copied()
    }

    pub fn layers(&self) -> impl Iterator<Item = &[NodeId]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn dense_edge_count(&self) -> usize {
        self.0.windows(2).map(|pair| pair[0].len() * pair[1].len()).sum()
    }
}

/// One immutable layout snapshot. Nodes and the index matrix always come
/// from the same `compute_layout` call.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    pub layers: LayerSpec,
    pub nodes: Vec<Node>,
    /// White, static skeleton shown until the first weights arrive.
    pub edges: Vec<Edge>,
    pub matrix: NodeIndexMatrix,
}

/// Shared handle to the current snapshot. Replaced, never mutated.
pub type SharedLayout = Arc<GraphLayout>;

/// Horizontal distance between consecutive layers.
pub fn layer_spacing(max_width: usize) -> f64 {
    max_width
        .saturating_mul(X_PER_UNIT)
        .clamp(MIN_LAYER_SPACING, MAX_LAYER_SPACING) as f64
}

/// `n` evenly spaced points from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start; n];
    }
    let span = end - start;
    let last = (n - 1) as f64;
    (0..n).map(|i| start + span * i as f64 / last).collect()
}

/// Refuses specs the engine cannot draw: fewer than two layers, too many
/// layers, zero-width layers and layers wider than [`MAX_LAYER_WIDTH`].
///
/// Runs before any width arithmetic, so every later sum and product stays
/// small.
pub fn check_spec(spec: &LayerSpec) -> Result<(), LayoutError> {
    if spec.len() < 2 {
        return Err(LayoutError::TooFewLayers { found: spec.len() });
    }
    if spec.len() > MAX_LAYERS {
        return Err(LayoutError::TooManyLayers {
            found: spec.len(),
            max: MAX_LAYERS,
        });
    }
    if let Some(layer) = spec.first_zero() {
        return Err(LayoutError::ZeroWidthLayer { layer });
    }
    for (layer, &width) in spec.widths().iter().enumerate() {
        // layer 0 gains the bias unit
        let drawn = if layer == 0 { width.saturating_add(1) } else { width };
        if drawn > MAX_LAYER_WIDTH {
            return Err(LayoutError::LayerTooWide {
                layer,
                width,
                max: MAX_LAYER_WIDTH,
            });
        }
    }
    Ok(())
}

/// Turns a layer spec into positioned nodes, a dense skeleton of edges and
/// the node-index matrix.
///
/// Node ids run from 1 layer by layer, top to bottom; the bias is the last
/// node of layer 0. Each layer of `count` nodes is centred on the tallest one
/// by splitting `max * 100` into `count + 1` gaps and skipping both extremes.
pub fn compute_layout(spec: &LayerSpec) -> Result<GraphLayout, LayoutError> {
    check_spec(spec)?;

    let widths = spec.with_bias();
    let max_width = widths.iter().copied().max().unwrap_or(1);
    let x_step = layer_spacing(max_width);
    let height = (max_width * Y_PER_UNIT) as f64;
    let last_layer = widths.len() - 1;

    let mut nodes = Vec::with_capacity(widths.iter().sum());
    let mut matrix = Vec::with_capacity(widths.len());
    let mut next_id: u32 = 1;

    for (layer, &count) in widths.iter().enumerate() {
        let x = LEFT_MARGIN + layer as f64 * x_step;
        let ys = linspace(0.0, height, count + 2);
        let mut ids = Vec::with_capacity(count);

        for unit in 0..count {
            let kind = match layer {
                0 if unit == count - 1 => NodeKind::Bias,
                0 => NodeKind::Input,
                l if l == last_layer => NodeKind::Output,
                _ => NodeKind::Hidden,
            };
            let id = NodeId(next_id);
            next_id += 1;
            nodes.push(Node::new(id, kind, x, ys[unit + 1]));
            ids.push(id);
        }
        matrix.push(ids);
    }

    let matrix = NodeIndexMatrix(matrix);
    let edges = skeleton_edges(&matrix);
    log::debug!(
        "layout for [{}]: {} nodes, {} edges",
        spec,
        nodes.len(),
        edges.len()
    );

    Ok(GraphLayout {
        layers: spec.clone(),
        nodes,
        edges,
        matrix,
    })
}

/// Dense edges, source-major, before any weights are known.
fn skeleton_edges(matrix: &NodeIndexMatrix) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(matrix.dense_edge_count());
    for pair in matrix.0.windows(2) {
        for &source in &pair[0] {
            for &target in &pair[1] {
                edges.push(Edge {
                    id: EdgeId(edges.len()),
                    source,
                    target,
                    stroke: Rgb::WHITE,
                    animated: false,
                });
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn layout(widths: &[usize]) -> GraphLayout {
        compute_layout(&LayerSpec::new(widths.to_vec())).unwrap()
    }

    #[test]
    fn reference_network_counts() {
        let g = layout(&[3, 2, 5, 3, 1]);
        let per_layer: Vec<usize> = g.matrix.layers().map(|l| l.len()).collect();
        assert_eq!(per_layer, vec![4, 2, 5, 3, 1]);
        assert_eq!(g.nodes.len(), 15);
        assert_eq!(g.edges.len(), 36);
    }

    #[test]
    fn counts_hold_for_assorted_shapes() {
        for widths in [vec![1, 1], vec![2, 7], vec![10, 1, 10], vec![5, 4, 3, 2, 1, 9]] {
            let spec = LayerSpec::new(widths.clone());
            let g = compute_layout(&spec).unwrap();
            let expected_nodes = widths[0] + 1 + widths[1..].iter().sum::<usize>();
            assert_eq!(g.nodes.len(), expected_nodes);
            assert_eq!(g.edges.len(), spec.dense_edge_count());
            assert_eq!(g.edges.len(), g.matrix.dense_edge_count());
        }
    }

    #[test]
    fn ids_are_unique_from_one_in_layer_order() {
        let g = layout(&[3, 2, 5, 3, 1]);
        let ids: Vec<u32> = g.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());

        let flat: Vec<NodeId> = g.matrix.layers().flatten().copied().collect();
        assert_eq!(flat, g.nodes.iter().map(|n| n.id).collect::<Vec<_>>());
        assert_eq!(flat.iter().collect::<HashSet<_>>().len(), flat.len());
    }

    #[test]
    fn bias_closes_the_input_layer() {
        let g = layout(&[3, 2, 1]);
        let kinds: Vec<NodeKind> = g.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Input,
                NodeKind::Input,
                NodeKind::Input,
                NodeKind::Bias,
                NodeKind::Hidden,
                NodeKind::Hidden,
                NodeKind::Output,
            ]
        );
        assert_eq!(g.matrix.get(0, 3), Some(NodeId(4)));
        assert!(g.nodes.iter().all(|n| !n.draggable));
    }

    #[test]
    fn positions_follow_the_grid() {
        let g = layout(&[3, 2, 5, 3, 1]);
        // widest layer is 5, so spacing clamps up to 250 and the span is 500
        let input_ys: Vec<f64> = g.nodes[..4].iter().map(|n| n.position.y).collect();
        assert_eq!(input_ys, vec![100.0, 200.0, 300.0, 400.0]);
        assert!(g.nodes[..4].iter().all(|n| n.position.x == 100.0));

        let output = g.nodes.last().unwrap();
        assert_eq!(output.position.x, 100.0 + 4.0 * 250.0);
        assert_eq!(output.position.y, 250.0);

        for n in &g.nodes {
            assert!(n.position.y > 0.0 && n.position.y < 500.0);
        }
    }

    #[test]
    fn spacing_is_clamped() {
        assert_eq!(layer_spacing(1), 250.0);
        assert_eq!(layer_spacing(10), 400.0);
        assert_eq!(layer_spacing(100), 600.0);
        assert_eq!(layer_spacing(usize::MAX), 600.0);
    }

    #[test]
    fn skeleton_is_source_major_and_white() {
        let g = layout(&[1, 2]);
        // layer 0 = [input 1, bias 2], layer 1 = [3, 4]
        let pairs: Vec<(u32, u32)> = g.edges.iter().map(|e| (e.source.0, e.target.0)).collect();
        assert_eq!(pairs, vec![(1, 3), (1, 4), (2, 3), (2, 4)]);
        assert_eq!(g.edges.iter().map(|e| e.id.0).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(g.edges.iter().all(|e| e.stroke == Rgb::WHITE && !e.animated));
    }

    #[test]
    fn deterministic() {
        assert_eq!(layout(&[4, 6, 2]), layout(&[4, 6, 2]));
    }

    #[test]
    fn rejects_degenerate_specs() {
        assert_eq!(
            compute_layout(&LayerSpec::new(vec![3, 0, 1])),
            Err(LayoutError::ZeroWidthLayer { layer: 1 })
        );
        assert_eq!(
            compute_layout(&LayerSpec::new(vec![3])),
            Err(LayoutError::TooFewLayers { found: 1 })
        );
    }

    #[test]
    fn rejects_oversized_specs() {
        assert_eq!(
            compute_layout(&LayerSpec::new(vec![3, usize::MAX / 20, 1])),
            Err(LayoutError::LayerTooWide {
                layer: 1,
                width: usize::MAX / 20,
                max: MAX_LAYER_WIDTH,
            })
        );
        assert_eq!(
            compute_layout(&LayerSpec::new(vec![usize::MAX, 1])),
            Err(LayoutError::LayerTooWide {
                layer: 0,
                width: usize::MAX,
                max: MAX_LAYER_WIDTH,
            })
        );
        // the bias unit counts against the limit
        assert!(matches!(
            compute_layout(&LayerSpec::new(vec![MAX_LAYER_WIDTH, 1])),
            Err(LayoutError::LayerTooWide { layer: 0, .. })
        ));
        assert!(compute_layout(&LayerSpec::new(vec![MAX_LAYER_WIDTH - 1, MAX_LAYER_WIDTH])).is_ok());
        assert_eq!(
            compute_layout(&LayerSpec::new(vec![1; MAX_LAYERS + 1])),
            Err(LayoutError::TooManyLayers {
                found: MAX_LAYERS + 1,
                max: MAX_LAYERS,
            })
        );
    }
}
