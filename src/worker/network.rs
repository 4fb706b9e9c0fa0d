use rand::Rng;

use crate::graph::LayerSpec;
use crate::math::Matrix;
use crate::weights::WeightTensor;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid MLP laid out exactly like a `WeightTensor`.
///
/// `weights[i]` is `|layer i+1| × |layer i|`, with one extra bias column in
/// transition 0 only: the input vector is extended with a constant `1.0` and
/// every later layer has no bias of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForward {
    layers: LayerSpec,
    weights: Vec<Matrix>,
}

impl FeedForward {
    pub fn new(layers: &LayerSpec) -> FeedForward {
        FeedForward::new_with(layers, &mut rand::thread_rng())
    }

    pub fn new_with<R: Rng + ?Sized>(layers: &LayerSpec, rng: &mut R) -> FeedForward {
        let widths = layers.with_bias();
        let weights = widths
            .windows(2)
            .map(|pair| Matrix::random_with(pair[1], pair[0], rng))
            .collect();
        FeedForward {
            layers: layers.clone(),
            weights,
        }
    }

    pub fn layers(&self) -> &LayerSpec {
        &self.layers
    }

    /// Activations of every layer, input (with bias) first.
    fn activations(&self, input: &[f64]) -> Vec<Vec<f64>> {
        let mut current = Vec::with_capacity(input.len() + 1);
        current.extend_from_slice(input);
        current.push(1.0);

        let mut all = Vec::with_capacity(self.weights.len() + 1);
        for w in &self.weights {
            let next: Vec<f64> = w.mul_vec(&current).into_iter().map(sigmoid).collect();
            all.push(current);
            current = next;
        }
        all.push(current);
        all
    }

    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.activations(input).pop().unwrap_or_default()
    }

    /// One SGD step on squared error. Returns the sample's mean squared error
    /// before the step.
    pub fn train_sample(&mut self, input: &[f64], target: &[f64], learning_rate: f64) -> f64 {
        let acts = self.activations(input);
        let Some(output) = acts.last() else {
            return 0.0;
        };

        let mut loss = 0.0;
        // δ = ∂L/∂z for the output layer, with σ'(z) = a(1 - a)
        let mut delta: Vec<f64> = output
            .iter()
            .zip(target)
            .map(|(&a, &y)| {
                loss += (a - y).powi(2);
                (a - y) * a * (1.0 - a)
            })
            .collect();
        loss /= output.len().max(1) as f64;

        for i in (0..self.weights.len()).rev() {
            let prev = &acts[i];
            let back = if i > 0 {
                let propagated = self.weights[i].transpose_mul_vec(&delta);
                Some(
                    propagated
                        .iter()
                        .zip(prev)
                        .map(|(&d, &a)| d * a * (1.0 - a))
                        .collect::<Vec<f64>>(),
                )
            } else {
                None
            };
            self.weights[i].sub_outer(&delta, prev, learning_rate);
            if let Some(back) = back {
                delta = back;
            }
        }
        loss
    }

    /// Mean squared error over a data set, without updating anything.
    pub fn mean_error<'a, I>(&self, samples: I) -> f64
    where
        I: IntoIterator<Item = (&'a [f64], &'a [f64])>,
    {
        let mut total = 0.0;
        let mut n = 0usize;
        for (input, target) in samples {
            let out = self.predict(input);
            let err: f64 = out.iter().zip(target).map(|(a, y)| (a - y).powi(2)).sum();
            total += err / out.len().max(1) as f64;
            n += 1;
        }
        if n == 0 {
            0.0
        } else {
            total / n as f64
        }
    }

    /// Snapshot of the weights in wire layout.
    pub fn to_tensor(&self) -> WeightTensor {
        WeightTensor::new(self.weights.iter().map(|m| m.data.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::compute_layout;
    use crate::weights::check_shape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn tensor_fits_the_layout() {
        let spec = LayerSpec::new(vec![3, 2, 5, 3, 1]);
        let net = FeedForward::new(&spec);
        let layout = compute_layout(&spec).unwrap();
        assert_eq!(check_shape(&net.to_tensor(), &layout.matrix), Ok(()));
        assert_eq!(net.to_tensor().scalar_count(), 36);
    }

    #[test]
    fn output_width_and_range() {
        let net = FeedForward::new(&LayerSpec::new(vec![2, 4, 3]));
        let out = net.predict(&[0.3, -0.7]);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|&y| y > 0.0 && y < 1.0));
    }

    #[test]
    fn learns_or() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut net = FeedForward::new_with(&LayerSpec::new(vec![2, 3, 1]), &mut rng);
        let data: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (vec![0.0, 0.0], vec![0.0]),
            (vec![0.0, 1.0], vec![1.0]),
            (vec![1.0, 0.0], vec![1.0]),
            (vec![1.0, 1.0], vec![1.0]),
        ];
        let pairs = || data.iter().map(|(x, y)| (x.as_slice(), y.as_slice()));

        let before = net.mean_error(pairs());
        for _ in 0..5_000 {
            for (x, y) in pairs() {
                net.train_sample(x, y, 0.5);
            }
        }
        let after = net.mean_error(pairs());
        assert!(after < before, "error went from {before} to {after}");
    }
}
