use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Dense row-major matrix. Rows are destination units, columns source units,
/// which is the layout the worker streams weights in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Uniform samples in `[-1, 1)`.
    pub fn random(rows: usize, cols: usize) -> Matrix {
        Matrix::random_with(rows, cols, &mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }
        res
    }

    /// Wraps row data as-is. Rows must all have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, Vec::len),
            data,
        }
    }

    /// `self · v`. `v` must have `cols` entries.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        self.data
            .iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// `selfᵀ · v`. `v` must have `rows` entries.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        let mut out = vec![0.0; self.cols];
        for (row, &d) in self.data.iter().zip(v) {
            for (o, w) in out.iter_mut().zip(row) {
                *o += w * d;
            }
        }
        out
    }

    /// `self -= scale · (u ⊗ v)`; one SGD step on a dense layer.
    pub fn sub_outer(&mut self, u: &[f64], v: &[f64], scale: f64) {
        for (row, &ui) in self.data.iter_mut().zip(u) {
            for (w, &vj) in row.iter_mut().zip(v) {
                *w -= scale * ui * vj;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.mul_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(m.transpose_mul_vec(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
    }

    #[test]
    fn outer_update() {
        let mut m = Matrix::zeros(2, 2);
        m.sub_outer(&[1.0, 2.0], &[3.0, 4.0], 0.5);
        assert_eq!(m.data, vec![vec![-1.5, -2.0], vec![-3.0, -4.0]]);
    }

    #[test]
    fn random_is_bounded() {
        let m = Matrix::random(4, 5);
        assert!(m.data.iter().flatten().all(|&x| (-1.0..1.0).contains(&x)));
        assert_eq!((m.rows, m.cols), (4, 5));
    }
}
