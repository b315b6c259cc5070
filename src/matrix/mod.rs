//! Dense square matrices for the implicit integrators.

mod linear;

use std::ops::{Index, IndexMut};

use crate::Float;

pub use linear::{Lu, SingularMatrix};

/// Row-major `n x n` matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<Float>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Float;

    fn index(&self, (r, c): (usize, usize)) -> &Float {
        &self.data[r * self.n + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut Float {
        &mut self.data[r * self.n + c]
    }
}
