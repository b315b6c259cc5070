//! Linear solves: A x = b via LU with partial pivoting.

use crate::Float;

use super::Matrix;

/// The matrix has a zero pivot and cannot be factored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingularMatrix;

/// LU factors of a [`Matrix`] with the row permutation applied.
///
/// The implicit integrators reuse one factorization for every Newton
/// iteration of a step.
#[derive(Clone, Debug)]
pub struct Lu {
    n: usize,
    // unit lower triangle below the diagonal, upper triangle on and above it
    a: Vec<Float>,
    perm: Vec<usize>,
}

impl Matrix {
    pub fn lu(&self) -> Result<Lu, SingularMatrix> {
        let n = self.n;
        let mut a = self.data.clone();
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // pivot
            let mut pivot_row = k;
            let mut pivot_val = a[k * n + k].abs();
            for i in (k + 1)..n {
                let val = a[i * n + k].abs();
                if val > pivot_val {
                    pivot_val = val;
                    pivot_row = i;
                }
            }
            if pivot_val == 0.0 || !pivot_val.is_finite() {
                return Err(SingularMatrix);
            }
            if pivot_row != k {
                for j in 0..n {
                    a.swap(k * n + j, pivot_row * n + j);
                }
                perm.swap(k, pivot_row);
            }
            let akk = a[k * n + k];
            for i in (k + 1)..n {
                let factor = a[i * n + k] / akk;
                a[i * n + k] = factor;
                for j in (k + 1)..n {
                    a[i * n + j] -= factor * a[k * n + j];
                }
            }
        }

        Ok(Lu { n, a, perm })
    }
}

impl Lu {
    /// In-place solve: overwrites `b` with `x`.
    pub fn solve_mut(&self, b: &mut [Float]) {
        let n = self.n;
        debug_assert_eq!(b.len(), n, "dimension mismatch in solve");

        let pb: Vec<Float> = self.perm.iter().map(|&p| b[p]).collect();
        b.copy_from_slice(&pb);

        // Forward solve Ly = Pb
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= self.a[i * n + k] * b[k];
            }
            b[i] = sum;
        }
        // Backward solve Ux = y
        for i in (0..n).rev() {
            let mut sum = b[i];
            for k in (i + 1)..n {
                sum -= self.a[i * n + k] * b[k];
            }
            b[i] = sum / self.a[i * n + i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solve_full_2x2() {
        // [[3, 2], [1, 4]] x = [5, 6] => x = [0.8, 1.3]
        let mut a = Matrix::zeros(2);
        a[(0, 0)] = 3.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 4.0;
        let mut x = [5.0, 6.0];
        a.lu().unwrap().solve_mut(&mut x);
        assert_abs_diff_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.3, epsilon = 1e-12);
    }

    #[test]
    fn pivoting_handles_zero_diagonal() {
        // [[0, 1], [2, 0]] x = [3, 4] => x = [2, 3]
        let mut a = Matrix::zeros(2);
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 2.0;
        let lu = a.lu().unwrap();
        let mut b = [3.0, 4.0];
        lu.solve_mut(&mut b);
        assert_abs_diff_eq!(b[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b[1], 3.0, epsilon = 1e-12);

        // the factors are reusable
        let mut b = [1.0, 0.0];
        lu.solve_mut(&mut b);
        assert_abs_diff_eq!(b[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_is_reported() {
        let mut a = Matrix::zeros(3);
        a[(0, 0)] = 1.0;
        a[(1, 1)] = 1.0;
        assert_eq!(a.lu().err(), Some(SingularMatrix));
    }
}
