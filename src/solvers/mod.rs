//! Linear solver adapters.
//!
//! An [`Equation`](crate::algs::equation::Equation) hands its assembled CSR
//! matrix, right-hand side and initial guess to a [`LinearSolver`] and gets a
//! [`Solution`] back. Failures surface as [`FvmError::SolveFailure`].

pub mod gauss_seidel;
pub mod lu;
pub mod pcg;

pub use gauss_seidel::LinearGaussSeidelSolver;
pub use lu::LinearLUSolver;
pub use pcg::LinearPCGSolver;

use crate::fvm_error::{FvmError, ensure_len};
use serde::{Deserialize, Serialize};
use sprs::CsMat;

/// Convergence settings shared by every solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Target for `‖b − Ax‖ / ‖b‖` (absolute when `b = 0`).
    pub tolerance: f64,
    /// Iteration cap; for LU, the number of refinement sweeps.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

/// Solver output.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub values: Vec<f64>,
    pub iterations: usize,
    /// Relative residual of `values`.
    pub residual: f64,
}

/// Solves `A x = b` for a square sparse `A`.
pub trait LinearSolver {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    fn config(&self) -> &SolverConfig;

    /// Solve starting from `guess`.
    fn solve(&self, matrix: &CsMat<f64>, rhs: &[f64], guess: &[f64]) -> Result<Solution, FvmError>;
}

/// Check that `matrix` is square and matches `rhs` and `guess`.
pub(crate) fn check_dimensions(
    matrix: &CsMat<f64>,
    rhs: &[f64],
    guess: &[f64],
) -> Result<(), FvmError> {
    ensure_len("matrix columns", matrix.rows(), matrix.cols())?;
    ensure_len("right-hand side", matrix.rows(), rhs.len())?;
    ensure_len("initial guess", matrix.rows(), guess.len())
}

/// `y = A x` for a CSR or CSC matrix.
pub(crate) fn spmv(matrix: &CsMat<f64>, x: &[f64], y: &mut [f64]) {
    y.iter_mut().for_each(|v| *v = 0.0);
    if matrix.is_csr() {
        for (row, vec) in matrix.outer_iterator().enumerate() {
            y[row] = vec.iter().map(|(col, &a)| a * x[col]).sum();
        }
    } else {
        for (col, vec) in matrix.outer_iterator().enumerate() {
            for (row, &a) in vec.iter() {
                y[row] += a * x[col];
            }
        }
    }
}

#[inline]
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
pub(crate) fn l2_norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Denominator turning residual norms into relative ones.
#[inline]
pub(crate) fn residual_scale(rhs: &[f64]) -> f64 {
    let b = l2_norm(rhs);
    if b > 0.0 { b } else { 1.0 }
}

/// `‖b − Ax‖ / ‖b‖`.
pub fn relative_residual(matrix: &CsMat<f64>, rhs: &[f64], x: &[f64]) -> f64 {
    let mut ax = vec![0.0; rhs.len()];
    spmv(matrix, x, &mut ax);
    let r: f64 = rhs
        .iter()
        .zip(&ax)
        .map(|(b, a)| (b - a) * (b - a))
        .sum::<f64>()
        .sqrt();
    r / residual_scale(rhs)
}

/// Jacobi preconditioner weights `1 / a_ii`, with `1` for empty diagonals.
pub(crate) fn inverse_diagonal(matrix: &CsMat<f64>) -> Vec<f64> {
    let mut diag = vec![0.0; matrix.rows()];
    for (&a, (row, col)) in matrix.iter() {
        if row == col {
            diag[row] += a;
        }
    }
    diag.into_iter()
        .map(|d| if d.abs() > 1e-300 { 1.0 / d } else { 1.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprs::TriMat;

    pub(crate) fn tridiagonal(n: usize) -> CsMat<f64> {
        let mut tri = TriMat::new((n, n));
        for i in 0..n {
            tri.add_triplet(i, i, 2.0);
            if i > 0 {
                tri.add_triplet(i, i - 1, -1.0);
            }
            if i + 1 < n {
                tri.add_triplet(i, i + 1, -1.0);
            }
        }
        tri.to_csr()
    }

    #[test]
    fn spmv_matches_csc() {
        let a = tridiagonal(4);
        let x = [1.0, 2.0, 3.0, 4.0];
        let mut y = [0.0; 4];
        spmv(&a, &x, &mut y);
        assert_eq!(y, [0.0, 0.0, 0.0, 5.0]);

        let csc = a.to_csc();
        let mut z = [0.0; 4];
        spmv(&csc, &x, &mut z);
        assert_eq!(y, z);
        assert_eq!(relative_residual(&a, &y, &x), 0.0);
    }

    #[test]
    fn dimensions_are_checked() {
        let a = tridiagonal(3);
        assert!(check_dimensions(&a, &[0.0; 3], &[0.0; 3]).is_ok());
        assert!(matches!(
            check_dimensions(&a, &[0.0; 2], &[0.0; 3]),
            Err(FvmError::ShapeMismatch { what: "right-hand side", .. })
        ));
    }

    #[test]
    fn config_defaults_and_partial_json() {
        let config: SolverConfig = serde_json::from_str(r#"{"max_iterations": 5}"#).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.tolerance, SolverConfig::default().tolerance);
    }
}
