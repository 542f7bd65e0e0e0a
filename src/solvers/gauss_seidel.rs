//! Forward Gauss–Seidel sweeps over a CSR matrix.

use super::{LinearSolver, Solution, SolverConfig, check_dimensions, relative_residual};
use crate::fvm_error::FvmError;
use sprs::CsMat;

/// Converges for diagonally dominant or SPD systems.
#[derive(Clone, Debug, Default)]
pub struct LinearGaussSeidelSolver {
    config: SolverConfig,
}

impl LinearGaussSeidelSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl LinearSolver for LinearGaussSeidelSolver {
    fn name(&self) -> &'static str {
        "gauss-seidel"
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn solve(&self, matrix: &CsMat<f64>, rhs: &[f64], guess: &[f64]) -> Result<Solution, FvmError> {
        check_dimensions(matrix, rhs, guess)?;
        let csr;
        let matrix = if matrix.is_csr() {
            matrix
        } else {
            csr = matrix.to_csr();
            &csr
        };

        let mut diagonal = vec![0.0; rhs.len()];
        for (row, vec) in matrix.outer_iterator().enumerate() {
            diagonal[row] = vec.iter().filter(|(col, _)| *col == row).map(|(_, &a)| a).sum();
            if diagonal[row] == 0.0 {
                return Err(FvmError::SolveFailure {
                    solver: self.name(),
                    iterations: 0,
                    residual: None,
                    reason: format!("zero diagonal in row {row}"),
                });
            }
        }

        let mut x = guess.to_vec();
        let mut residual = relative_residual(matrix, rhs, &x);
        let mut iterations = 0;
        while residual > self.config.tolerance {
            if iterations == self.config.max_iterations {
                return Err(FvmError::SolveFailure {
                    solver: self.name(),
                    iterations,
                    residual: Some(residual),
                    reason: format!("did not reach tolerance {:e}", self.config.tolerance),
                });
            }
            for (row, vec) in matrix.outer_iterator().enumerate() {
                let off: f64 = vec
                    .iter()
                    .filter(|(col, _)| *col != row)
                    .map(|(col, &a)| a * x[col])
                    .sum();
                x[row] = (rhs[row] - off) / diagonal[row];
            }
            iterations += 1;
            residual = relative_residual(matrix, rhs, &x);
            if !residual.is_finite() {
                return Err(FvmError::SolveFailure {
                    solver: self.name(),
                    iterations,
                    residual: None,
                    reason: "iteration diverged".into(),
                });
            }
        }

        log::debug!(
            "gauss-seidel converged: n={}, iterations={iterations}, residual={residual:.3e}",
            rhs.len()
        );
        Ok(Solution {
            values: x,
            iterations,
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::tridiagonal;
    use super::*;
    use approx::assert_relative_eq;
    use sprs::TriMat;

    #[test]
    fn converges_on_dominant_system() {
        let mut tri = TriMat::new((3, 3));
        for (i, j, v) in [
            (0, 0, 4.0),
            (0, 1, -1.0),
            (1, 0, -1.0),
            (1, 1, 4.0),
            (1, 2, -1.0),
            (2, 1, -1.0),
            (2, 2, 4.0),
        ] {
            tri.add_triplet(i, j, v);
        }
        let a: CsMat<f64> = tri.to_csc();
        let solution = LinearGaussSeidelSolver::new()
            .solve(&a, &[3.0, 2.0, 3.0], &[0.0; 3])
            .unwrap();
        for x in &solution.values {
            assert_relative_eq!(*x, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_diagonal_is_rejected() {
        let mut tri = TriMat::new((2, 2));
        tri.add_triplet(0, 1, 1.0);
        tri.add_triplet(1, 0, 1.0);
        let a: CsMat<f64> = tri.to_csr();
        assert!(matches!(
            LinearGaussSeidelSolver::new().solve(&a, &[1.0, 1.0], &[0.0; 2]),
            Err(FvmError::SolveFailure { iterations: 0, .. })
        ));
    }

    #[test]
    fn iteration_cap_is_a_failure() {
        let a = tridiagonal(30);
        let solver = LinearGaussSeidelSolver::with_config(SolverConfig {
            tolerance: 1e-14,
            max_iterations: 3,
        });
        let err = solver.solve(&a, &vec![1.0; 30], &vec![0.0; 30]).unwrap_err();
        assert!(err.residual().is_some());
    }
}
