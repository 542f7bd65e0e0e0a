//! Jacobi-preconditioned conjugate gradient for symmetric positive definite
//! systems.

use super::{
    LinearSolver, Solution, SolverConfig, check_dimensions, dot, inverse_diagonal, l2_norm,
    residual_scale, spmv,
};
use crate::fvm_error::FvmError;
use sprs::CsMat;

#[derive(Clone, Debug, Default)]
pub struct LinearPCGSolver {
    config: SolverConfig,
}

impl LinearPCGSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl LinearSolver for LinearPCGSolver {
    fn name(&self) -> &'static str {
        "pcg"
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn solve(&self, matrix: &CsMat<f64>, rhs: &[f64], guess: &[f64]) -> Result<Solution, FvmError> {
        check_dimensions(matrix, rhs, guess)?;
        let n = rhs.len();
        let scale = residual_scale(rhs);
        let tol = self.config.tolerance;

        let mut x = guess.to_vec();
        let mut ap = vec![0.0; n];
        spmv(matrix, &x, &mut ap);
        let mut r: Vec<f64> = rhs.iter().zip(&ap).map(|(b, a)| b - a).collect();
        let mut residual = l2_norm(&r) / scale;
        if residual <= tol {
            return Ok(Solution {
                values: x,
                iterations: 0,
                residual,
            });
        }

        let inv_diag = inverse_diagonal(matrix);
        let mut z: Vec<f64> = r.iter().zip(&inv_diag).map(|(r, d)| r * d).collect();
        let mut p = z.clone();
        let mut rz_old = dot(&r, &z);

        for iteration in 1..=self.config.max_iterations {
            spmv(matrix, &p, &mut ap);
            let denom = dot(&p, &ap);
            if !denom.is_finite() || denom.abs() < 1e-300 {
                return Err(FvmError::SolveFailure {
                    solver: self.name(),
                    iterations: iteration,
                    residual: Some(residual),
                    reason: "search direction has zero curvature".into(),
                });
            }

            let alpha = rz_old / denom;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }

            residual = l2_norm(&r) / scale;
            if residual <= tol {
                log::debug!("pcg converged: n={n}, iterations={iteration}, residual={residual:.3e}");
                return Ok(Solution {
                    values: x,
                    iterations: iteration,
                    residual,
                });
            }

            for i in 0..n {
                z[i] = r[i] * inv_diag[i];
            }
            let rz_new = dot(&r, &z);
            let beta = rz_new / rz_old;
            for i in 0..n {
                p[i] = z[i] + beta * p[i];
            }
            rz_old = rz_new;
        }

        Err(FvmError::SolveFailure {
            solver: self.name(),
            iterations: self.config.max_iterations,
            residual: Some(residual),
            reason: format!("did not reach tolerance {tol:e}"),
        })
    }
}
